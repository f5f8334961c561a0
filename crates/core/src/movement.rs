// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core movement types for the movesync queue.
//!
//! This module contains the fundamental data types: MovementKind,
//! EntryStatus, MovementInput, and MovementEntry with its state transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::classify::{ActionHint, ClassifiedError, ErrorCategory};
use crate::error::{Error, Result};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    /// Stock received into inventory.
    #[serde(rename = "IN")]
    In,
    /// Stock issued out of inventory.
    #[serde(rename = "OUT")]
    Out,
}

impl MovementKind {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "IN",
            MovementKind::Out => "OUT",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "IN" => Ok(MovementKind::In),
            "OUT" => Ok(MovementKind::Out),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

/// Delivery status of a queued movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Waiting for the next drain cycle. Initial state.
    Queued,
    /// A delivery attempt is in flight.
    Sending,
    /// Delivered. Terminal; eligible for purge.
    Sent,
    /// Last attempt failed. Re-enters the rotation unless stop_retry is set.
    Failed,
}

impl EntryStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Queued => "queued",
            EntryStatus::Sending => "sending",
            EntryStatus::Sent => "sent",
            EntryStatus::Failed => "failed",
        }
    }

    /// Returns true if no further transitions are possible.
    ///
    /// Only `sent` is terminal; `failed` can be re-queued manually or by the
    /// retry timer.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EntryStatus::Sent)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "queued" => Ok(EntryStatus::Queued),
            "sending" => Ok(EntryStatus::Sending),
            "sent" => Ok(EntryStatus::Sent),
            "failed" => Ok(EntryStatus::Failed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// User-level issue state of an entry, for list badges and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    /// Queued, waiting for delivery.
    Waiting,
    /// Failed terminally on a client error; needs edit or delete.
    Blocked,
    /// Failed on an auth error; needs a fresh sign-in.
    Auth,
    /// Failed but still in the automatic retry rotation.
    Retrying,
    /// Nothing to surface (sending or sent).
    None,
}

/// User-provided input for a new movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementInput {
    /// Movement direction.
    pub kind: MovementKind,
    /// Barcode of the physical item.
    pub barcode: String,
    /// Amount moved. Must be positive.
    pub qty: u32,
    /// Optional free-text note.
    pub note: Option<String>,
}

impl MovementInput {
    /// Trim the barcode and note; an empty note becomes absent.
    pub fn normalize(mut self) -> Self {
        self.barcode = self.barcode.trim().to_string();
        self.note = self
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self
    }

    /// Validate a normalized input.
    pub fn validate(&self) -> Result<()> {
        if self.barcode.is_empty() {
            return Err(Error::EmptyBarcode);
        }
        if self.qty == 0 {
            return Err(Error::InvalidQuantity(self.qty));
        }
        Ok(())
    }
}

/// One user-initiated stock movement awaiting or having completed delivery.
///
/// The `id` doubles as the idempotency key sent to the server and never
/// changes across retries. `created_at` is set once at enqueue and drives
/// oldest-first delivery ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementEntry {
    /// Client-generated unique id; idempotency key on the wire.
    pub id: String,
    /// Enqueue timestamp. Never mutated.
    pub created_at: DateTime<Utc>,
    /// Movement direction.
    pub kind: MovementKind,
    /// Barcode of the physical item, trimmed.
    pub barcode: String,
    /// Amount moved.
    pub qty: u32,
    /// Optional note, trimmed; absent if empty.
    pub note: Option<String>,
    /// Delivery status.
    pub status: EntryStatus,
    /// Failed delivery attempts so far, capped at the configured maximum.
    pub retries: u32,
    /// User-facing message from the most recent failure.
    pub last_error: Option<String>,
    /// HTTP status of the most recent failure, if the server responded.
    pub status_code: Option<u16>,
    /// Category of the most recent failure.
    pub error_category: Option<ErrorCategory>,
    /// Raw detail of the most recent failure.
    pub error_detail: Option<String>,
    /// Suggested user actions for the most recent failure.
    pub action_hints: Vec<ActionHint>,
    /// True freezes the entry out of automatic retry until a manual retry.
    pub stop_retry: bool,
}

impl MovementEntry {
    /// Create a fresh queued entry from normalized, validated input.
    pub fn new(input: MovementInput, id: String, created_at: DateTime<Utc>) -> Self {
        MovementEntry {
            id,
            created_at,
            kind: input.kind,
            barcode: input.barcode,
            qty: input.qty,
            note: input.note,
            status: EntryStatus::Queued,
            retries: 0,
            last_error: None,
            status_code: None,
            error_category: None,
            error_detail: None,
            action_hints: Vec::new(),
            stop_retry: false,
        }
    }

    /// Eligible for the next automatic drain cycle?
    pub fn is_pending(&self, max_retries: u32) -> bool {
        matches!(self.status, EntryStatus::Queued | EntryStatus::Failed)
            && !self.stop_retry
            && self.retries < max_retries
    }

    /// Out of the automatic rotation for good, waiting for human
    /// intervention? True for stop-flagged failures and for entries that
    /// exhausted their retry budget.
    pub fn is_blocked(&self, max_retries: u32) -> bool {
        self.status == EntryStatus::Failed && (self.stop_retry || self.retries >= max_retries)
    }

    /// Mark a delivery attempt as in flight.
    pub fn mark_sending(&mut self) {
        self.status = EntryStatus::Sending;
    }

    /// Mark delivered: clears all error state.
    pub fn mark_sent(&mut self) {
        self.status = EntryStatus::Sent;
        self.last_error = None;
        self.status_code = None;
        self.error_category = None;
        self.error_detail = None;
        self.action_hints = Vec::new();
        self.stop_retry = false;
    }

    /// Record a failed delivery attempt.
    ///
    /// Increments `retries` (capped at `max_retries`) and copies the
    /// classification onto the entry. Auth and client failures set
    /// `stop_retry` since retrying the identical payload cannot succeed.
    pub fn mark_failed(&mut self, classified: &ClassifiedError, max_retries: u32) {
        self.status = EntryStatus::Failed;
        self.retries = std::cmp::min(max_retries, self.retries + 1);
        self.last_error = Some(classified.user_message.clone());
        self.status_code = classified.status;
        self.error_category = Some(classified.category);
        self.error_detail = classified.detail.clone();
        self.action_hints = classified.hints.clone();
        self.stop_retry = !classified.category.retryable();
    }

    /// Manual retry: back to queued, error state cleared.
    ///
    /// `retries` is deliberately kept so the backoff history survives.
    pub fn reset_for_retry(&mut self) {
        self.status = EntryStatus::Queued;
        self.stop_retry = false;
        self.last_error = None;
        self.error_category = None;
        self.error_detail = None;
    }

    /// Derive the UI-level issue state for this entry.
    pub fn issue_state(&self) -> IssueState {
        match self.status {
            EntryStatus::Failed => {
                if self.error_category == Some(ErrorCategory::Auth) {
                    IssueState::Auth
                } else if self.stop_retry {
                    IssueState::Blocked
                } else {
                    IssueState::Retrying
                }
            }
            EntryStatus::Queued => IssueState::Waiting,
            _ => IssueState::None,
        }
    }
}

#[cfg(test)]
#[path = "movement_tests.rs"]
mod tests;
