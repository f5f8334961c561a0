// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Failure classification for movement delivery attempts.
//!
//! Every failed delivery is mapped into one [`ErrorCategory`], which decides
//! whether the entry stays in the automatic retry rotation (`server`,
//! `network`, `unknown`) or is frozen until a human intervenes (`auth`,
//! `client`). The classification also carries a user-facing message and
//! action hints for the UI layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Classification of a failed delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Credential missing, expired, or rejected (HTTP 401).
    Auth,
    /// Payload or precondition problem (HTTP 400/404/405/409/422).
    Client,
    /// Backend failure (HTTP 5xx).
    Server,
    /// No response: timeout or connection failure.
    Network,
    /// Anything else. Optimistically retryable.
    Unknown,
}

impl ErrorCategory {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Auth => "auth",
            ErrorCategory::Client => "client",
            ErrorCategory::Server => "server",
            ErrorCategory::Network => "network",
            ErrorCategory::Unknown => "unknown",
        }
    }

    /// Whether retrying the identical payload can resolve this failure.
    ///
    /// Auth and client failures will not self-resolve: the same payload will
    /// fail the same way, so automatic retry is suppressed for them.
    pub fn retryable(&self) -> bool {
        !matches!(self, ErrorCategory::Auth | ErrorCategory::Client)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ErrorCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auth" => Ok(ErrorCategory::Auth),
            "client" => Ok(ErrorCategory::Client),
            "server" => Ok(ErrorCategory::Server),
            "network" => Ok(ErrorCategory::Network),
            "unknown" => Ok(ErrorCategory::Unknown),
            _ => Err(Error::InvalidCategory(s.to_string())),
        }
    }
}

/// Suggested user action for a failed entry, surfaced as UI affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionHint {
    /// Sign in again, then retry.
    Login,
    /// Retry as-is.
    Retry,
    /// Edit the entry before retrying.
    Edit,
    /// Abandon the entry.
    Delete,
}

impl ActionHint {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionHint::Login => "login",
            ActionHint::Retry => "retry",
            ActionHint::Edit => "edit",
            ActionHint::Delete => "delete",
        }
    }
}

impl fmt::Display for ActionHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionHint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "login" => Ok(ActionHint::Login),
            "retry" => Ok(ActionHint::Retry),
            "edit" => Ok(ActionHint::Edit),
            "delete" => Ok(ActionHint::Delete),
            _ => Err(Error::InvalidHint(s.to_string())),
        }
    }
}

/// A fully classified delivery failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    /// Failure category, drives the retry policy.
    pub category: ErrorCategory,
    /// HTTP status code, if the server responded.
    pub status: Option<u16>,
    /// Short user-facing message.
    pub user_message: String,
    /// Raw detail from the server or transport, for diagnostics.
    pub detail: Option<String>,
    /// Suggested user actions.
    pub hints: Vec<ActionHint>,
}

impl ClassifiedError {
    /// Classify an HTTP status code.
    ///
    /// 401 is auth; 400/404/405/409/422 are client errors; 5xx is server.
    /// Any other status falls through to unknown.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        match status {
            401 => ClassifiedError {
                category: ErrorCategory::Auth,
                status: Some(status),
                user_message: "Session expired. Please sign in again.".to_string(),
                detail,
                hints: vec![ActionHint::Login, ActionHint::Retry],
            },
            400 | 404 | 405 | 409 | 422 => {
                let message = match status {
                    400 => "Input incomplete or invalid.",
                    404 => "Record not found.",
                    405 => "Action not currently allowed.",
                    409 => "Conflict: this movement collides with another step.",
                    _ => "Required field missing or not permitted.",
                };
                ClassifiedError {
                    category: ErrorCategory::Client,
                    status: Some(status),
                    user_message: message.to_string(),
                    detail,
                    hints: vec![ActionHint::Edit, ActionHint::Delete],
                }
            }
            s if s >= 500 => ClassifiedError {
                category: ErrorCategory::Server,
                status: Some(status),
                user_message: "Server unreachable or failing.".to_string(),
                detail,
                hints: vec![ActionHint::Retry],
            },
            _ => ClassifiedError {
                category: ErrorCategory::Unknown,
                status: Some(status),
                user_message: "Unknown error. Please try again.".to_string(),
                detail,
                hints: vec![ActionHint::Retry],
            },
        }
    }

    /// Classify a failure with no HTTP response (timeout, connection refused).
    pub fn network(detail: Option<String>) -> Self {
        ClassifiedError {
            category: ErrorCategory::Network,
            status: None,
            user_message: "No connection. Will retry automatically.".to_string(),
            detail,
            hints: vec![ActionHint::Retry],
        }
    }

    /// Classify a failure that fits nothing else.
    pub fn unknown(detail: Option<String>) -> Self {
        ClassifiedError {
            category: ErrorCategory::Unknown,
            status: None,
            user_message: "Unknown error. Please try again.".to_string(),
            detail,
            hints: vec![ActionHint::Retry],
        }
    }

    /// Failure used when no credential is available at attempt time.
    ///
    /// No network call is made for these; the entry fails as auth directly.
    pub fn missing_credential() -> Self {
        ClassifiedError {
            category: ErrorCategory::Auth,
            status: None,
            user_message: "No active session.".to_string(),
            detail: None,
            hints: vec![ActionHint::Login, ActionHint::Retry],
        }
    }

    /// Failure used when the session lacks write scope.
    ///
    /// Treated the same as a missing credential: the payload cannot succeed
    /// until the session changes, so this is an auth failure too.
    pub fn missing_write_scope() -> Self {
        ClassifiedError {
            category: ErrorCategory::Auth,
            status: None,
            user_message: "No permission to record movements.".to_string(),
            detail: None,
            hints: vec![ActionHint::Login, ActionHint::Retry],
        }
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
