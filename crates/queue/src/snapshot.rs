// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only projections of queue state for the UI layer.
//!
//! The engine publishes a fresh [`QueueSnapshot`] on every state change and
//! one-shot [`QueueNotice`]s for events worth surfacing to the user. Any UI
//! framework can adapt these to its own reactivity primitives.

use mv_core::MovementEntry;

/// Immutable view of the queue at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueSnapshot {
    /// All entries, newest first (display order).
    pub movements: Vec<MovementEntry>,
    /// Entries still in the automatic retry rotation.
    pub pending_count: usize,
    /// Entries frozen on a terminal failure, waiting for the user.
    pub blocked_count: usize,
    /// Pending + blocked: everything that is not settled yet.
    pub attention_count: usize,
    /// Whether a drain cycle is currently running.
    pub syncing: bool,
    /// User-facing message of the most recent failed cycle, if any.
    pub last_sync_error: Option<String>,
}

impl QueueSnapshot {
    /// Build a snapshot from the current entry set.
    pub fn from_entries(
        entries: &[MovementEntry],
        max_retries: u32,
        syncing: bool,
        last_sync_error: Option<String>,
    ) -> Self {
        let pending_count = entries.iter().filter(|e| e.is_pending(max_retries)).count();
        let blocked_count = entries
            .iter()
            .filter(|e| e.is_blocked(max_retries))
            .count();

        let mut movements = entries.to_vec();
        movements.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        QueueSnapshot {
            movements,
            pending_count,
            blocked_count,
            attention_count: pending_count + blocked_count,
            syncing,
            last_sync_error,
        }
    }

    /// Whether any entry is still eligible for automatic delivery.
    pub fn has_pending(&self) -> bool {
        self.pending_count > 0
    }
}

/// One-shot user-facing notification from the engine.
///
/// Presentation (toasts, banners, deduplication) is the UI layer's concern;
/// the engine only reports what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueNotice {
    /// A movement was enqueued. `online` distinguishes "sent right away"
    /// from "stored for later".
    Queued { online: bool },
    /// A manual sync finished with nothing left pending.
    SyncComplete,
    /// A sync cycle left failed entries behind.
    SyncFailed { message: String },
    /// Sent entries were purged from the list.
    SentCleared { removed: usize },
}
