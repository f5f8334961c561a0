// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! mv-core: Shared library for the movesync movement queue
//!
//! This crate provides the domain model for offline-queued inventory
//! movements, the failure classification taxonomy, and the SQLite-backed
//! durable store used by the queue engine in mv-queue.

pub mod classify;
pub mod error;
pub mod id;
pub mod movement;
pub mod store;

pub use classify::{ActionHint, ClassifiedError, ErrorCategory};
pub use error::{Error, Result};
pub use movement::{EntryStatus, IssueState, MovementEntry, MovementInput, MovementKind};
pub use store::QueueStore;
