// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! mv-queue: Offline-resilient delivery engine for inventory movements.
//!
//! Movements recorded while offline (or while the backend is down) are
//! persisted locally and synchronized later with bounded retry, exponential
//! backoff, and error-aware stop conditions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   UI layer  │────►│    Engine    │────►│ MovementApi │
//! │ (snapshots) │◄────│(MovementQueue)◄────│   (trait)   │
//! └─────────────┘     └──────┬───────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌──────────────┐
//!                     │  QueueStore  │  (durable, SQLite)
//!                     └──────────────┘
//! ```
//!
//! # Features
//!
//! - Write-through durable queue: an enqueue is persisted before it returns
//! - Single-flight drain cycle with oldest-first delivery ordering
//! - Exponential backoff per entry, capped retries
//! - Terminal failure classification (auth/client) freezes entries until a
//!   manual retry
//! - Injectable network and session ports for testing
//! - Snapshot + notice channels for any UI framework to observe

mod api;
mod engine;
mod error;
mod scheduler;
mod session;
mod snapshot;

pub use api::{ApiError, ApiResult, HttpMovementApi, MovementApi, MovementPayload};
pub use engine::{DrainOutcome, MovementQueue, QueueConfig};
pub use error::{EngineError, EngineResult};
pub use scheduler::run_scheduler;
pub use session::{SessionProvider, StaticSession};
pub use snapshot::{QueueNotice, QueueSnapshot};

#[cfg(test)]
mod test_helpers;




#[cfg(test)]
mod session_tests;
