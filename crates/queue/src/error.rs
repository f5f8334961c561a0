// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the queue engine.

use thiserror::Error;

/// Error type for queue engine operations.
///
/// Network failures never surface here: the drain cycle converts them into
/// entry state. These are the failures of the operation itself, mostly
/// persistence errors that must not be swallowed.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Underlying store or validation failure.
    #[error(transparent)]
    Core(#[from] mv_core::Error),

    /// Operation referenced an entry id that does not exist.
    #[error("entry not found: {0}")]
    EntryNotFound(String),
}

/// Result type for queue engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
