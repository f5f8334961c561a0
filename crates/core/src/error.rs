// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for mv-core operations.

use thiserror::Error;

/// All possible errors that can occur in mv-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("quantity must be greater than zero\n  hint: got {0}")]
    InvalidQuantity(u32),

    #[error("barcode must not be empty")]
    EmptyBarcode,

    #[error("invalid movement kind: '{0}'\n  hint: valid kinds are: IN, OUT")]
    InvalidKind(String),

    #[error("invalid entry status: '{0}'\n  hint: valid statuses are: queued, sending, sent, failed")]
    InvalidStatus(String),

    #[error("invalid error category: '{0}'\n  hint: valid categories are: auth, client, server, network, unknown")]
    InvalidCategory(String),

    #[error("invalid action hint: '{0}'\n  hint: valid hints are: login, retry, edit, delete")]
    InvalidHint(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for mv-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
