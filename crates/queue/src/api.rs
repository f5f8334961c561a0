// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network adapter port for movement submission.
//!
//! The engine talks to the backend through the [`MovementApi`] trait, which
//! enables:
//! - Real HTTP submissions for production ([`HttpMovementApi`])
//! - Mock adapters for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mv_core::{ClassifiedError, MovementEntry, MovementKind};

/// Request timeout for movement submissions.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Wire payload for one movement submission.
///
/// `client_tx_id` is the entry id, sent on every attempt so the backend can
/// deduplicate retried submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementPayload {
    /// Idempotency key: stable across all attempts for one entry.
    pub client_tx_id: String,
    /// Movement direction.
    #[serde(rename = "type")]
    pub kind: MovementKind,
    /// Item barcode.
    pub barcode: String,
    /// Amount moved.
    pub qty: u32,
    /// Optional note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Original enqueue time, so the backend records when the movement
    /// actually happened rather than when it was delivered.
    pub created_at: DateTime<Utc>,
}

impl MovementPayload {
    /// Build the payload for an entry.
    pub fn from_entry(entry: &MovementEntry) -> Self {
        MovementPayload {
            client_tx_id: entry.id.clone(),
            kind: entry.kind,
            barcode: entry.barcode.clone(),
            qty: entry.qty,
            note: entry.note.clone(),
            created_at: entry.created_at,
        }
    }
}

/// Error type for movement submissions.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server responded with a non-success status.
    #[error("server returned status {code}")]
    Status {
        code: u16,
        detail: Option<String>,
    },

    /// No response within the request timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection could not be established or broke mid-request.
    #[error("connection failed: {0}")]
    Connect(String),
}

impl ApiError {
    /// Map this transport-level failure into the retry-policy taxonomy.
    pub fn classify(&self) -> ClassifiedError {
        match self {
            ApiError::Status { code, detail } => {
                ClassifiedError::from_status(*code, detail.clone())
            }
            ApiError::Timeout => ClassifiedError::network(Some("request timed out".to_string())),
            ApiError::Connect(detail) => ClassifiedError::network(Some(detail.clone())),
        }
    }
}

/// Result type for movement submissions.
pub type ApiResult<T> = Result<T, ApiError>;

/// Port for submitting movements to the backend.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait MovementApi: Send + Sync {
    /// Submit one movement with the given credential.
    ///
    /// Success means the backend accepted (or deduplicated) the movement.
    fn post_movement(
        &mut self,
        credential: &str,
        payload: MovementPayload,
    ) -> Pin<Box<dyn Future<Output = ApiResult<()>> + Send + '_>>;
}

/// HTTP adapter posting movements to the inventory backend via reqwest.
pub struct HttpMovementApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMovementApi {
    /// Create an adapter for the given backend base URL.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Connect(e.to_string()))?;

        Ok(HttpMovementApi {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl MovementApi for HttpMovementApi {
    fn post_movement(
        &mut self,
        credential: &str,
        payload: MovementPayload,
    ) -> Pin<Box<dyn Future<Output = ApiResult<()>> + Send + '_>> {
        let request = self
            .client
            .post(format!("{}/inventory/movements", self.base_url))
            .bearer_auth(credential)
            .json(&payload);

        Box::pin(async move {
            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout
                } else {
                    ApiError::Connect(e.to_string())
                }
            })?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }

            let detail = response.text().await.ok().filter(|t| !t.is_empty());
            Err(ApiError::Status {
                code: status.as_u16(),
                detail,
            })
        })
    }
}
