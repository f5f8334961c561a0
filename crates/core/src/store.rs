// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable store for the movement queue.
//!
//! The [`QueueStore`] struct persists the full set of [`MovementEntry`]
//! records across restarts. It is a passive persistence surface: all entry
//! mutation happens in the queue engine, which writes through on every state
//! change. A `put` is acknowledged only after the write is durable.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::classify::ActionHint;
use crate::error::{Error, Result};
use crate::movement::MovementEntry;

/// SQL schema for the movement queue database.
pub const SCHEMA: &str = r#"
-- Queued movements, one row per entry. rowid preserves insertion order.
CREATE TABLE IF NOT EXISTS movement_queue (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    kind TEXT NOT NULL,
    barcode TEXT NOT NULL,
    qty INTEGER NOT NULL,
    note TEXT,
    status TEXT NOT NULL DEFAULT 'queued',
    retries INTEGER NOT NULL DEFAULT 0,
    last_error TEXT,
    status_code INTEGER,
    error_category TEXT,
    error_detail TEXT,
    action_hints TEXT NOT NULL DEFAULT '[]',
    stop_retry INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_movement_queue_status ON movement_queue(status);
CREATE INDEX IF NOT EXISTS idx_movement_queue_created ON movement_queue(created_at);
"#;

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<chrono::DateTime<chrono::Utc>, rusqlite::Error> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Parse the JSON-encoded action hints column.
fn parse_hints(value: &str) -> std::result::Result<Vec<ActionHint>, rusqlite::Error> {
    serde_json::from_str(value).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid action hints '{value}'"
            ))),
        )
    })
}

/// Parse an optional error category.
fn parse_category_opt(
    value: Option<String>,
) -> std::result::Result<Option<crate::classify::ErrorCategory>, rusqlite::Error> {
    match value {
        None => Ok(None),
        Some(s) => parse_db(&s, "error_category").map(Some),
    }
}

/// Column list shared by every entry query. Order matters for [`row_to_entry`].
const ENTRY_COLUMNS: &str = "id, created_at, kind, barcode, qty, note, status, retries,
     last_error, status_code, error_category, error_detail, action_hints, stop_retry";

/// Map one `movement_queue` row to an entry.
fn row_to_entry(row: &rusqlite::Row<'_>) -> std::result::Result<MovementEntry, rusqlite::Error> {
    let created_str: String = row.get(1)?;
    let kind_str: String = row.get(2)?;
    let status_str: String = row.get(6)?;
    let status_code: Option<i64> = row.get(9)?;
    let category_str: Option<String> = row.get(10)?;
    let hints_str: String = row.get(12)?;
    let stop_retry: i64 = row.get(13)?;

    Ok(MovementEntry {
        id: row.get(0)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
        kind: parse_db(&kind_str, "kind")?,
        barcode: row.get(3)?,
        qty: row.get::<_, i64>(4)? as u32,
        note: row.get(5)?,
        status: parse_db(&status_str, "status")?,
        retries: row.get::<_, i64>(7)? as u32,
        last_error: row.get(8)?,
        status_code: status_code.map(|c| c as u16),
        error_category: parse_category_opt(category_str)?,
        error_detail: row.get(11)?,
        action_hints: parse_hints(&hints_str)?,
        stop_retry: stop_retry != 0,
    })
}

/// SQLite connection with movement queue operations.
pub struct QueueStore {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl QueueStore {
    /// Open a store at the given path, creating schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL for concurrency; synchronous=FULL so an acknowledged put
        // survives a crash.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;

        conn.execute_batch(SCHEMA)?;
        Ok(QueueStore { conn })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(QueueStore { conn })
    }

    /// Load all entries in insertion order.
    ///
    /// An empty store yields an empty vec, never an error.
    pub fn load_all(&self) -> Result<Vec<MovementEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM movement_queue ORDER BY rowid"
        ))?;

        let rows = stmt.query_map([], row_to_entry)?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }

    /// Get a single entry by id.
    pub fn get(&self, id: &str) -> Result<Option<MovementEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM movement_queue WHERE id = ?1"),
                params![id],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    /// Insert or replace an entry by id. Durable before returning.
    pub fn put(&self, entry: &MovementEntry) -> Result<()> {
        let hints = serde_json::to_string(&entry.action_hints)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO movement_queue
             (id, created_at, kind, barcode, qty, note, status, retries,
              last_error, status_code, error_category, error_detail,
              action_hints, stop_retry)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                entry.id,
                entry.created_at.to_rfc3339(),
                entry.kind.as_str(),
                entry.barcode,
                entry.qty,
                entry.note,
                entry.status.as_str(),
                entry.retries,
                entry.last_error,
                entry.status_code,
                entry.error_category.map(|c| c.as_str()),
                entry.error_detail,
                hints,
                entry.stop_retry as i64,
            ],
        )?;
        Ok(())
    }

    /// Delete an entry by id. No-op if absent.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM movement_queue WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Check if an entry id exists.
    pub fn exists(&self, id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM movement_queue WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Delete all entries with status `sent`. Returns the number removed.
    pub fn purge_sent(&self) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM movement_queue WHERE status = 'sent'", [])?;
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
