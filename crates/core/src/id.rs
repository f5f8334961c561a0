// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::movement::MovementInput;

/// Generate an entry id from the movement content and timestamp.
/// Format: mv-{hash} where hash is the first 12 hex chars of
/// SHA256(kind + barcode + qty + note + timestamp).
pub fn generate_id(input: &MovementInput, created_at: &DateTime<Utc>) -> String {
    let note = input.note.as_deref().unwrap_or("");
    let seed = format!(
        "{}{}{}{}{}",
        input.kind.as_str(),
        input.barcode,
        input.qty,
        note,
        created_at.to_rfc3339()
    );
    let hash = Sha256::digest(seed.as_bytes());
    let short_hash = hex::encode(&hash[..6]); // First 12 hex chars (6 bytes)
    format!("mv-{}", short_hash)
}

/// Generate a unique entry id, handling collisions by appending an
/// incrementing suffix. Collisions only occur for identical movements
/// enqueued within the same timestamp tick.
pub fn generate_unique_id<F>(input: &MovementInput, created_at: &DateTime<Utc>, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    let base_id = generate_id(input, created_at);

    if !exists(&base_id) {
        return base_id;
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id) {
            return id;
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
