// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the durable store.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::classify::ClassifiedError;
use crate::movement::{MovementInput, MovementKind};
use chrono::{Duration, Utc};
use tempfile::tempdir;

fn make_entry(id: &str, offset_secs: i64) -> MovementEntry {
    let input = MovementInput {
        kind: MovementKind::Out,
        barcode: "4006381333931".to_string(),
        qty: 3,
        note: Some("shelf B".to_string()),
    };
    MovementEntry::new(
        input,
        id.to_string(),
        Utc::now() + Duration::seconds(offset_secs),
    )
}

#[test]
fn test_empty_store_loads_empty() {
    let store = QueueStore::open_in_memory().unwrap();
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn test_put_and_get_roundtrip() {
    let store = QueueStore::open_in_memory().unwrap();
    let mut entry = make_entry("mv-aaa", 0);
    entry.mark_failed(&ClassifiedError::from_status(409, Some("dup".to_string())), 10);

    store.put(&entry).unwrap();

    let loaded = store.get("mv-aaa").unwrap().unwrap();
    assert_eq!(loaded, entry);
    assert_eq!(loaded.status_code, Some(409));
    assert_eq!(loaded.error_detail.as_deref(), Some("dup"));
    assert!(loaded.stop_retry);
}

#[test]
fn test_get_missing_returns_none() {
    let store = QueueStore::open_in_memory().unwrap();
    assert!(store.get("mv-nope").unwrap().is_none());
}

#[test]
fn test_put_replaces_by_id() {
    let store = QueueStore::open_in_memory().unwrap();
    let mut entry = make_entry("mv-aaa", 0);
    store.put(&entry).unwrap();

    entry.mark_sending();
    store.put(&entry).unwrap();

    let all = store.load_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, crate::movement::EntryStatus::Sending);
}

#[test]
fn test_load_all_preserves_insertion_order() {
    let store = QueueStore::open_in_memory().unwrap();
    store.put(&make_entry("mv-ccc", 2)).unwrap();
    store.put(&make_entry("mv-aaa", 0)).unwrap();
    store.put(&make_entry("mv-bbb", 1)).unwrap();

    let ids: Vec<String> = store.load_all().unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["mv-ccc", "mv-aaa", "mv-bbb"]);
}

#[test]
fn test_delete_is_noop_when_absent() {
    let store = QueueStore::open_in_memory().unwrap();
    store.put(&make_entry("mv-aaa", 0)).unwrap();

    store.delete("mv-zzz").unwrap();
    assert_eq!(store.load_all().unwrap().len(), 1);

    store.delete("mv-aaa").unwrap();
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn test_exists() {
    let store = QueueStore::open_in_memory().unwrap();
    assert!(!store.exists("mv-aaa").unwrap());
    store.put(&make_entry("mv-aaa", 0)).unwrap();
    assert!(store.exists("mv-aaa").unwrap());
}

#[test]
fn test_purge_sent_removes_only_sent() {
    let store = QueueStore::open_in_memory().unwrap();

    let mut sent1 = make_entry("mv-s1", 0);
    sent1.mark_sent();
    let mut sent2 = make_entry("mv-s2", 1);
    sent2.mark_sent();
    let mut failed = make_entry("mv-f1", 2);
    failed.mark_failed(&ClassifiedError::from_status(409, None), 10);

    store.put(&sent1).unwrap();
    store.put(&sent2).unwrap();
    store.put(&failed).unwrap();

    let removed = store.purge_sent().unwrap();
    assert_eq!(removed, 2);

    let remaining = store.load_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "mv-f1");
}

#[test]
fn test_entries_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("queue.db");

    let entry = make_entry("mv-aaa", 0);
    {
        let store = QueueStore::open(&path).unwrap();
        store.put(&entry).unwrap();
    }

    // Reopen simulates a process restart
    let store = QueueStore::open(&path).unwrap();
    let all = store.load_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], entry);
}

#[test]
fn test_open_creates_parent_dirs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("state").join("queue.db");

    let store = QueueStore::open(&path).unwrap();
    store.put(&make_entry("mv-aaa", 0)).unwrap();
    assert!(path.exists());
}

#[test]
fn test_corrupted_status_surfaces_error() {
    let store = QueueStore::open_in_memory().unwrap();
    store.put(&make_entry("mv-aaa", 0)).unwrap();

    store
        .conn
        .execute("UPDATE movement_queue SET status = 'exploded'", [])
        .unwrap();

    assert!(store.load_all().is_err());
}
