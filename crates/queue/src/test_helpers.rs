// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for queue engine tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use mv_core::{MovementInput, MovementKind, QueueStore};

use crate::api_tests::MockApi;
use crate::engine::{MovementQueue, QueueConfig};
use crate::session::StaticSession;

pub type TestQueue = MovementQueue<MockApi, Arc<StaticSession>>;

/// Input for an outgoing movement of `qty` items.
pub fn make_input(barcode: &str, qty: u32) -> MovementInput {
    MovementInput {
        kind: MovementKind::Out,
        barcode: barcode.to_string(),
        qty,
        note: None,
    }
}

/// In-memory queue with the given mock adapter and session.
pub fn make_queue(api: MockApi, session: Arc<StaticSession>) -> TestQueue {
    make_queue_with_config(api, session, QueueConfig::default())
}

/// In-memory queue with explicit configuration.
pub fn make_queue_with_config(
    api: MockApi,
    session: Arc<StaticSession>,
    config: QueueConfig,
) -> TestQueue {
    let store = QueueStore::open_in_memory().unwrap();
    MovementQueue::new(store, api, session, config).unwrap()
}

/// In-memory queue with a signed-in, write-scoped session.
pub fn make_default_queue(api: MockApi) -> (TestQueue, Arc<StaticSession>) {
    let session = Arc::new(StaticSession::new("test-token"));
    let queue = make_queue(api, Arc::clone(&session));
    (queue, session)
}
