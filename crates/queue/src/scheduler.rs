// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic retry timer for the movement queue.
//!
//! Retry-eligible entries must not wait for the next user action or
//! connectivity event, so a background task re-kicks the drain cycle on a
//! fixed interval. The timer only runs while eligible entries exist: when
//! the queue is settled the task parks on the snapshot channel instead of
//! polling.

use std::sync::Arc;
use std::time::Duration;

use crate::api::MovementApi;
use crate::engine::MovementQueue;
use crate::session::SessionProvider;

/// Drive periodic drain cycles for `queue` until the task is dropped.
///
/// Intended to be spawned once from the composition root:
///
/// ```ignore
/// let queue = Arc::new(MovementQueue::open(path, api, session, config)?);
/// tokio::spawn(run_scheduler(Arc::clone(&queue)));
/// ```
///
/// Drain errors are swallowed here (logged at debug): the engine's own
/// per-entry failure handling is authoritative, and the timer will try
/// again on the next tick.
pub async fn run_scheduler<A, S>(queue: Arc<MovementQueue<A, S>>)
where
    A: MovementApi,
    S: SessionProvider,
{
    let mut snapshots = queue.subscribe();
    let interval = Duration::from_secs(queue.config().poll_interval_secs);

    loop {
        let has_pending = snapshots.borrow_and_update().has_pending();

        if has_pending {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    if let Err(e) = queue.drain().await {
                        tracing::debug!("scheduled drain failed: {}", e);
                    }
                }
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        } else if snapshots.changed().await.is_err() {
            break;
        }
    }
}
