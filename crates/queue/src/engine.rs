// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The movement queue engine.
//!
//! Owns the entry lifecycle: enqueue, drain cycles with backoff, failure
//! classification, manual retry/delete/edit, and purge. Every state change
//! is written through to the durable store before it is observable, so a
//! crash between enqueue and delivery never loses a movement, only delays
//! it.
//!
//! Entry state machine:
//!
//! ```text
//! queued --(drain)--> sending --(success)--> sent [terminal]
//! sending --(retryable failure)--> failed --(timer/online/manual)--> queued
//! sending --(auth/client failure)--> failed, stop_retry --(manual only)--> queued
//! ```
//!
//! Concurrency: at most one drain cycle runs at a time, enforced by an
//! explicit lock; a drain request arriving while one is in progress
//! coalesces into a no-op. Entry state is re-read after every await so a
//! delete or edit during a backoff wait is never overwritten.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, watch};

use mv_core::{id, ClassifiedError, ErrorCategory, MovementEntry, MovementInput, QueueStore};

use crate::api::{MovementApi, MovementPayload};
use crate::error::{EngineError, EngineResult};
use crate::session::SessionProvider;
use crate::snapshot::{QueueNotice, QueueSnapshot};

/// Capacity of the notice channel; slow subscribers lose oldest notices.
const NOTICE_CAPACITY: usize = 32;

/// Configuration for the queue engine.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum failed attempts per entry before it leaves the automatic
    /// rotation.
    pub max_retries: u32,
    /// Backoff delay before the first retry (milliseconds).
    pub base_delay_ms: u64,
    /// Backoff cap (milliseconds).
    pub max_delay_ms: u64,
    /// Retry timer interval for the scheduler (seconds).
    pub poll_interval_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            max_retries: 10,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            poll_interval_secs: 10,
        }
    }
}

impl QueueConfig {
    /// Backoff delay before attempting an entry that failed `retries` times:
    /// `base × 2^(retries-1)`, capped at `max_delay_ms` (1s, 2s, 4s, … 30s
    /// with defaults).
    pub fn backoff_delay(&self, retries: u32) -> Duration {
        let factor = 2u64.saturating_pow(retries.saturating_sub(1));
        let ms = std::cmp::min(self.max_delay_ms, self.base_delay_ms.saturating_mul(factor));
        Duration::from_millis(ms)
    }
}

/// Outcome of one drain cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Device reported offline; nothing attempted.
    Offline,
    /// No eligible entries.
    Idle,
    /// Another cycle was already in flight; this request coalesced.
    AlreadyRunning,
    /// The cycle ran over its selected entries.
    Completed { sent: usize, failed: usize },
}

/// Mutable queue state: the store handle and its in-memory mirror.
///
/// Guarded by a std mutex that is never held across an await point.
struct QueueState {
    store: QueueStore,
    entries: Vec<MovementEntry>,
    last_sync_error: Option<String>,
}

/// The offline-resilient movement queue.
///
/// Explicitly constructed with its store, network adapter, and session
/// provider; intended to live in an `Arc` shared between the UI layer and
/// the background scheduler.
pub struct MovementQueue<A: MovementApi, S: SessionProvider> {
    config: QueueConfig,
    state: Mutex<QueueState>,
    /// Single-flight guard: held for the whole drain cycle.
    drain_lock: tokio::sync::Mutex<()>,
    api: tokio::sync::Mutex<A>,
    session: S,
    online: AtomicBool,
    syncing: AtomicBool,
    snapshot_tx: watch::Sender<QueueSnapshot>,
    notice_tx: broadcast::Sender<QueueNotice>,
}

impl<A: MovementApi, S: SessionProvider> MovementQueue<A, S> {
    /// Create an engine over an already-open store.
    ///
    /// Loads all persisted entries into the in-memory mirror; entries queued
    /// before a restart are picked up by the next drain cycle.
    pub fn new(store: QueueStore, api: A, session: S, config: QueueConfig) -> EngineResult<Self> {
        let entries = store.load_all()?;
        let initial = QueueSnapshot::from_entries(&entries, config.max_retries, false, None);
        let (snapshot_tx, _) = watch::channel(initial);
        let (notice_tx, _) = broadcast::channel(NOTICE_CAPACITY);

        Ok(MovementQueue {
            config,
            state: Mutex::new(QueueState {
                store,
                entries,
                last_sync_error: None,
            }),
            drain_lock: tokio::sync::Mutex::new(()),
            api: tokio::sync::Mutex::new(api),
            session,
            online: AtomicBool::new(true),
            syncing: AtomicBool::new(false),
            snapshot_tx,
            notice_tx,
        })
    }

    /// Open (or create) the store at `path` and build an engine over it.
    pub fn open(path: &Path, api: A, session: S, config: QueueConfig) -> EngineResult<Self> {
        Self::new(QueueStore::open(path)?, api, session, config)
    }

    /// Engine configuration.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Current connectivity as last reported via [`set_online`](Self::set_online).
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Record a connectivity change. Regaining connectivity does not drain
    /// by itself; use [`handle_online`](Self::handle_online) for the event
    /// path.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Connectivity-regained trigger: marks the device online and runs a
    /// drain cycle best-effort (errors logged, not propagated — the per-entry
    /// handling inside the cycle is authoritative).
    pub async fn handle_online(&self) {
        self.set_online(true);
        if let Err(e) = self.drain().await {
            tracing::debug!("drain after connectivity regained failed: {}", e);
        }
    }

    /// Current queue snapshot.
    pub fn snapshot(&self) -> QueueSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Subscribe to queue snapshots. The receiver always holds the latest
    /// state; intermediate states may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Subscribe to one-shot user-facing notices.
    pub fn subscribe_notices(&self) -> broadcast::Receiver<QueueNotice> {
        self.notice_tx.subscribe()
    }

    /// Record a new movement.
    ///
    /// The entry is validated, persisted, and observable before this
    /// returns. When online, a drain cycle is run so the movement goes out
    /// right away.
    pub async fn enqueue(&self, input: MovementInput) -> EngineResult<MovementEntry> {
        let entry = self.insert_new(input)?;
        let online = self.is_online();
        let _ = self.notice_tx.send(QueueNotice::Queued { online });
        if online {
            self.drain().await?;
        }
        Ok(entry)
    }

    /// [`enqueue`](Self::enqueue) without the user-facing notice. Used by
    /// [`edit`](Self::edit) so a replacement does not toast as a new
    /// recording.
    pub async fn enqueue_silent(&self, input: MovementInput) -> EngineResult<MovementEntry> {
        let entry = self.insert_new(input)?;
        if self.is_online() {
            self.drain().await?;
        }
        Ok(entry)
    }

    /// Manually re-queue a failed entry, clearing its stop flag, and drain.
    pub async fn retry(&self, id: &str) -> EngineResult<()> {
        {
            let mut state = self.lock_state();
            let idx = state
                .entries
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| EngineError::EntryNotFound(id.to_string()))?;

            let mut entry = state.entries[idx].clone();
            entry.reset_for_retry();
            state.store.put(&entry)?;
            state.entries[idx] = entry;
            self.publish_locked(&state);
        }
        self.drain().await?;
        Ok(())
    }

    /// Remove an entry unconditionally (user abandons it). No-op when the
    /// id is unknown.
    pub fn delete(&self, id: &str) -> EngineResult<()> {
        let mut state = self.lock_state();
        state.store.delete(id)?;
        state.entries.retain(|e| e.id != id);
        self.publish_locked(&state);
        Ok(())
    }

    /// Replace an entry with new input.
    ///
    /// The replacement is a brand-new movement with a fresh id and
    /// timestamp: the old idempotency key may already be bound server-side
    /// to the old payload, so reusing it for edited content would be wrong.
    pub async fn edit(&self, id: &str, input: MovementInput) -> EngineResult<MovementEntry> {
        if self.find(id).is_none() {
            return Err(EngineError::EntryNotFound(id.to_string()));
        }
        self.delete(id)?;
        self.enqueue_silent(input).await
    }

    /// Run a drain cycle now and report the outcome. Emits a
    /// [`QueueNotice::SyncComplete`] when nothing is left pending, or a
    /// [`QueueNotice::SyncFailed`] when the cycle left failures behind.
    pub async fn sync_now(&self) -> EngineResult<DrainOutcome> {
        let outcome = self.drain().await?;

        // A coalesced or offline request is not this caller's cycle; the
        // winning caller reports it.
        if matches!(outcome, DrainOutcome::AlreadyRunning | DrainOutcome::Offline) {
            return Ok(outcome);
        }

        if let DrainOutcome::Completed { failed, .. } = outcome {
            if failed > 0 {
                let message = self
                    .snapshot()
                    .last_sync_error
                    .unwrap_or_else(|| "delivery failed".to_string());
                let _ = self.notice_tx.send(QueueNotice::SyncFailed { message });
                return Ok(outcome);
            }
        }

        if self.is_online() && !self.snapshot().has_pending() {
            let _ = self.notice_tx.send(QueueNotice::SyncComplete);
        }
        Ok(outcome)
    }

    /// Remove all sent entries. Returns the number removed.
    pub fn purge_sent(&self) -> EngineResult<usize> {
        let removed = {
            let mut state = self.lock_state();
            let removed = state.store.purge_sent()?;
            state
                .entries
                .retain(|e| e.status != mv_core::EntryStatus::Sent);
            self.publish_locked(&state);
            removed
        };
        let _ = self.notice_tx.send(QueueNotice::SentCleared { removed });
        Ok(removed)
    }

    /// Re-read the store into the in-memory mirror.
    pub fn reload(&self) -> EngineResult<()> {
        let mut state = self.lock_state();
        state.entries = state.store.load_all()?;
        self.publish_locked(&state);
        Ok(())
    }

    /// One drain cycle: deliver every eligible entry, oldest first.
    ///
    /// Single-flight: a request arriving while a cycle runs coalesces into
    /// [`DrainOutcome::AlreadyRunning`]. Per-entry network failures become
    /// entry state and never abort the cycle; store failures propagate.
    pub async fn drain(&self) -> EngineResult<DrainOutcome> {
        let _guard = match self.drain_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => return Ok(DrainOutcome::AlreadyRunning),
        };

        if !self.is_online() {
            return Ok(DrainOutcome::Offline);
        }

        let batch = {
            let mut state = self.lock_state();
            let mut batch: Vec<MovementEntry> = state
                .entries
                .iter()
                .filter(|e| e.is_pending(self.config.max_retries))
                .cloned()
                .collect();
            batch.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            if !batch.is_empty() {
                state.last_sync_error = None;
            }
            batch
        };

        if batch.is_empty() {
            return Ok(DrainOutcome::Idle);
        }

        self.syncing.store(true, Ordering::SeqCst);
        self.publish();

        let result = self.drain_batch(&batch).await;

        self.syncing.store(false, Ordering::SeqCst);
        self.publish();

        let (sent, failed) = result?;
        tracing::info!("drain cycle complete: {} sent, {} failed", sent, failed);
        Ok(DrainOutcome::Completed { sent, failed })
    }

    /// Sequentially attempt every entry in the batch.
    async fn drain_batch(&self, batch: &[MovementEntry]) -> EngineResult<(usize, usize)> {
        let mut sent = 0;
        let mut failed = 0;

        for picked in batch {
            // Re-read: the entry may have been deleted, edited, or frozen
            // since selection.
            let Some(current) = self.find(&picked.id) else {
                continue;
            };
            if !current.is_pending(self.config.max_retries) {
                continue;
            }

            if current.retries > 0 {
                tokio::time::sleep(self.config.backoff_delay(current.retries)).await;
            }

            // State may have moved again during the backoff wait.
            let Some(current) = self.find(&picked.id) else {
                continue;
            };
            if !current.is_pending(self.config.max_retries) {
                continue;
            }

            if self.send_entry(current).await? {
                sent += 1;
            } else {
                failed += 1;
            }
        }

        Ok((sent, failed))
    }

    /// One delivery attempt. Returns true on success, false when the entry
    /// was marked failed.
    async fn send_entry(&self, entry: MovementEntry) -> EngineResult<bool> {
        // Session gate: without a credential and write scope the attempt
        // cannot succeed, so fail as auth without touching the network.
        let credential = match self.session.current_credential() {
            None => {
                self.record_failure(entry, &ClassifiedError::missing_credential())?;
                return Ok(false);
            }
            Some(credential) => {
                if !self.session.has_write_scope() {
                    self.record_failure(entry, &ClassifiedError::missing_write_scope())?;
                    return Ok(false);
                }
                credential
            }
        };

        let mut sending = entry;
        sending.mark_sending();
        self.upsert(sending.clone())?;

        tracing::debug!("delivery attempt {} for {}", sending.retries + 1, sending.id);
        let payload = MovementPayload::from_entry(&sending);
        let result = {
            let mut api = self.api.lock().await;
            api.post_movement(&credential, payload).await
        };

        match result {
            Ok(()) => {
                // Re-read after the network await; a concurrent delete wins.
                if let Some(mut latest) = self.find(&sending.id) {
                    latest.mark_sent();
                    self.upsert(latest)?;
                }
                Ok(true)
            }
            Err(err) => {
                let classified = err.classify();
                let latest = self.find(&sending.id).unwrap_or(sending);
                self.record_failure(latest, &classified)?;
                Ok(false)
            }
        }
    }

    /// Persist a failed attempt and signal the session layer on auth loss.
    fn record_failure(
        &self,
        mut entry: MovementEntry,
        classified: &ClassifiedError,
    ) -> EngineResult<()> {
        entry.mark_failed(classified, self.config.max_retries);
        if !classified.category.retryable() {
            tracing::warn!(
                "{} frozen after terminal {} failure",
                entry.id,
                classified.category
            );
        }

        {
            let mut state = self.lock_state();
            state.store.put(&entry)?;
            match state.entries.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => *existing = entry,
                None => state.entries.push(entry),
            }
            state.last_sync_error = Some(classified.user_message.clone());
            self.publish_locked(&state);
        }

        if classified.category == ErrorCategory::Auth {
            self.session.on_session_invalidated();
        }
        Ok(())
    }

    /// Validate, persist, and mirror a new entry.
    fn insert_new(&self, input: MovementInput) -> EngineResult<MovementEntry> {
        let input = input.normalize();
        input.validate()?;

        let mut state = self.lock_state();
        let created_at = Utc::now();
        let entry_id = id::generate_unique_id(&input, &created_at, |candidate| {
            state.entries.iter().any(|e| e.id == candidate)
        });
        let entry = MovementEntry::new(input, entry_id, created_at);

        state.store.put(&entry)?;
        state.entries.push(entry.clone());
        self.publish_locked(&state);
        tracing::debug!("movement {} enqueued", entry.id);
        Ok(entry)
    }

    /// Persist and mirror an updated entry.
    fn upsert(&self, entry: MovementEntry) -> EngineResult<()> {
        let mut state = self.lock_state();
        state.store.put(&entry)?;
        match state.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => state.entries.push(entry),
        }
        self.publish_locked(&state);
        Ok(())
    }

    /// Latest in-memory copy of an entry.
    fn find(&self, id: &str) -> Option<MovementEntry> {
        self.lock_state().entries.iter().find(|e| e.id == id).cloned()
    }

    /// Lock the queue state, recovering from poisoning (a panicking holder
    /// cannot leave the store and mirror inconsistent: both are updated
    /// under the same critical section).
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Publish a snapshot of the current state.
    fn publish(&self) {
        let state = self.lock_state();
        self.publish_locked(&state);
    }

    /// Publish a snapshot while already holding the state lock.
    fn publish_locked(&self, state: &QueueState) {
        let snapshot = QueueSnapshot::from_entries(
            &state.entries,
            self.config.max_retries,
            self.syncing.load(Ordering::SeqCst),
            state.last_sync_error.clone(),
        );
        self.snapshot_tx.send_replace(snapshot);
    }
}
