// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session port: credential and write-scope queries.
//!
//! The engine never acquires or refreshes credentials itself. It asks the
//! session layer for the current credential before each delivery attempt and
//! signals back when an auth failure occurs, so the session layer can clear
//! credentials and redirect the user.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Port for session-layer queries.
///
/// A missing credential or missing write scope is treated like an auth
/// failure: the entry is frozen out of automatic retry and no network call
/// is made.
pub trait SessionProvider: Send + Sync {
    /// The credential to send with the next delivery attempt, if any.
    fn current_credential(&self) -> Option<String>;

    /// Whether the session may record movements at all.
    fn has_write_scope(&self) -> bool;

    /// Called when a delivery attempt failed with an auth classification.
    ///
    /// Further attempts would repeat the same failure for every queued
    /// entry, so the session layer should invalidate the credential now.
    fn on_session_invalidated(&self);
}

/// Shared session providers work unchanged behind an `Arc`.
impl<T: SessionProvider + ?Sized> SessionProvider for std::sync::Arc<T> {
    fn current_credential(&self) -> Option<String> {
        (**self).current_credential()
    }

    fn has_write_scope(&self) -> bool {
        (**self).has_write_scope()
    }

    fn on_session_invalidated(&self) {
        (**self).on_session_invalidated()
    }
}

/// Fixed-credential session for composition roots without a session layer
/// (scripts, demos) and for tests.
pub struct StaticSession {
    credential: Mutex<Option<String>>,
    write_scope: bool,
    invalidated: AtomicBool,
}

impl StaticSession {
    /// Session with a credential and write scope.
    pub fn new(credential: impl Into<String>) -> Self {
        StaticSession {
            credential: Mutex::new(Some(credential.into())),
            write_scope: true,
            invalidated: AtomicBool::new(false),
        }
    }

    /// Session with a credential but no write scope.
    pub fn read_only(credential: impl Into<String>) -> Self {
        StaticSession {
            write_scope: false,
            ..StaticSession::new(credential)
        }
    }

    /// Session with no credential at all.
    pub fn signed_out() -> Self {
        StaticSession {
            credential: Mutex::new(None),
            write_scope: true,
            invalidated: AtomicBool::new(false),
        }
    }

    /// Whether an auth failure invalidated this session.
    pub fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::SeqCst)
    }
}

impl SessionProvider for StaticSession {
    fn current_credential(&self) -> Option<String> {
        self.credential
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn has_write_scope(&self) -> bool {
        self.write_scope
    }

    fn on_session_invalidated(&self) {
        self.invalidated.store(true, Ordering::SeqCst);
        self.credential
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }
}
