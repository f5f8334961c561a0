// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the session port.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use super::session::{SessionProvider, StaticSession};

#[test]
fn test_new_session_has_credential_and_write_scope() {
    let session = StaticSession::new("token-1");
    assert_eq!(session.current_credential().as_deref(), Some("token-1"));
    assert!(session.has_write_scope());
    assert!(!session.is_invalidated());
}

#[test]
fn test_read_only_session_keeps_credential() {
    let session = StaticSession::read_only("token-1");
    assert_eq!(session.current_credential().as_deref(), Some("token-1"));
    assert!(!session.has_write_scope());
}

#[test]
fn test_signed_out_session_has_no_credential() {
    let session = StaticSession::signed_out();
    assert_eq!(session.current_credential(), None);
    assert!(session.has_write_scope());
}

#[test]
fn test_invalidation_clears_credential() {
    let session = StaticSession::new("token-1");
    session.on_session_invalidated();

    assert!(session.is_invalidated());
    assert_eq!(session.current_credential(), None);
}

#[test]
fn test_arc_wrapped_session_delegates() {
    let session = Arc::new(StaticSession::new("token-1"));
    let handle: Arc<StaticSession> = Arc::clone(&session);

    assert_eq!(handle.current_credential().as_deref(), Some("token-1"));
    handle.on_session_invalidated();
    assert!(session.is_invalidated());
}
