// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the classify module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;

#[test]
fn test_401_is_auth() {
    let c = ClassifiedError::from_status(401, Some("token expired".to_string()));
    assert_eq!(c.category, ErrorCategory::Auth);
    assert_eq!(c.status, Some(401));
    assert_eq!(c.detail.as_deref(), Some("token expired"));
    assert!(c.hints.contains(&ActionHint::Login));
    assert!(!c.category.retryable());
}

#[test]
fn test_client_statuses() {
    for status in [400, 404, 405, 409, 422] {
        let c = ClassifiedError::from_status(status, None);
        assert_eq!(c.category, ErrorCategory::Client, "status {status}");
        assert!(!c.category.retryable());
        assert_eq!(c.hints, vec![ActionHint::Edit, ActionHint::Delete]);
    }
}

#[test]
fn test_server_statuses() {
    for status in [500, 502, 503, 599] {
        let c = ClassifiedError::from_status(status, None);
        assert_eq!(c.category, ErrorCategory::Server, "status {status}");
        assert!(c.category.retryable());
    }
}

#[test]
fn test_unmapped_status_is_unknown() {
    // 418 is neither auth, client-mapped, nor server
    let c = ClassifiedError::from_status(418, None);
    assert_eq!(c.category, ErrorCategory::Unknown);
    assert!(c.category.retryable());
}

#[test]
fn test_network_has_no_status() {
    let c = ClassifiedError::network(Some("connection refused".to_string()));
    assert_eq!(c.category, ErrorCategory::Network);
    assert_eq!(c.status, None);
    assert!(c.category.retryable());
}

#[test]
fn test_missing_credential_is_auth() {
    let c = ClassifiedError::missing_credential();
    assert_eq!(c.category, ErrorCategory::Auth);
    assert_eq!(c.status, None);
}

#[test]
fn test_missing_write_scope_is_auth() {
    let c = ClassifiedError::missing_write_scope();
    assert_eq!(c.category, ErrorCategory::Auth);
    assert!(!c.category.retryable());
}

#[test]
fn test_category_roundtrip() {
    for category in [
        ErrorCategory::Auth,
        ErrorCategory::Client,
        ErrorCategory::Server,
        ErrorCategory::Network,
        ErrorCategory::Unknown,
    ] {
        let parsed: ErrorCategory = category.as_str().parse().unwrap();
        assert_eq!(parsed, category);
    }
    assert!("fatal".parse::<ErrorCategory>().is_err());
}

#[test]
fn test_hint_roundtrip() {
    for hint in [
        ActionHint::Login,
        ActionHint::Retry,
        ActionHint::Edit,
        ActionHint::Delete,
    ] {
        let parsed: ActionHint = hint.as_str().parse().unwrap();
        assert_eq!(parsed, hint);
    }
    assert!("ignore".parse::<ActionHint>().is_err());
}
