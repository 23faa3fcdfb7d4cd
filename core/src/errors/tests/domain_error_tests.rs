//! Unit tests for domain error types

use crate::errors::{AuthError, DomainError, ValidationError};

#[test]
fn test_invalid_token_message_is_generic() {
    let message = AuthError::InvalidToken.to_string();
    assert!(message.contains("invalid or has expired"));
}

#[test]
fn test_lockout_message_includes_seconds() {
    let error = AuthError::TooManyAttempts {
        retry_after_seconds: 42,
    };
    assert!(error.to_string().contains("42 seconds"));
}

#[test]
fn test_validation_error_field() {
    let error = ValidationError::RequiredField {
        field: "code".to_string(),
    };
    assert_eq!(error.field(), "code");
    assert!(error.to_string().contains("code"));
}

#[test]
fn test_domain_error_bridges() {
    let error: DomainError = AuthError::InvalidToken.into();
    assert!(matches!(error, DomainError::Auth(AuthError::InvalidToken)));
    assert!(!error.is_validation());

    let error: DomainError = ValidationError::RequiredField {
        field: "email".to_string(),
    }
    .into();
    assert!(error.is_validation());

    let error = DomainError::persistence("disk full");
    assert_eq!(error.to_string(), "Persistence error: disk full");
}
