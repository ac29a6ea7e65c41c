//! Unit tests for domain error types

use crate::domain::entities::token::TokenKind;
use crate::errors::{AuthError, DomainError, KeyError, TokenError};
use rotor_shared::ErrorResponse;

#[test]
fn test_token_errors_fold_to_unauthenticated() {
    let errors = [
        DomainError::Token(TokenError::MalformedToken),
        DomainError::Token(TokenError::BadSignature),
        DomainError::Token(TokenError::Expired),
        DomainError::Token(TokenError::WrongKind {
            expected: TokenKind::Access,
            actual: TokenKind::Refresh,
        }),
        DomainError::Auth(AuthError::Unauthenticated),
        DomainError::Auth(AuthError::RefreshReuseDetected),
    ];

    for error in &errors {
        let response: ErrorResponse = error.into();
        assert_eq!(error.status_code(), 401);
        assert_eq!(response.error, "UNAUTHENTICATED");
        assert_eq!(response.message, "Authentication required");
        assert!(!response.retryable);
    }
}

#[test]
fn test_store_unavailable_is_retryable() {
    let error = DomainError::Auth(AuthError::StoreUnavailable {
        message: "connection refused".to_string(),
    });

    assert!(error.is_retryable());
    assert_eq!(error.status_code(), 503);

    let response = error.to_response();
    assert_eq!(response.error, "SERVICE_UNAVAILABLE");
    assert!(response.retryable);
    assert!(!response.message.contains("connection refused"));
}

#[test]
fn test_key_errors_are_internal() {
    let error: DomainError = KeyError::KeyMismatch.into();
    assert_eq!(error.status_code(), 500);
    assert_eq!(error.error_code(), "INTERNAL_ERROR");
    assert!(!error.is_retryable());
}

#[test]
fn test_token_generation_failure_is_internal() {
    let error: DomainError = TokenError::TokenGenerationFailed.into();

    assert!(!error.is_authentication_failure());
    assert_eq!(error.status_code(), 500);
    assert_eq!(error.to_response().error, "INTERNAL_ERROR");
}

#[test]
fn test_wrong_kind_message() {
    let error = TokenError::WrongKind {
        expected: TokenKind::Refresh,
        actual: TokenKind::Access,
    };
    assert_eq!(error.to_string(), "Wrong token kind: expected refresh, got access");
}

#[test]
fn test_transparent_display() {
    let error: DomainError = AuthError::IdentityLookupFailed {
        message: "user 42 not found".to_string(),
    }
    .into();
    assert_eq!(error.to_string(), "Identity lookup failed: user 42 not found");
}
