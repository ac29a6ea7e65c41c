//! Error types for token handling, session authentication and key loading
//!
//! Display strings are for logs. Callers outside the core receive the
//! folded, generic form produced by [`super::DomainError::to_response`].

use thiserror::Error;

use crate::domain::entities::token::TokenKind;

/// Authentication outcomes surfaced by the token service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Any token check failed; the specific reason is only logged
    #[error("Authentication required")]
    Unauthenticated,

    /// A signed, unexpired refresh token that is no longer current was presented
    #[error("Refresh token reuse detected")]
    RefreshReuseDetected,

    /// The rotation store could not be reached or timed out
    #[error("Rotation store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Identity attributes could not be read after a rotation was committed
    #[error("Identity lookup failed: {message}")]
    IdentityLookupFailed { message: String },
}

/// Token encoding and decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature verification failed")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Wrong token kind: expected {expected}, got {actual}")]
    WrongKind { expected: TokenKind, actual: TokenKind },

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Signing key errors, raised at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Failed to load signing key: {message}")]
    KeyLoadError { message: String },

    #[error("Unsupported signing algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("Private and public keys do not correspond")]
    KeyMismatch,
}
