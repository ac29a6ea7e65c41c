//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::{AuthError, KeyError, TokenError};

use rotor_shared::{error_codes, ErrorResponse};
use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Message returned for every authentication failure
const UNAUTHENTICATED_MESSAGE: &str = "Authentication required";

impl DomainError {
    /// Whether the error belongs to the folded authentication failure class
    pub fn is_authentication_failure(&self) -> bool {
        match self {
            DomainError::Token(TokenError::TokenGenerationFailed) => false,
            DomainError::Token(_) => true,
            DomainError::Auth(AuthError::StoreUnavailable { .. }) => false,
            DomainError::Auth(_) => true,
            _ => false,
        }
    }

    /// Whether retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Auth(AuthError::StoreUnavailable { .. }))
    }

    /// Stable error code for the transport layer
    pub fn error_code(&self) -> &'static str {
        if self.is_authentication_failure() {
            error_codes::UNAUTHENTICATED
        } else if self.is_retryable() {
            error_codes::SERVICE_UNAVAILABLE
        } else {
            error_codes::INTERNAL_ERROR
        }
    }

    /// HTTP status the transport layer should use
    pub fn status_code(&self) -> u16 {
        if self.is_authentication_failure() {
            401
        } else if self.is_retryable() {
            503
        } else {
            500
        }
    }

    /// Build the generic response body; internal details never leak
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::from(self)
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(error: &DomainError) -> Self {
        if error.is_authentication_failure() {
            ErrorResponse::new(error.error_code(), UNAUTHENTICATED_MESSAGE)
        } else if error.is_retryable() {
            ErrorResponse::new(error.error_code(), "Service temporarily unavailable").retryable()
        } else {
            ErrorResponse::new(error.error_code(), "Internal server error")
        }
    }
}
