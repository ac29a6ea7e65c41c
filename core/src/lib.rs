//! # Rotor Core
//!
//! Token issuance, validation and race-safe refresh rotation.
//! This crate contains the domain entities, the key provider and token codec,
//! the rotation store and identity directory interfaces, the token service,
//! and the error types shared by every layer above it.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    IdentityAttributes, RefreshCookie, RefreshTokenState, RotationRecord, Session, SubjectId,
    TokenClaims, TokenKind, CLAIMS_VERSION,
};
pub use errors::{AuthError, DomainError, DomainResult, KeyError, TokenError};
pub use repositories::{
    IdentityDirectory, InMemoryIdentityDirectory, InMemoryRotationStore, RotationStore,
};
pub use services::{
    Clock, KeyProvider, ManualClock, RotationCleanupConfig, RotationCleanupService, SystemClock,
    TokenCodec, TokenService, TokenServiceConfig,
};
