//! Domain entities for token sessions and refresh rotation.

pub mod token;

pub use token::{
    IdentityAttributes, RefreshCookie, RefreshTokenState, RotationRecord, Session, SubjectId,
    TokenClaims, TokenKind, CLAIMS_VERSION,
};
