//! Token service module
//!
//! - Asymmetric key loading (`KeyProvider`)
//! - Signed token encoding and decoding (`TokenCodec`)
//! - Session issuance, access token validation and refresh rotation (`TokenService`)
//! - Background purge of stale rotation records (`RotationCleanupService`)

mod cleanup;
mod clock;
mod codec;
mod config;
mod key_provider;
mod service;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, RotationCleanupConfig, RotationCleanupService};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::TokenCodec;
pub use config::TokenServiceConfig;
pub use key_provider::{parse_algorithm, KeyProvider};
pub use service::TokenService;
