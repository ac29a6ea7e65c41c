//! Shared configuration and common types for the Rotor token services
//!
//! This crate provides functionality used across the workspace:
//! - Configuration types and loading
//! - The generic error response handed to the transport layer

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, ConfigError, DatabaseConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig, RefreshCookieConfig, StoreBackend, MAX_TOKEN_LIFETIME_SECONDS,
};
pub use errors::{error_codes, ErrorResponse};
