//! Configuration for the token service

use std::time::Duration;

use rotor_shared::{AuthConfig, RefreshCookieConfig};

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT issuer claim
    pub issuer: String,
    /// JWT audience claim
    pub audience: String,
    /// Access token lifetime in seconds
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl: i64,
    /// Refresh cookie delivery settings
    pub cookie: RefreshCookieConfig,
    /// Upper bound for each rotation store or identity directory call
    pub store_timeout: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from_auth_config(&AuthConfig::default())
    }
}

impl TokenServiceConfig {
    pub fn from_auth_config(config: &AuthConfig) -> Self {
        Self {
            issuer: config.jwt.issuer.clone(),
            audience: config.jwt.audience.clone(),
            access_token_ttl: config.access_token_expiry_seconds(),
            refresh_token_ttl: config.refresh_token_expiry_seconds(),
            cookie: config.cookie.clone(),
            store_timeout: Duration::from_millis(config.store_timeout_ms),
        }
    }
}
