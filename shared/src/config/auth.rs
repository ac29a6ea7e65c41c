//! Token issuance and rotation configuration

use serde::{Deserialize, Serialize};

/// Longest token lifetime accepted from configuration (ten years)
pub const MAX_TOKEN_LIFETIME_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Asymmetric signing algorithm (RS256, PS256, ES256, EdDSA, ...)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Path to the PEM-encoded private key
    pub private_key_path: String,

    /// Path to the PEM-encoded public key
    pub public_key_path: String,

    /// Optional key identifier written to the token header
    #[serde(default)]
    pub key_id: Option<String>,

    /// JWT issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// JWT audience claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Access token expiry time in seconds
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            private_key_path: String::from("keys/jwt_private_key.pem"),
            public_key_path: String::from("keys/jwt_public_key.pem"),
            key_id: None,
            issuer: default_issuer(),
            audience: default_audience(),
            access_token_expiry: default_access_expiry(),
            refresh_token_expiry: default_refresh_expiry(),
        }
    }
}

impl JwtConfig {
    /// Create a configuration pointing at the given key files
    pub fn new(private_key_path: impl Into<String>, public_key_path: impl Into<String>) -> Self {
        Self {
            private_key_path: private_key_path.into(),
            public_key_path: public_key_path.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH")
                .unwrap_or(defaults.private_key_path),
            public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH")
                .unwrap_or(defaults.public_key_path),
            key_id: std::env::var("JWT_KEY_ID").ok(),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            access_token_expiry: std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.access_token_expiry),
            refresh_token_expiry: std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_token_expiry),
        }
    }

    /// Set the signing algorithm
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }
}

/// Delivery instructions for the refresh token cookie
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshCookieConfig {
    /// Cookie name
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Cookie path, scoped to the rotation endpoint
    #[serde(default = "default_cookie_path")]
    pub path: String,

    /// Optional cookie domain
    #[serde(default)]
    pub domain: Option<String>,

    /// HTTPS only
    #[serde(default = "default_true")]
    pub secure: bool,

    /// Hidden from scripts
    #[serde(default = "default_true")]
    pub http_only: bool,

    /// SameSite attribute (Strict, Lax, None)
    #[serde(default = "default_same_site")]
    pub same_site: String,
}

impl Default for RefreshCookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            path: default_cookie_path(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: default_same_site(),
        }
    }
}

/// Which rotation store implementation to wire up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// MySQL table with conditional UPDATE
    Mysql,
    /// Redis hash with a Lua compare-and-advance script
    Redis,
    /// Process-local map, single instance deployments and tests only
    Memory,
}

impl Default for StoreBackend {
    fn default() -> Self {
        StoreBackend::Mysql
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(StoreBackend::Mysql),
            "redis" => Ok(StoreBackend::Redis),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

/// Complete token subsystem configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Refresh cookie configuration
    #[serde(default)]
    pub cookie: RefreshCookieConfig,

    /// Upper bound for a single store or directory call, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Rotation store backend
    #[serde(default)]
    pub store_backend: StoreBackend,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            cookie: RefreshCookieConfig::default(),
            store_timeout_ms: default_store_timeout_ms(),
            store_backend: StoreBackend::default(),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            cookie: RefreshCookieConfig::default(),
            store_timeout_ms: std::env::var("AUTH_STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_store_timeout_ms),
            store_backend: std::env::var("AUTH_STORE_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Access token expiry in seconds
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.jwt.access_token_expiry
    }

    /// Refresh token expiry in seconds
    pub fn refresh_token_expiry_seconds(&self) -> i64 {
        self.jwt.refresh_token_expiry
    }
}

fn default_algorithm() -> String {
    String::from("RS256")
}

fn default_issuer() -> String {
    String::from("rotor")
}

fn default_audience() -> String {
    String::from("rotor-api")
}

fn default_access_expiry() -> i64 {
    900 // 15 minutes
}

fn default_refresh_expiry() -> i64 {
    604800 // 7 days
}

fn default_cookie_name() -> String {
    String::from("refresh_token")
}

fn default_cookie_path() -> String {
    String::from("/api/v1/auth/refresh")
}

fn default_same_site() -> String {
    String::from("Strict")
}

fn default_store_timeout_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert_eq!(config.algorithm, "RS256");
        assert!(config.key_id.is_none());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("priv.pem", "pub.pem")
            .with_algorithm("EdDSA")
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(14);

        assert_eq!(config.private_key_path, "priv.pem");
        assert_eq!(config.public_key_path, "pub.pem");
        assert_eq!(config.algorithm, "EdDSA");
        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 14 * 86400);
    }

    #[test]
    fn test_cookie_defaults_are_locked_down() {
        let cookie = RefreshCookieConfig::default();
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.same_site, "Strict");
        assert_eq!(cookie.path, "/api/v1/auth/refresh");
    }

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("mysql".parse::<StoreBackend>().unwrap(), StoreBackend::Mysql);
        assert_eq!("Redis".parse::<StoreBackend>().unwrap(), StoreBackend::Redis);
        assert_eq!("in-memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_auth_config_partial_deserialization() {
        let json = r#"{ "jwt": { "private_key_path": "a.pem", "public_key_path": "b.pem" } }"#;
        let config: AuthConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.jwt.algorithm, "RS256");
        assert_eq!(config.jwt.issuer, "rotor");
        assert_eq!(config.store_timeout_ms, 2000);
        assert_eq!(config.store_backend, StoreBackend::Mysql);
        assert_eq!(config.cookie.name, "refresh_token");
    }
}
