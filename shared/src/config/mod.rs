//! Configuration module
//!
//! - `auth` - JWT signing, refresh cookie and rotation store settings
//! - `cache` - Redis connection for the Redis rotation store
//! - `database` - MySQL pool for the rotation table and user directory
//! - `environment` - Environment detection and logging configuration
//!
//! Sources are layered in this order, later ones winning:
//! built-in defaults, an optional TOML file, then `ROTOR__*` variables
//! (`ROTOR__AUTH__JWT__ISSUER`, `ROTOR__DATABASE__URL`, ...).

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub use auth::{
    AuthConfig, JwtConfig, RefreshCookieConfig, StoreBackend, MAX_TOKEN_LIFETIME_SECONDS,
};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// Values were loaded but are not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Token issuance and rotation configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Redis configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            auth: AuthConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional TOML file and `ROTOR__*` variables
    ///
    /// The environment's dotenv file (`.env.production`, ...) and then `.env`
    /// are read first when present.
    ///
    /// # Arguments
    /// * `path` - Optional configuration file; it must exist when given
    ///
    /// # Returns
    /// * `Result<AppConfig, ConfigError>` - The validated configuration
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::from_filename(Environment::from_env().env_file()).ok();
        dotenvy::dotenv().ok();

        let defaults = Self::for_environment(Environment::from_env());
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&defaults)?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let config: AppConfig = builder
            .add_source(
                ::config::Environment::with_prefix("ROTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the flat variables each sub-config understands
    /// (`JWT_*`, `DATABASE_URL`, `REDIS_URL`, ...)
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        Self {
            environment: env,
            auth: AuthConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            logging: LoggingConfig::for_environment(env),
        }
    }

    /// Defaults tuned for an environment
    pub fn for_environment(env: Environment) -> Self {
        let mut config = Self {
            environment: env,
            logging: LoggingConfig::for_environment(env),
            ..Default::default()
        };
        if env.allows_insecure_cookies() {
            config.auth.cookie.secure = false;
        }
        config
    }

    /// Reject values the token services cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let jwt = &self.auth.jwt;

        if jwt.issuer.trim().is_empty() {
            return Err(ConfigError::Invalid("jwt issuer must not be empty".to_string()));
        }
        if jwt.audience.trim().is_empty() {
            return Err(ConfigError::Invalid("jwt audience must not be empty".to_string()));
        }
        if jwt.access_token_expiry <= 0 || jwt.refresh_token_expiry <= 0 {
            return Err(ConfigError::Invalid(
                "token lifetimes must be positive".to_string(),
            ));
        }
        if jwt.access_token_expiry > MAX_TOKEN_LIFETIME_SECONDS
            || jwt.refresh_token_expiry > MAX_TOKEN_LIFETIME_SECONDS
        {
            return Err(ConfigError::Invalid(format!(
                "token lifetimes must not exceed {} seconds",
                MAX_TOKEN_LIFETIME_SECONDS
            )));
        }
        if jwt.refresh_token_expiry < jwt.access_token_expiry {
            return Err(ConfigError::Invalid(
                "refresh lifetime must not be shorter than access lifetime".to_string(),
            ));
        }
        if self.auth.store_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if !self.auth.cookie.secure && !self.environment.allows_insecure_cookies() {
            return Err(ConfigError::Invalid(format!(
                "refresh cookie must be secure in {}",
                self.environment
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_lifetime_upper_bound() {
        let mut config = AppConfig::default();
        config.auth.jwt.refresh_token_expiry = MAX_TOKEN_LIFETIME_SECONDS;
        assert!(config.validate().is_ok());

        config.auth.jwt.refresh_token_expiry = MAX_TOKEN_LIFETIME_SECONDS + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.auth.jwt.refresh_token_expiry = i64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_insecure_cookie_rejected_outside_development() {
        let mut config = AppConfig::for_environment(Environment::Staging);
        config.auth.cookie.secure = false;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = AppConfig::for_environment(Environment::Development);
        assert!(!config.auth.cookie.secure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_development_cookie_is_not_secure() {
        let config = AppConfig::for_environment(Environment::Development);
        assert!(!config.auth.cookie.secure);

        let config = AppConfig::for_environment(Environment::Production);
        assert!(config.auth.cookie.secure);
    }

    #[test]
    fn test_validate_rejects_bad_lifetimes() {
        let mut config = AppConfig::default();
        config.auth.jwt.access_token_expiry = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.auth.jwt.refresh_token_expiry = 60;
        config.auth.jwt.access_token_expiry = 120;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_audience() {
        let mut config = AppConfig::default();
        config.auth.jwt.audience = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("rotor-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rotor.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[auth]
store_backend = "redis"
store_timeout_ms = 500

[auth.jwt]
algorithm = "EdDSA"
issuer = "https://issuer.test"
private_key_path = "k/priv.pem"
public_key_path = "k/pub.pem"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.auth.store_backend, StoreBackend::Redis);
        assert_eq!(config.auth.store_timeout_ms, 500);
        assert_eq!(config.auth.jwt.algorithm, "EdDSA");
        assert_eq!(config.auth.jwt.issuer, "https://issuer.test");
        assert_eq!(config.auth.jwt.audience, "rotor-api");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/rotor.toml")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
