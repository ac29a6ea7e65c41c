//! # Infrastructure Layer
//!
//! Concrete implementations behind the traits defined in `rotor_core`:
//! - **Database**: MySQL rotation store and user directory using SQLx
//! - **Cache**: Redis rotation store with a server-side compare-and-advance script
//! - **Logging**: tracing subscriber setup driven by `LoggingConfig`
//!
//! [`initialize`] wires the configured backend into a ready `TokenService`.

use std::path::Path;
use std::sync::Arc;

use rotor_core::errors::DomainError;
use rotor_core::repositories::{
    IdentityDirectory, InMemoryIdentityDirectory, InMemoryRotationStore, RotationStore,
};
use rotor_core::services::token::{
    KeyProvider, RotationCleanupConfig, RotationCleanupService, TokenService, TokenServiceConfig,
};
use rotor_shared::{AppConfig, StoreBackend};

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Cache module - Redis rotation store
pub mod cache;

/// Tracing subscriber setup
pub mod logging;

pub use cache::RedisRotationStore;
pub use database::{DatabasePool, MySqlIdentityDirectory, MySqlRotationStore};
pub use logging::init_tracing;

/// Token services wired to their configured backends
#[derive(Clone)]
pub struct RotorServices {
    pub token_service: Arc<TokenService>,
    pub rotation_store: Arc<dyn RotationStore>,
    pub identity_directory: Arc<dyn IdentityDirectory>,
    /// The process-local directory behind `identity_directory`, when the
    /// memory backend created one; callers register subjects through it
    pub local_directory: Option<Arc<InMemoryIdentityDirectory>>,
    pub cleanup: Arc<RotationCleanupService>,
}

/// Initialize the token services from configuration
///
/// This function:
/// - Loads and checks the signing keypair
/// - Connects the configured rotation store backend
/// - Connects the MySQL user directory (in-memory for the memory backend)
///
/// Fails fast on any key or connection problem.
pub async fn initialize(config: &AppConfig) -> Result<RotorServices, InfrastructureError> {
    initialize_with_directory(config, None).await
}

/// Initialize the token services with a caller-supplied identity directory
///
/// # Arguments
/// * `config` - Application configuration
/// * `directory` - Directory to read identity attributes from; `None` uses the
///   backend default (MySQL `users`, or an in-memory map for the memory backend)
pub async fn initialize_with_directory(
    config: &AppConfig,
    directory: Option<Arc<dyn IdentityDirectory>>,
) -> Result<RotorServices, InfrastructureError> {
    tracing::info!(
        environment = %config.environment,
        backend = ?config.auth.store_backend,
        external_directory = directory.is_some(),
        "Initializing token services"
    );

    let keys = KeyProvider::load(&config.auth.jwt)?;
    let refresh_ttl = config.auth.refresh_token_expiry_seconds();

    let mut local_directory = None;
    let mut pool = None;

    let rotation_store: Arc<dyn RotationStore> = match config.auth.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory rotation store; rotation state is process-local");
            Arc::new(InMemoryRotationStore::new())
        }
        StoreBackend::Mysql => {
            let mysql = DatabasePool::new(config.database.clone()).await?;
            let store = Arc::new(MySqlRotationStore::new(mysql.get_pool().clone()));
            pool = Some(mysql);
            store
        }
        StoreBackend::Redis => {
            Arc::new(RedisRotationStore::connect(&config.cache, refresh_ttl).await?)
        }
    };

    let identity_directory: Arc<dyn IdentityDirectory> = match (directory, config.auth.store_backend) {
        (Some(directory), _) => directory,
        (None, StoreBackend::Memory) => {
            let directory = Arc::new(InMemoryIdentityDirectory::new());
            local_directory = Some(directory.clone());
            directory
        }
        (None, _) => {
            let mysql = match pool {
                Some(mysql) => mysql,
                None => DatabasePool::new(config.database.clone()).await?,
            };
            Arc::new(MySqlIdentityDirectory::new(mysql.get_pool().clone()))
        }
    };

    let token_service = TokenService::new(
        keys,
        rotation_store.clone(),
        identity_directory.clone(),
        TokenServiceConfig::from_auth_config(&config.auth),
    );
    let cleanup = RotationCleanupService::new(
        rotation_store.clone(),
        RotationCleanupConfig::default(),
        refresh_ttl,
    );

    tracing::info!("Token services initialized successfully");

    Ok(RotorServices {
        token_service: Arc::new(token_service),
        rotation_store,
        identity_directory,
        local_directory,
        cleanup: Arc::new(cleanup),
    })
}

/// Load configuration, install the tracing subscriber and initialize
///
/// # Arguments
/// * `path` - Optional TOML configuration file layered under `ROTOR__*` variables
pub async fn bootstrap(path: Option<&Path>) -> Result<RotorServices, InfrastructureError> {
    let config = AppConfig::load(path)?;
    init_tracing(&config.logging)?;
    initialize(&config).await
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key loading or other domain error raised during setup
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<rotor_shared::ConfigError> for InfrastructureError {
    fn from(e: rotor_shared::ConfigError) -> Self {
        InfrastructureError::Config(e.to_string())
    }
}
