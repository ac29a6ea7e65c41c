//! Redis implementation of the RotationStore trait

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, Script};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use rotor_core::domain::entities::token::{RotationRecord, SubjectId};
use rotor_core::errors::{AuthError, DomainError};
use rotor_core::repositories::RotationStore;
use rotor_shared::CacheConfig;

use crate::InfrastructureError;

const ROTATION_ADVANCE: &str = include_str!("rotation_advance.lua");

const FIELD_REFRESH_ID: &str = "rid";
const FIELD_UPDATED_AT: &str = "updated_at";

const CONNECT_ATTEMPTS: u32 = 3;
const RETRY_DELAY_MS: u64 = 100;

/// Rotation store holding one Redis hash per subject
///
/// Records expire together with the refresh token they guard, so
/// `purge_stale` has nothing to do.
#[derive(Clone)]
pub struct RedisRotationStore {
    connection: MultiplexedConnection,
    key_prefix: String,
    ttl_seconds: i64,
    advance: Script,
}

impl RedisRotationStore {
    /// Connect to Redis and build the store
    ///
    /// # Arguments
    /// * `config` - Redis URL, key prefix and connection timeout
    /// * `ttl_seconds` - Lifetime of each record, normally the refresh token TTL
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Connected store or error
    pub async fn connect(config: &CacheConfig, ttl_seconds: i64) -> Result<Self, InfrastructureError> {
        info!("Connecting rotation store to Redis at {}", mask_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::connect_with_retry(&client, Duration::from_secs(config.connection_timeout)).await?;

        Ok(Self::new(connection, config.key_prefix.clone(), ttl_seconds))
    }

    /// Build the store over an existing connection
    pub fn new(connection: MultiplexedConnection, key_prefix: impl Into<String>, ttl_seconds: i64) -> Self {
        Self {
            connection,
            key_prefix: key_prefix.into(),
            ttl_seconds,
            advance: Script::new(ROTATION_ADVANCE),
        }
    }

    async fn connect_with_retry(
        client: &Client,
        connect_timeout: Duration,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = RETRY_DELAY_MS;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let outcome = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result,
                Err(_) => Err(redis::RedisError::from((
                    redis::ErrorKind::IoError,
                    "Connection timed out",
                ))),
            };

            match outcome {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < CONNECT_ATTEMPTS => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, CONNECT_ATTEMPTS, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay *= 2;
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    pub(crate) fn key(&self, subject_id: &SubjectId) -> String {
        format!("{}:{}", self.key_prefix, subject_id)
    }
}

fn unavailable(operation: &str, e: redis::RedisError) -> DomainError {
    error!(operation, error = %e, "Redis rotation store command failed");
    AuthError::StoreUnavailable {
        message: format!("{} failed: {}", operation, e),
    }
    .into()
}

/// Turns a `HGETALL` reply into a record; an empty reply means no record
pub(crate) fn record_from_hash(
    subject_id: &SubjectId,
    fields: HashMap<String, String>,
) -> Result<Option<RotationRecord>, DomainError> {
    let Some(current_refresh_id) = fields.get(FIELD_REFRESH_ID) else {
        return Ok(None);
    };

    let updated_at = fields
        .get(FIELD_UPDATED_AT)
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        .ok_or_else(|| DomainError::Internal {
            message: format!("Rotation record for {} has no valid updated_at", subject_id),
        })?;

    Ok(Some(RotationRecord {
        subject_id: subject_id.clone(),
        current_refresh_id: current_refresh_id.clone(),
        updated_at,
    }))
}

/// Hides credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[async_trait]
impl RotationStore for RedisRotationStore {
    async fn put(&self, subject_id: &SubjectId, refresh_id: &str) -> Result<(), DomainError> {
        let key = self.key(subject_id);
        let mut conn = self.connection.clone();

        let _: () = redis::pipe()
            .atomic()
            .cmd("DEL")
            .arg(&key)
            .ignore()
            .cmd("HSET")
            .arg(&key)
            .arg(FIELD_REFRESH_ID)
            .arg(refresh_id)
            .arg(FIELD_UPDATED_AT)
            .arg(Utc::now().timestamp_millis())
            .ignore()
            .cmd("EXPIRE")
            .arg(&key)
            .arg(self.ttl_seconds)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| unavailable("put", e))?;

        Ok(())
    }

    async fn compare_and_advance(
        &self,
        subject_id: &SubjectId,
        expected: &str,
        new: &str,
    ) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        let advanced: i64 = self
            .advance
            .key(self.key(subject_id))
            .arg(expected)
            .arg(new)
            .arg(Utc::now().timestamp_millis())
            .arg(self.ttl_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| unavailable("compare_and_advance", e))?;

        Ok(advanced == 1)
    }

    async fn get(&self, subject_id: &SubjectId) -> Result<Option<RotationRecord>, DomainError> {
        let mut conn = self.connection.clone();

        let fields: HashMap<String, String> = conn
            .hgetall(self.key(subject_id))
            .await
            .map_err(|e| unavailable("get", e))?;

        record_from_hash(subject_id, fields)
    }

    async fn revoke(&self, subject_id: &SubjectId) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        let removed: i64 = conn
            .del(self.key(subject_id))
            .await
            .map_err(|e| unavailable("revoke", e))?;

        Ok(removed > 0)
    }

    async fn purge_stale(&self, _older_than: DateTime<Utc>) -> Result<usize, DomainError> {
        Ok(0)
    }
}
