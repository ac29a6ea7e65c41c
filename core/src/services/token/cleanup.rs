//! Periodic purge of rotation records that can no longer match a live token
//!
//! A record untouched for longer than the refresh token lifetime only
//! matches expired refresh tokens, so deleting it changes no outcome.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use rotor_shared::MAX_TOKEN_LIFETIME_SECONDS;

use crate::errors::DomainError;
use crate::repositories::RotationStore;

use super::clock::{Clock, SystemClock};

const MAX_GRACE_PERIOD_DAYS: i64 = 3650;

/// Configuration for rotation record cleanup
#[derive(Debug, Clone)]
pub struct RotationCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Extra time past refresh token expiry before a record is purged (in days)
    pub grace_period_days: i64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for RotationCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            grace_period_days: 1,
            enabled: true,
        }
    }
}

/// Service that purges stale rotation records
pub struct RotationCleanupService {
    store: Arc<dyn RotationStore>,
    config: RotationCleanupConfig,
    refresh_token_ttl: i64,
    clock: Arc<dyn Clock>,
}

impl RotationCleanupService {
    /// Create a new cleanup service
    ///
    /// # Arguments
    /// * `store` - Rotation store to purge
    /// * `config` - Schedule and grace period
    /// * `refresh_token_ttl` - Refresh token lifetime in seconds
    pub fn new(
        store: Arc<dyn RotationStore>,
        config: RotationCleanupConfig,
        refresh_token_ttl: i64,
    ) -> Self {
        Self {
            store,
            config,
            refresh_token_ttl,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run a single cleanup cycle
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of the cycle; store errors are collected, not raised
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let ttl = self.refresh_token_ttl.clamp(0, MAX_TOKEN_LIFETIME_SECONDS);
        let grace_days = self.config.grace_period_days.clamp(0, MAX_GRACE_PERIOD_DAYS);
        let cutoff = self.clock.now()
            - chrono::Duration::seconds(ttl)
            - chrono::Duration::days(grace_days);

        let mut result = CleanupResult::default();

        match self.store.purge_stale(cutoff).await {
            Ok(count) => {
                result.stale_records_deleted = count;
                info!(count, cutoff = %cutoff, "Purged stale rotation records");
            }
            Err(e) => {
                error!("Failed to purge stale rotation records: {}", e);
                result.errors.push(format!("Rotation cleanup error: {}", e));
            }
        }

        Ok(result)
    }

    /// Start the cleanup service as a background task
    ///
    /// Returns `None` when cleanup is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Rotation cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Rotation cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.errors.is_empty() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Rotation cleanup cycle failed: {}", e);
                    }
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of rotation records deleted
    pub stale_records_deleted: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
