//! MySQL implementation of the RotationStore trait.
//!
//! One row per subject in `refresh_rotations`. Compare-and-advance is a
//! single conditional `UPDATE`; InnoDB row locking makes it atomic per
//! subject, and `rows_affected()` tells the winner from the loser.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use rotor_core::domain::entities::token::{RotationRecord, SubjectId};
use rotor_core::errors::{AuthError, DomainError};
use rotor_core::repositories::RotationStore;

/// MySQL implementation of RotationStore
pub struct MySqlRotationStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRotationStore {
    /// Create a new MySQL rotation store
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RotationRecord, DomainError> {
        let subject_id: String = row.try_get("subject_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get subject_id: {}", e),
        })?;
        let current_refresh_id: String =
            row.try_get("current_refresh_id")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get current_refresh_id: {}", e),
                })?;
        let updated_at: DateTime<Utc> =
            row.try_get("updated_at").map_err(|e| DomainError::Internal {
                message: format!("Failed to get updated_at: {}", e),
            })?;

        Ok(RotationRecord {
            subject_id: SubjectId::new(subject_id),
            current_refresh_id,
            updated_at,
        })
    }
}

/// Driver failures mean the store cannot answer; callers fail closed
fn unavailable(operation: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(operation, error = %e, "MySQL rotation store query failed");
    AuthError::StoreUnavailable {
        message: format!("{} failed: {}", operation, e),
    }
    .into()
}

#[async_trait]
impl RotationStore for MySqlRotationStore {
    async fn put(&self, subject_id: &SubjectId, refresh_id: &str) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO refresh_rotations (subject_id, current_refresh_id, updated_at)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE
                current_refresh_id = VALUES(current_refresh_id),
                updated_at = VALUES(updated_at)
        "#;

        sqlx::query(query)
            .bind(subject_id.as_str())
            .bind(refresh_id)
            .bind(Utc::now())
            .execute(&self.pool)
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
        let query = r#"
            UPDATE refresh_rotations
            SET current_refresh_id = ?, updated_at = ?
            WHERE subject_id = ? AND current_refresh_id = ?
        "#;

        let result = sqlx::query(query)
            .bind(new)
            .bind(Utc::now())
            .bind(subject_id.as_str())
            .bind(expected)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("compare_and_advance", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn get(&self, subject_id: &SubjectId) -> Result<Option<RotationRecord>, DomainError> {
        let query = r#"
            SELECT subject_id, current_refresh_id, updated_at
            FROM refresh_rotations
            WHERE subject_id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(subject_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("get", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn revoke(&self, subject_id: &SubjectId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_rotations WHERE subject_id = ?")
            .bind(subject_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("revoke", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_stale(&self, older_than: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_rotations WHERE updated_at < ?")
            .bind(older_than)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("purge_stale", e))?;

        let deleted = result.rows_affected() as usize;
        if deleted > 0 {
            tracing::info!(deleted, "Purged stale rotation records");
        }
        Ok(deleted)
    }
}
