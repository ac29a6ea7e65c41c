//! Rotation store trait defining the per-subject refresh identifier record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::{RotationRecord, SubjectId};
use crate::errors::DomainError;

/// Persistence for the single current refresh identifier of each subject
///
/// `compare_and_advance` is the only conditional mutator. Implementations
/// must make it linearizable per subject: of two calls expecting the same
/// id, at most one reports `true`.
///
/// Driver and connection failures are reported as
/// `AuthError::StoreUnavailable`.
#[async_trait]
pub trait RotationStore: Send + Sync {
    /// Unconditionally record `refresh_id` as current, replacing any previous record
    ///
    /// # Arguments
    /// * `subject_id` - Subject the session belongs to
    /// * `refresh_id` - Identifier embedded in the newly minted refresh token
    async fn put(&self, subject_id: &SubjectId, refresh_id: &str) -> Result<(), DomainError>;

    /// Atomically replace `expected` with `new`
    ///
    /// # Returns
    /// * `Ok(true)` - The record held `expected` and now holds `new`
    /// * `Ok(false)` - No record, or the record holds another id; nothing changed
    /// * `Err(DomainError)` - Store unavailable
    async fn compare_and_advance(
        &self,
        subject_id: &SubjectId,
        expected: &str,
        new: &str,
    ) -> Result<bool, DomainError>;

    /// Read the current record (diagnostics and tests only)
    ///
    /// # Returns
    /// * `Ok(Some(RotationRecord))` - Record found
    /// * `Ok(None)` - Subject has no record
    async fn get(&self, subject_id: &SubjectId) -> Result<Option<RotationRecord>, DomainError>;

    /// Delete the subject's record so every refresh token it holds becomes unknown
    ///
    /// # Returns
    /// * `Ok(true)` - A record was deleted
    /// * `Ok(false)` - Subject had no record
    async fn revoke(&self, subject_id: &SubjectId) -> Result<bool, DomainError>;

    /// Delete records not updated since `older_than`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records deleted
    async fn purge_stale(&self, older_than: DateTime<Utc>) -> Result<usize, DomainError>;
}
