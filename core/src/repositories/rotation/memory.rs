//! Process-local rotation store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::entities::token::{RotationRecord, SubjectId};
use crate::errors::DomainError;
use crate::services::token::{Clock, SystemClock};

use super::r#trait::RotationStore;

/// Rotation store backed by a mutex-guarded map
///
/// The lock makes compare-and-advance atomic within one process. Suitable
/// for tests and single-instance deployments.
pub struct InMemoryRotationStore {
    records: Mutex<HashMap<SubjectId, RotationRecord>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRotationStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of subjects with a record
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl Default for InMemoryRotationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RotationStore for InMemoryRotationStore {
    async fn put(&self, subject_id: &SubjectId, refresh_id: &str) -> Result<(), DomainError> {
        let record = RotationRecord::new(subject_id.clone(), refresh_id, self.clock.now());
        self.records.lock().await.insert(subject_id.clone(), record);
        Ok(())
    }

    async fn compare_and_advance(
        &self,
        subject_id: &SubjectId,
        expected: &str,
        new: &str,
    ) -> Result<bool, DomainError> {
        let mut records = self.records.lock().await;

        match records.get_mut(subject_id) {
            Some(record) if record.is_current(expected) => {
                record.current_refresh_id = new.to_string();
                record.updated_at = self.clock.now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get(&self, subject_id: &SubjectId) -> Result<Option<RotationRecord>, DomainError> {
        Ok(self.records.lock().await.get(subject_id).cloned())
    }

    async fn revoke(&self, subject_id: &SubjectId) -> Result<bool, DomainError> {
        Ok(self.records.lock().await.remove(subject_id).is_some())
    }

    async fn purge_stale(&self, older_than: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut records = self.records.lock().await;
        let initial_count = records.len();

        records.retain(|_, record| record.updated_at >= older_than);

        Ok(initial_count - records.len())
    }
}
