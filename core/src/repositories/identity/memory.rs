//! Process-local identity directory

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::token::{IdentityAttributes, SubjectId};
use crate::errors::DomainError;

use super::r#trait::IdentityDirectory;

/// Identity directory backed by a map
#[derive(Default)]
pub struct InMemoryIdentityDirectory {
    subjects: RwLock<HashMap<SubjectId, IdentityAttributes>>,
}

impl InMemoryIdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a subject's attributes
    pub async fn insert(&self, subject_id: SubjectId, attributes: IdentityAttributes) {
        self.subjects.write().await.insert(subject_id, attributes);
    }

    /// Remove a subject, returning its last attributes
    pub async fn remove(&self, subject_id: &SubjectId) -> Option<IdentityAttributes> {
        self.subjects.write().await.remove(subject_id)
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryIdentityDirectory {
    async fn get_identity_attributes(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Option<IdentityAttributes>, DomainError> {
        Ok(self.subjects.read().await.get(subject_id).cloned())
    }
}
