//! Identity directory trait: read-only access to user attributes.

use async_trait::async_trait;

use crate::domain::entities::token::{IdentityAttributes, SubjectId};
use crate::errors::DomainError;

/// Source of the identity attributes copied into access tokens
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Look up the current attributes of a subject
    ///
    /// # Returns
    /// * `Ok(Some(IdentityAttributes))` - Subject exists and is active
    /// * `Ok(None)` - Unknown or deactivated subject
    /// * `Err(DomainError)` - Directory unavailable
    async fn get_identity_attributes(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Option<IdentityAttributes>, DomainError>;
}
