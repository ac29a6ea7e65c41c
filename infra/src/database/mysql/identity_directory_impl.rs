//! MySQL implementation of the IdentityDirectory trait.
//!
//! Reads the platform `users` table; this crate never writes to it.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};

use rotor_core::domain::entities::token::{IdentityAttributes, SubjectId};
use rotor_core::errors::{AuthError, DomainError};
use rotor_core::repositories::IdentityDirectory;

/// Read-only user directory backed by MySQL
pub struct MySqlIdentityDirectory {
    pool: MySqlPool,
}

impl MySqlIdentityDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityDirectory for MySqlIdentityDirectory {
    async fn get_identity_attributes(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Option<IdentityAttributes>, DomainError> {
        let query = r#"
            SELECT email, role
            FROM users
            WHERE id = ? AND is_active = TRUE
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(subject_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(subject_id = %subject_id, error = %e, "User directory query failed");
                DomainError::from(AuthError::StoreUnavailable {
                    message: format!("user directory query failed: {}", e),
                })
            })?;

        let Some(row) = result else {
            return Ok(None);
        };

        let email: Option<String> = row.try_get("email").map_err(|e| DomainError::Internal {
            message: format!("Failed to get email: {}", e),
        })?;
        let role: Option<String> = row.try_get("role").map_err(|e| DomainError::Internal {
            message: format!("Failed to get role: {}", e),
        })?;

        Ok(Some(IdentityAttributes {
            email,
            role,
            ..Default::default()
        }))
    }
}
