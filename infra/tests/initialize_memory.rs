//! Wiring of the token services with the in-memory backend

use std::sync::Arc;

use rotor_core::domain::entities::token::{IdentityAttributes, SubjectId};
use rotor_core::errors::{AuthError, DomainError, KeyError};
use rotor_core::repositories::{IdentityDirectory, InMemoryIdentityDirectory, RotationStore};
use rotor_infra::{initialize, initialize_with_directory, InfrastructureError};
use rotor_shared::{AppConfig, StoreBackend};

fn fixture(name: &str) -> String {
    format!("{}/../core/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn memory_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.store_backend = StoreBackend::Memory;
    config.auth.jwt.algorithm = "RS256".to_string();
    config.auth.jwt.private_key_path = fixture("rsa_private.pem");
    config.auth.jwt.public_key_path = fixture("rsa_public.pem");
    config.auth.jwt.key_id = Some("test-2024".to_string());
    config
}

#[tokio::test]
async fn test_initialize_issues_and_validates() {
    let services = initialize(&memory_config()).await.unwrap();
    let subject = SubjectId::new("user-1");

    let session = services
        .token_service
        .issue_session(&subject, &IdentityAttributes::new().with_role("member"))
        .await
        .unwrap();

    let claims = services
        .token_service
        .validate_access_token(&session.access_token)
        .unwrap();
    assert_eq!(claims.subject_id(), subject);

    let record = services.rotation_store.get(&subject).await.unwrap();
    assert!(record.is_some());
}

#[tokio::test]
async fn test_rotation_succeeds_for_registered_subject() {
    let services = initialize(&memory_config()).await.unwrap();
    let subject = SubjectId::new("user-1");
    let attributes = IdentityAttributes::new()
        .with_email("user-1@example.com")
        .with_role("member");

    services
        .local_directory
        .as_ref()
        .unwrap()
        .insert(subject.clone(), attributes.clone())
        .await;

    let session = services
        .token_service
        .issue_session(&subject, &attributes)
        .await
        .unwrap();

    let rotated = services
        .token_service
        .rotate_refresh_token(&session.refresh_token)
        .await
        .unwrap();
    let claims = services
        .token_service
        .validate_access_token(&rotated.access_token)
        .unwrap();
    assert_eq!(claims.attrs, Some(attributes));

    let result = services
        .token_service
        .rotate_refresh_token(&session.refresh_token)
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::RefreshReuseDetected))
    ));
}

#[tokio::test]
async fn test_supplied_directory_is_used_for_rotation() {
    let directory = Arc::new(InMemoryIdentityDirectory::new());
    let subject = SubjectId::new("user-2");
    directory
        .insert(subject.clone(), IdentityAttributes::new().with_role("admin"))
        .await;

    let supplied: Arc<dyn IdentityDirectory> = directory.clone();
    let services = initialize_with_directory(&memory_config(), Some(supplied))
        .await
        .unwrap();
    assert!(services.local_directory.is_none());

    let session = services
        .token_service
        .issue_session(&subject, &IdentityAttributes::new().with_role("member"))
        .await
        .unwrap();
    let rotated = services
        .token_service
        .rotate_refresh_token(&session.refresh_token)
        .await
        .unwrap();

    let claims = services
        .token_service
        .validate_access_token(&rotated.access_token)
        .unwrap();
    assert_eq!(claims.attrs.unwrap().role.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_rotation_fails_closed_for_unregistered_subject() {
    let services = initialize(&memory_config()).await.unwrap();

    let session = services
        .token_service
        .issue_session(&SubjectId::new("ghost"), &IdentityAttributes::new())
        .await
        .unwrap();

    let result = services
        .token_service
        .rotate_refresh_token(&session.refresh_token)
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::IdentityLookupFailed { .. }))
    ));
}

#[tokio::test]
async fn test_initialize_rejects_mismatched_keys() {
    let mut config = memory_config();
    config.auth.jwt.public_key_path = fixture("other_rsa_public.pem");

    let result = initialize(&config).await;
    assert!(matches!(
        result,
        Err(InfrastructureError::Domain(DomainError::Key(KeyError::KeyMismatch)))
    ));
}

#[tokio::test]
async fn test_initialize_rejects_missing_key_file() {
    let mut config = memory_config();
    config.auth.jwt.private_key_path = fixture("does_not_exist.pem");

    let result = initialize(&config).await;
    assert!(matches!(
        result,
        Err(InfrastructureError::Domain(DomainError::Key(KeyError::KeyLoadError { .. })))
    ));
}

#[tokio::test]
async fn test_cleanup_runs_against_memory_store() {
    let services = initialize(&memory_config()).await.unwrap();

    let result = services.cleanup.run_cleanup().await.unwrap();
    assert!(result.is_success());
    assert_eq!(result.stale_records_deleted, 0);
}
