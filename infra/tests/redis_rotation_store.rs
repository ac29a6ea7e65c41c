//! Integration tests for the Redis rotation store
//!
//! These tests require a running Redis instance.
//! Run with: cargo test -p rotor_infra --test redis_rotation_store -- --ignored

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use rotor_core::domain::entities::token::SubjectId;
use rotor_core::repositories::RotationStore;
use rotor_infra::RedisRotationStore;
use rotor_shared::CacheConfig;

async fn store() -> RedisRotationStore {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let suffix: u64 = rand::thread_rng().gen();
    let config = CacheConfig::new(url).with_key_prefix(format!("rotor:test:{:016x}", suffix));

    RedisRotationStore::connect(&config, 60).await.unwrap()
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_put_and_get() {
    let store = store().await;
    let subject = SubjectId::new("user-1");

    assert!(store.get(&subject).await.unwrap().is_none());

    store.put(&subject, "first").await.unwrap();
    store.put(&subject, "second").await.unwrap();

    let record = store.get(&subject).await.unwrap().unwrap();
    assert_eq!(record.current_refresh_id, "second");
    assert!(record.updated_at <= Utc::now());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_compare_and_advance_script() {
    let store = store().await;
    let subject = SubjectId::new("user-1");

    assert!(!store.compare_and_advance(&subject, "a", "b").await.unwrap());

    store.put(&subject, "a").await.unwrap();
    assert!(store.compare_and_advance(&subject, "a", "b").await.unwrap());
    assert!(!store.compare_and_advance(&subject, "a", "c").await.unwrap());
    assert_eq!(
        store.get(&subject).await.unwrap().unwrap().current_refresh_id,
        "b"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Requires Redis server
async fn test_concurrent_compare_and_advance_has_one_winner() {
    let store = Arc::new(store().await);
    let subject = SubjectId::new("user-1");
    store.put(&subject, "start").await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            let subject = subject.clone();
            tokio::spawn(async move {
                store
                    .compare_and_advance(&subject, "start", &format!("next-{}", i))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_revoke_and_purge() {
    let store = store().await;
    let subject = SubjectId::new("user-1");
    store.put(&subject, "a").await.unwrap();

    assert_eq!(store.purge_stale(Utc::now()).await.unwrap(), 0);
    assert!(store.revoke(&subject).await.unwrap());
    assert!(!store.revoke(&subject).await.unwrap());
    assert!(store.get(&subject).await.unwrap().is_none());
}
