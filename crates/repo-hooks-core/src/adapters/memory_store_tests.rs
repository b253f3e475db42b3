//! Tests for the in-memory key-value store

use super::*;

#[tokio::test]
async fn test_get_missing_key_returns_none() {
    let store = InMemoryKeyValueStore::new();
    assert_eq!(store.get("webhooks/base/debian").await.unwrap(), None);
}

#[tokio::test]
async fn test_set_then_get() {
    let store = InMemoryKeyValueStore::new();
    store
        .set("webhooks/base/debian", Bytes::from_static(b"[1]"))
        .await
        .unwrap();

    let value = store.get("webhooks/base/debian").await.unwrap();
    assert_eq!(value, Some(Bytes::from_static(b"[1]")));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_set_replaces_value() {
    let store = InMemoryKeyValueStore::new();
    store.set("k", Bytes::from_static(b"old")).await.unwrap();
    store.set("k", Bytes::from_static(b"new")).await.unwrap();

    assert_eq!(
        store.get("k").await.unwrap(),
        Some(Bytes::from_static(b"new"))
    );
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_delete_removes_key_and_tolerates_absent_keys() {
    let store = InMemoryKeyValueStore::new();
    store.set("k", Bytes::from_static(b"v")).await.unwrap();

    store.delete("k").await.unwrap();
    assert!(store.is_empty());

    // Deleting again is not an error
    store.delete("k").await.unwrap();
}

#[tokio::test]
async fn test_clones_share_contents() {
    let store = InMemoryKeyValueStore::new();
    let clone = store.clone();

    store.set("k", Bytes::from_static(b"v")).await.unwrap();
    assert!(clone.get("k").await.unwrap().is_some());
}

#[tokio::test]
async fn test_closed_store_rejects_operations() {
    let store = InMemoryKeyValueStore::new();
    store.close().await.unwrap();

    assert!(matches!(store.get("k").await, Err(StorageError::Closed)));
    assert!(matches!(
        store.set("k", Bytes::new()).await,
        Err(StorageError::Closed)
    ));
    assert!(matches!(store.delete("k").await, Err(StorageError::Closed)));

    let health = store.health_check().await.unwrap();
    assert!(!health.healthy);
    assert_eq!(health.backend, "memory");
}

#[tokio::test]
async fn test_health_check_reports_healthy_when_open() {
    let store = InMemoryKeyValueStore::new();
    let health = store.health_check().await.unwrap();

    assert!(health.healthy);
    assert!(health.error_message.is_none());
}
