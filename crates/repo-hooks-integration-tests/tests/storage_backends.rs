//! Filesystem-backed service behavior across restarts.

mod common;

use axum::http::StatusCode;
use common::{TestApp, HOOK2_URL, HOOK_ID, HOOK_URL};
use repo_hooks_api::{open_store, ServiceConfig, StorageBackend, StorageConfig};
use serde_json::json;

fn filesystem_config(dir: &tempfile::TempDir) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.storage = StorageConfig {
        backend: StorageBackend::Filesystem,
        path: dir.path().join("webhooks"),
    };
    config
}

async fn filesystem_app(config: &ServiceConfig) -> TestApp {
    let store = open_store(&config.storage).await.unwrap();
    TestApp::with_store(config.clone(), store)
}

#[tokio::test]
async fn test_registrations_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = filesystem_config(&dir);

    {
        let app = filesystem_app(&config).await;
        let response = app.post_json("/webhooks/debian", json!({ "url": HOOK_URL })).await;
        assert_eq!(response.status, StatusCode::CREATED);
        app.post_json(
            "/webhooks/testing/ubuntu",
            json!({ "url": HOOK2_URL, "events": ["existing"] }),
        )
        .await;
    }

    let app = filesystem_app(&config).await;
    let debian = app.get("/webhooks/debian").await.json();
    assert_eq!(debian[0]["id"], HOOK_ID);
    let ubuntu = app.get("/webhooks/testing/ubuntu").await.json();
    assert_eq!(ubuntu[0]["existing"], true);
}

#[tokio::test]
async fn test_removing_last_webhook_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = filesystem_config(&dir);
    let app = filesystem_app(&config).await;

    app.post_json("/webhooks/debian", json!({ "url": HOOK_URL }))
        .await;
    assert_eq!(std::fs::read_dir(&config.storage.path).unwrap().count(), 1);

    app.delete(&format!("/webhooks/debian/{}", HOOK_ID)).await;
    assert_eq!(std::fs::read_dir(&config.storage.path).unwrap().count(), 0);
}

#[tokio::test]
async fn test_corrupt_collection_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = filesystem_config(&dir);
    let app = filesystem_app(&config).await;

    app.post_json("/webhooks/debian", json!({ "url": HOOK_URL }))
        .await;
    let entry = std::fs::read_dir(&config.storage.path)
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    std::fs::write(entry.path(), b"{ truncated").unwrap();

    let response = app.get("/webhooks/debian").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.text().contains("truncated"));
}
