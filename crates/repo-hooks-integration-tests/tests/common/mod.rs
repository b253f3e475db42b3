//! Common test utilities for repo-hooks-api integration tests
//!
//! This module provides:
//! - Router construction over in-memory or filesystem storage
//! - Request builders and a response capture helper

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use repo_hooks_api::{create_router, AppState, ServiceConfig};
use repo_hooks_core::{InMemoryKeyValueStore, KeyValueStore, WebhookService};
use std::sync::Arc;
use tower::ServiceExt;

#[allow(dead_code)]
pub const HOOK_URL: &str = "http://www.example.com/hook";
#[allow(dead_code)]
pub const HOOK_ID: &str = "d55ecc09f4cd1779d592b7c7f4bf3006fcb62a4c";
#[allow(dead_code)]
pub const HOOK2_URL: &str = "http://www.example.com/hook2";
#[allow(dead_code)]
pub const HOOK2_ID: &str = "bea56e556e7791c4a2cfec2d67b7fc8da9529851";

/// Captured response
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }
}

/// Test harness over a single store shared by every request
#[derive(Clone)]
pub struct TestApp {
    state: AppState,
}

#[allow(dead_code)]
impl TestApp {
    /// App over a fresh in-memory store and default configuration
    pub fn new() -> Self {
        Self::with_store(ServiceConfig::default(), Arc::new(InMemoryKeyValueStore::new()))
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryKeyValueStore::new()))
    }

    pub fn with_store(config: ServiceConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let service = Arc::new(WebhookService::new(store));
        Self {
            state: AppState::from_config(config, service),
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}
