//! Response bodies for the webhook API.

use repo_hooks_core::{WebhookCreated, WebhookEvent, WebhookId, WebhookRemoved};
use serde::{Deserialize, Serialize};

/// Body of a `201 Created` add response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookCreatedResponse {
    pub message: String,
    pub id: WebhookId,
    pub events: Vec<WebhookEvent>,
}

impl From<WebhookCreated> for WebhookCreatedResponse {
    fn from(created: WebhookCreated) -> Self {
        Self {
            message: "webhook created".to_string(),
            id: created.id,
            events: created.events,
        }
    }
}

/// Body of a successful delete response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookDeletedResponse {
    pub message: String,
    pub id: WebhookId,
}

impl From<WebhookRemoved> for WebhookDeletedResponse {
    fn from(removed: WebhookRemoved) -> Self {
        Self {
            message: "webhook deleted".to_string(),
            id: removed.id,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub storage: StorageHealth,
}

/// Storage portion of the health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageHealth {
    pub backend: String,
    pub healthy: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
