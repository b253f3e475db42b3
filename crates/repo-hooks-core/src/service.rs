//! # Webhook Service
//!
//! The list/add/remove operations exposed to the HTTP layer.
//!
//! Callers are expected to have authenticated the request and resolved the
//! [`RepositoryScope`] before calling in; the service trusts both.

use crate::events::{EventCatalog, EventError, WebhookEvent};
use crate::identifier::WebhookId;
use crate::key_value::{KeyValueStore, StorageError, StorageHealthStatus};
use crate::record::{WebhookRecord, WebhookView};
use crate::repository::{RepositoryError, UpsertOutcome, WebhookRepository};
use crate::{ErrorCategory, RepositoryScope, ValidationError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

/// Body of an add-webhook request
///
/// `events` may be absent or empty, in which case `["new"]` is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddWebhookRequest {
    pub url: String,

    #[serde(default)]
    pub events: Option<Vec<String>>,
}

impl AddWebhookRequest {
    /// Create a request for `url` with the default events
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            events: None,
        }
    }

    /// Set the requested event names
    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = Some(events.into_iter().map(Into::into).collect());
        self
    }
}

/// Result of a successful add
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookCreated {
    pub id: WebhookId,
    pub events: Vec<WebhookEvent>,
}

/// Result of a successful remove
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookRemoved {
    pub id: WebhookId,
}

/// Errors returned by webhook operations
#[derive(Debug, Error)]
pub enum WebhookServiceError {
    /// A requested event is not in the catalog
    #[error("{name} event is not supported")]
    InvalidEvent { name: String },

    /// No webhook with the id exists in the scope
    #[error("Webhook not found: {id}")]
    NotFound { id: WebhookId },

    /// The request payload is malformed
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// Underlying storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl WebhookServiceError {
    /// Check if error is transient and may succeed on a later attempt
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::InvalidEvent { .. } | Self::NotFound { .. } | Self::Validation(_) => false,
        }
    }

    /// Get error category for monitoring and HTTP mapping
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::Storage(e) if e.is_transient() => ErrorCategory::Transient,
            Self::Storage(_)
            | Self::InvalidEvent { .. }
            | Self::NotFound { .. }
            | Self::Validation(_) => ErrorCategory::Permanent,
        }
    }
}

impl From<EventError> for WebhookServiceError {
    fn from(error: EventError) -> Self {
        match error {
            EventError::Unsupported { name } => Self::InvalidEvent { name },
        }
    }
}

impl From<RepositoryError> for WebhookServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound { id } => Self::NotFound { id },
            RepositoryError::Storage(e) => Self::Storage(e),
        }
    }
}

/// Webhook registration operations
///
/// Holds no per-request state; every call goes to the injected store.
///
/// # Examples
///
/// ```
/// use repo_hooks_core::{AddWebhookRequest, InMemoryKeyValueStore, RepositoryScope, WebhookService};
/// use std::sync::Arc;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = WebhookService::new(Arc::new(InMemoryKeyValueStore::new()));
/// let scope = RepositoryScope::in_default_namespace("debian")?;
///
/// let created = service
///     .add_webhook(&scope, AddWebhookRequest::new("http://www.example.com/hook"))
///     .await?;
/// assert_eq!(created.id.as_str(), "d55ecc09f4cd1779d592b7c7f4bf3006fcb62a4c");
/// # Ok(())
/// # }
/// ```
pub struct WebhookService {
    repository: WebhookRepository,
}

impl WebhookService {
    /// Create a service over an opened store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            repository: WebhookRepository::new(store),
        }
    }

    /// List the webhooks registered in `scope`, in insertion order
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn list_webhooks(
        &self,
        scope: &RepositoryScope,
    ) -> Result<Vec<WebhookView>, WebhookServiceError> {
        let records = self.repository.list(scope).await?;
        Ok(records.iter().map(WebhookRecord::to_view).collect())
    }

    /// Register a webhook, replacing any registration for the same URL
    ///
    /// Validation happens before any storage call, so a rejected request
    /// never changes the collection.
    #[instrument(skip(self, request), fields(scope = %scope, url = %request.url))]
    pub async fn add_webhook(
        &self,
        scope: &RepositoryScope,
        request: AddWebhookRequest,
    ) -> Result<WebhookCreated, WebhookServiceError> {
        if request.url.is_empty() {
            return Err(ValidationError::Required {
                field: "url".to_string(),
            }
            .into());
        }

        let requested = EventCatalog::resolve(request.events);
        let events = EventCatalog::validate(&requested)?;

        let record = WebhookRecord::new(request.url, events.clone());
        let id = record.id.clone();

        let outcome = self.repository.upsert(scope, record).await?;
        info!(
            webhook_id = %id,
            replaced = outcome == UpsertOutcome::Replaced,
            "Webhook registered"
        );

        Ok(WebhookCreated { id, events })
    }

    /// Remove the webhook with `id` from `scope`
    #[instrument(skip(self), fields(scope = %scope, webhook_id = %id))]
    pub async fn remove_webhook(
        &self,
        scope: &RepositoryScope,
        id: &WebhookId,
    ) -> Result<WebhookRemoved, WebhookServiceError> {
        let removed = self.repository.remove_by_id(scope, id).await?;
        info!("Webhook removed");

        Ok(WebhookRemoved { id: removed.id })
    }

    /// Check the health of the underlying store
    pub async fn health_check(&self) -> Result<StorageHealthStatus, StorageError> {
        self.repository.health_check().await
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
