//! HTTP client for the webhook API.

use repo_hooks_core::{AddWebhookRequest, WebhookEvent, WebhookId, WebhookView};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors talking to the webhook API
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid server URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook not found: {id}")]
    NotFound { id: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Not authorized; check --token or RH_API_TOKEN")]
    Unauthorized,

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },
}

/// Body of the add response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBody {
    pub message: String,
    pub id: WebhookId,
    pub events: Vec<WebhookEvent>,
}

/// Body of the delete response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedBody {
    pub message: String,
    pub id: WebhookId,
}

/// Body of the health response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Client for one repo-hooks server
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl WebhookClient {
    pub fn new(server_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let base_url = Url::parse(server_url).map_err(|e| ClientError::InvalidUrl {
            url: server_url.to_string(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: server_url.to_string(),
                message: "URL cannot carry a path".to_string(),
            });
        }

        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// List the webhooks of a repository
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        namespace: Option<&str>,
        repo: &str,
    ) -> Result<Vec<WebhookView>, ClientError> {
        let url = self.webhooks_url(namespace, repo, None)?;
        let response = self.authorized(self.http.get(url)).send().await?;
        let response = check_status(response, None).await?;
        Ok(response.json().await?)
    }

    /// Register a webhook
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn add(
        &self,
        namespace: Option<&str>,
        repo: &str,
        request: &AddWebhookRequest,
    ) -> Result<CreatedBody, ClientError> {
        let url = self.webhooks_url(namespace, repo, None)?;
        let response = self
            .authorized(self.http.post(url))
            .json(request)
            .send()
            .await?;
        let response = check_status(response, None).await?;
        Ok(response.json().await?)
    }

    /// Remove a webhook by id
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        namespace: Option<&str>,
        repo: &str,
        id: &str,
    ) -> Result<DeletedBody, ClientError> {
        let url = self.webhooks_url(namespace, repo, Some(id))?;
        let response = self.authorized(self.http.delete(url)).send().await?;
        let response = check_status(response, Some(id)).await?;
        Ok(response.json().await?)
    }

    /// Query server health
    ///
    /// An unhealthy server still answers with a health body, so 503 is
    /// returned as a body rather than an error.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthBody, ClientError> {
        let url = self.path_url(&["health"])?;
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return Ok(response.json().await?);
        }
        let response = check_status(response, None).await?;
        Ok(response.json().await?)
    }

    fn webhooks_url(
        &self,
        namespace: Option<&str>,
        repo: &str,
        id: Option<&str>,
    ) -> Result<Url, ClientError> {
        let mut segments = vec!["webhooks"];
        segments.extend(namespace);
        segments.push(repo);
        segments.extend(id);
        self.path_url(&segments)
    }

    fn path_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl {
                url: self.base_url.to_string(),
                message: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        debug!(url = %url, "Built request URL");
        Ok(url)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

async fn check_status(
    response: reqwest::Response,
    id: Option<&str>,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match (status, id) {
        (StatusCode::CONFLICT, _) => ClientError::Conflict { message: body },
        (StatusCode::UNAUTHORIZED, _) => ClientError::Unauthorized,
        (StatusCode::NOT_FOUND, Some(id)) => ClientError::NotFound { id: id.to_string() },
        _ => ClientError::Server {
            status: status.as_u16(),
            message: error_message(&body),
        },
    })
}

/// Pull the `error` field out of a JSON error body, or return the body as is
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
