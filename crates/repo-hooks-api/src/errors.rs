//! Error types for the HTTP service

use crate::access::AccessDenied;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use repo_hooks_core::{StorageError, ValidationError, WebhookServiceError};
use tracing::{error, warn};

/// Webhook API errors with HTTP status code mapping
///
/// - `400 Bad Request`: malformed scope, body, or URL
/// - `401 Unauthorized`: missing or wrong API token
/// - `404 Not Found`: webhook id not present in the scope
/// - `409 Conflict`: requested event not supported (plain-text body)
/// - `500 Internal Server Error` / `503 Service Unavailable`: storage failures
///
/// Storage error details are logged server-side; clients receive a generic
/// message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Requested event is not in the catalog
    ///
    /// Maps to: `409 Conflict`, body `"<name> event is not supported"`
    #[error("{name} event is not supported")]
    InvalidEvent { name: String },

    /// Webhook id not present in the scope
    ///
    /// Maps to: `404 Not Found`
    #[error("Webhook not found: {id}")]
    NotFound { id: String },

    /// Malformed path segment or request body
    ///
    /// Maps to: `400 Bad Request`
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Caller failed the access policy
    ///
    /// Maps to: `401 Unauthorized`
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AccessDenied),

    /// Storage backend failure
    ///
    /// Maps to: `503 Service Unavailable` when transient, `500` otherwise
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self::InvalidRequest {
            message: error.to_string(),
        }
    }
}

impl From<WebhookServiceError> for ApiError {
    fn from(error: WebhookServiceError) -> Self {
        match error {
            WebhookServiceError::InvalidEvent { name } => Self::InvalidEvent { name },
            WebhookServiceError::NotFound { id } => Self::NotFound { id: id.to_string() },
            WebhookServiceError::Validation(e) => e.into(),
            WebhookServiceError::Storage(e) => Self::Storage(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InvalidEvent { ref name } => {
                warn!(event = %name, "Rejected unsupported webhook event");
                // Plain-text body carrying only the message
                return (StatusCode::CONFLICT, self.to_string()).into_response();
            }
            Self::NotFound { ref id } => {
                warn!(webhook_id = %id, "Webhook not found");
                (StatusCode::NOT_FOUND, self.to_string())
            }
            Self::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::Unauthorized(ref reason) => {
                warn!(reason = %reason, "Request failed access policy");
                let body = error_body(StatusCode::UNAUTHORIZED, self.to_string());
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    Json(body),
                )
                    .into_response();
            }
            Self::Storage(ref e) => {
                // Log detailed error server-side but return generic message to client
                error!(error = %e, transient = e.is_transient(), "Storage failure");
                let status = if e.is_transient() {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (
                    status,
                    "Internal server error occurred. Please try again later.".to_string(),
                )
            }
        };

        (status, Json(error_body(status, message))).into_response()
    }
}

fn error_body(status: StatusCode, message: String) -> serde_json::Value {
    serde_json::json!({
        "error": message,
        "status": status.as_u16(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
