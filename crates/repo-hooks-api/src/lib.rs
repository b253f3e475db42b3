//! # Repo-Hooks HTTP Service
//!
//! HTTP surface for registering webhooks against repositories.
//!
//! Routes:
//! - `GET    /webhooks/{repo}` and `GET /webhooks/{namespace}/{repo}`
//! - `POST   /webhooks/{repo}` and `POST /webhooks/{namespace}/{repo}`
//! - `DELETE /webhooks/{repo}/{id}` and `DELETE /webhooks/{namespace}/{repo}/{id}`
//! - `GET    /health`
//!
//! Single-segment forms operate in the [`DEFAULT_NAMESPACE`](repo_hooks_core::DEFAULT_NAMESPACE).

pub mod access;
pub mod config;
pub mod errors;
pub mod responses;

pub use access::{policy_for_token, AccessDenied, AccessPolicy, AllowAllAccess, BearerTokenAccess};
pub use config::{
    LoggingConfig, SecurityConfig, ServerConfig, ServiceConfig, StorageBackend, StorageConfig,
};
pub use errors::{ApiError, ConfigError, ServiceError};
pub use responses::{HealthResponse, StorageHealth, WebhookCreatedResponse, WebhookDeletedResponse};

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{delete, get},
    Router,
};
use repo_hooks_core::{
    AddWebhookRequest, FilesystemKeyValueStore, InMemoryKeyValueStore, KeyValueStore,
    RepositoryScope, StorageError, WebhookId, WebhookService, WebhookView,
};
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, instrument, warn};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: Arc<ServiceConfig>,

    /// Webhook registration operations
    pub webhook_service: Arc<WebhookService>,

    /// Access policy checked on every webhook route
    pub access_policy: Arc<dyn AccessPolicy>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: ServiceConfig,
        webhook_service: Arc<WebhookService>,
        access_policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            webhook_service,
            access_policy,
        }
    }

    /// State whose access policy follows `config.security`
    pub fn from_config(config: ServiceConfig, webhook_service: Arc<WebhookService>) -> Self {
        let access_policy = policy_for_token(config.security.api_token.as_deref());
        Self::new(config, webhook_service, access_policy)
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Open the key-value store selected by `config`
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory webhook storage; registrations are lost on restart");
            Ok(Arc::new(InMemoryKeyValueStore::new()))
        }
        StorageBackend::Filesystem => {
            info!(path = %config.path.display(), "Using filesystem webhook storage");
            let store = FilesystemKeyValueStore::new(config.path.clone()).await?;
            Ok(Arc::new(store))
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

// matchit requires one parameter name per position, so segments are named by
// position. Two segments mean `{namespace}/{repo}` for GET and POST but
// `{repo}/{id}` for DELETE.
const ONE_SEGMENT: &str = "/webhooks/{first}";
const TWO_SEGMENTS: &str = "/webhooks/{first}/{second}";
const THREE_SEGMENTS: &str = "/webhooks/{first}/{second}/{third}";

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let webhook_routes = Router::new()
        .route(
            ONE_SEGMENT,
            get(list_default_namespace).post(add_default_namespace),
        )
        .route(
            TWO_SEGMENTS,
            get(list_namespaced)
                .post(add_namespaced)
                .delete(remove_default_namespace),
        )
        .route(THREE_SEGMENTS, delete(remove_namespaced));

    let health_routes = Router::new().route("/health", get(handle_health_check));

    Router::new()
        .merge(webhook_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(DefaultBodyLimit::max(state.config.server.max_body_size))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server and run until SIGINT or SIGTERM
pub async fn start_server(state: AppState) -> Result<(), ServiceError> {
    let address = state.config.server.bind_address();
    let listener =
        tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: address.clone(),
                message: e.to_string(),
            })?;

    info!("Starting HTTP server on {}", address);

    let shutdown_timeout = state.config.server.shutdown_timeout_seconds;
    serve(listener, state, shutdown_signal(shutdown_timeout)).await
}

/// Serve on an already bound listener until `shutdown` completes
///
/// In-flight requests are allowed to finish after `shutdown` resolves, for
/// at most `server.shutdown_timeout_seconds`. Requests still running at the
/// deadline are abandoned.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let timeout_seconds = state.config.server.shutdown_timeout_seconds;
    let app = create_router(state);

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let shutdown = async move {
        shutdown.await;
        let _ = signalled_tx.send(());
    };

    // Resolves once the drain deadline has passed; never resolves if the
    // server stops without a shutdown signal.
    let deadline = async move {
        if signalled_rx.await.is_ok() {
            tokio::time::sleep(Duration::from_secs(timeout_seconds)).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .into_future();

    tokio::select! {
        biased;
        result = server => {
            result.map_err(|e| ServiceError::ServerFailed {
                message: e.to_string(),
            })?;
            info!("HTTP server shutdown complete");
        }
        _ = deadline => {
            warn!(
                timeout_seconds,
                "Graceful shutdown timed out; abandoning in-flight requests"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal(timeout_seconds: u64) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout", timeout_seconds);
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown with {}s timeout", timeout_seconds);
        },
    }
}

// ============================================================================
// Webhook Handlers
// ============================================================================

// Every handler checks access before validating path segments, so an
// unauthenticated caller gets 401 whatever the path holds.

async fn list_default_namespace(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(repo): Path<String>,
) -> Result<Json<Vec<WebhookView>>, ApiError> {
    state.access_policy.authorize(&headers)?;
    let scope = RepositoryScope::in_default_namespace(repo)?;
    list_webhooks(&state, scope).await
}

async fn list_namespaced(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((namespace, repo)): Path<(String, String)>,
) -> Result<Json<Vec<WebhookView>>, ApiError> {
    state.access_policy.authorize(&headers)?;
    let scope = RepositoryScope::new(namespace, repo)?;
    list_webhooks(&state, scope).await
}

async fn add_default_namespace(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(repo): Path<String>,
    payload: Result<Json<AddWebhookRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    state.access_policy.authorize(&headers)?;
    let scope = RepositoryScope::in_default_namespace(repo)?;
    add_webhook(&state, scope, payload).await
}

async fn add_namespaced(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((namespace, repo)): Path<(String, String)>,
    payload: Result<Json<AddWebhookRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    state.access_policy.authorize(&headers)?;
    let scope = RepositoryScope::new(namespace, repo)?;
    add_webhook(&state, scope, payload).await
}

async fn remove_default_namespace(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((repo, id)): Path<(String, String)>,
) -> Result<Json<WebhookDeletedResponse>, ApiError> {
    state.access_policy.authorize(&headers)?;
    let scope = RepositoryScope::in_default_namespace(repo)?;
    remove_webhook(&state, scope, &id).await
}

async fn remove_namespaced(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((namespace, repo, id)): Path<(String, String, String)>,
) -> Result<Json<WebhookDeletedResponse>, ApiError> {
    state.access_policy.authorize(&headers)?;
    let scope = RepositoryScope::new(namespace, repo)?;
    remove_webhook(&state, scope, &id).await
}

#[instrument(skip(state), fields(scope = %scope))]
async fn list_webhooks(
    state: &AppState,
    scope: RepositoryScope,
) -> Result<Json<Vec<WebhookView>>, ApiError> {
    let webhooks = state.webhook_service.list_webhooks(&scope).await?;
    Ok(Json(webhooks))
}

#[instrument(skip(state, payload), fields(scope = %scope))]
async fn add_webhook(
    state: &AppState,
    scope: RepositoryScope,
    payload: Result<Json<AddWebhookRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Rejected add-webhook body");
        ApiError::InvalidRequest {
            message: rejection.body_text(),
        }
    })?;

    let created = state.webhook_service.add_webhook(&scope, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(WebhookCreatedResponse::from(created)),
    )
        .into_response())
}

#[instrument(skip(state), fields(scope = %scope))]
async fn remove_webhook(
    state: &AppState,
    scope: RepositoryScope,
    id: &str,
) -> Result<Json<WebhookDeletedResponse>, ApiError> {
    // An id that could never have been derived cannot be registered either
    let id: WebhookId = id.parse().map_err(|_| ApiError::NotFound { id: id.to_string() })?;

    let removed = state.webhook_service.remove_webhook(&scope, &id).await?;
    Ok(Json(WebhookDeletedResponse::from(removed)))
}

// ============================================================================
// Health Check Handlers
// ============================================================================

/// Health check endpoint
///
/// Returns `200` while the store is healthy and `503` otherwise; the body is
/// the same shape in both cases.
#[instrument(skip(state))]
async fn handle_health_check(State(state): State<AppState>) -> Response {
    let storage = match state.webhook_service.health_check().await {
        Ok(status) => StorageHealth {
            backend: status.backend,
            healthy: status.healthy,
            error: status.error_message,
        },
        Err(e) => {
            error!(error = %e, "Storage health check failed");
            StorageHealth {
                backend: "unknown".to_string(),
                healthy: false,
                error: Some(e.to_string()),
            }
        }
    };

    let healthy = storage.healthy;
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response)).into_response()
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware
///
/// Reuses an incoming `x-correlation-id` or generates one, records it on the
/// span, and echoes it on the response.
#[instrument(skip(request, next), fields(
    method = %request.method(),
    uri = %request.uri(),
    correlation_id
))]
async fn request_logging_middleware(
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let correlation_id = request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::Span::current().record("correlation_id", correlation_id.as_str());
    request.extensions_mut().insert(correlation_id.clone());

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert("x-correlation-id", header_value);
    }

    let status = response.status();
    if status.is_server_error() {
        error!(
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed successfully"
        );
    }

    response
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
