//! # Repo-Hooks Service
//!
//! Binary entry point for the webhook registration service.
//!
//! This executable:
//! - Loads configuration from files and environment
//! - Initializes structured logging
//! - Opens the configured webhook store
//! - Starts the HTTP server from repo-hooks-api

mod settings;

use repo_hooks_api::{open_store, start_server, AppState, LoggingConfig, ServiceError};
use repo_hooks_core::WebhookService;
use settings::{load_config, ConfigSources};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let sources = ConfigSources::from_environment();
    let loaded = load_config(&sources);

    // Logging follows the configured level; fall back to defaults so a broken
    // configuration can still be reported.
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    init_logging(&logging);

    info!("Starting Repo-Hooks Service");
    if let Some(path) = &sources.explicit_file {
        info!(path = %path, "Loaded configuration from explicit path");
    }

    let service_config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Service configuration is invalid; aborting");
            std::process::exit(exit_code(&ServiceError::Configuration(e)));
        }
    };

    let store = match open_store(&service_config.storage).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Failed to open webhook storage; aborting");
            std::process::exit(exit_code(&ServiceError::Storage(e)));
        }
    };

    if service_config.security.api_token.is_none() {
        warn!("No security.api_token configured; webhook routes accept any caller");
    }

    let service = Arc::new(WebhookService::new(store.clone()));
    let state = AppState::from_config(service_config, service);

    let result = start_server(state).await;

    if let Err(e) = store.close().await {
        warn!(error = %e, "Failed to close webhook storage cleanly");
    }

    if let Err(e) = result {
        error!(error = %e, "Service failed");
        std::process::exit(exit_code(&e));
    }

    info!("Repo-Hooks Service stopped");
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &logging.level;
        format!(
            "repo_hooks_service={level},repo_hooks_api={level},repo_hooks_core={level},tower_http=debug"
        )
        .into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            logging
                .json_format
                .then(|| tracing_subscriber::fmt::layer().json()),
        )
        .with((!logging.json_format).then(tracing_subscriber::fmt::layer))
        .init();
}

fn exit_code(error: &ServiceError) -> i32 {
    match error {
        ServiceError::BindFailed { .. } => 1,
        ServiceError::ServerFailed { .. } => 2,
        ServiceError::Configuration(_) => 3,
        ServiceError::Storage(_) => 4,
    }
}
