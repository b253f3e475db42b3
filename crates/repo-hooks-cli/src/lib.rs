//! # Repo-Hooks CLI
//!
//! Command-line client for the repo-hooks webhook API.
//!
//! This module provides CLI commands for:
//! - Listing, adding, and removing a repository's webhooks
//! - Computing a webhook id locally
//! - Checking server health

pub mod client;

pub use client::{ClientError, CreatedBody, DeletedBody, HealthBody, WebhookClient};

use clap::{Parser, Subcommand};
use repo_hooks_core::{AddWebhookRequest, WebhookId, WebhookView};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Server used when neither flag, environment, nor config file names one
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

// ============================================================================
// CLI Structure
// ============================================================================

/// Repo-Hooks CLI - manage repository webhooks
#[derive(Parser)]
#[command(name = "repo-hooks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage webhooks registered against repositories")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RH_CLI_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the repo-hooks server
    #[arg(long, env = "RH_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Bearer token for the server
    #[arg(long, env = "RH_API_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Logging level (written to stderr)
    #[arg(short, long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// List the webhooks registered for a repository
    List {
        /// Repository name
        repo: String,

        /// Namespace; the server default is used when omitted
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Register a webhook, replacing any registration for the same URL
    Add {
        /// Repository name
        repo: String,

        /// Callback URL
        #[arg(short, long)]
        url: String,

        /// Event to subscribe to; may be repeated. Defaults to `new`
        #[arg(short, long = "event")]
        events: Vec<String>,

        /// Namespace; the server default is used when omitted
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Remove a webhook by id
    Remove {
        /// Repository name
        repo: String,

        /// Webhook id as printed by `list` or `id`
        id: String,

        /// Namespace; the server default is used when omitted
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Print the id a URL registers under, without contacting the server
    Id {
        /// Callback URL
        url: String,
    },

    /// Check server health
    Health,
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("{0}")]
    Client(#[from] ClientError),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 1,
            Self::Client(ClientError::InvalidUrl { .. }) => 1,
            Self::Client(ClientError::Request(_)) => 2,
            Self::Client(ClientError::NotFound { .. }) => 3,
            Self::Client(ClientError::Conflict { .. }) => 4,
            Self::Client(ClientError::Unauthorized) => 5,
            Self::Client(ClientError::Server { .. }) => 6,
            Self::Output(_) | Self::Io(_) => 7,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),
}

// ============================================================================
// Configuration Types
// ============================================================================

/// CLI configuration file contents
///
/// ```toml
/// server_url = "https://hooks.example.com"
/// token = "..."
/// output = "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    pub server_url: Option<String>,
    pub token: Option<String>,
    pub output: Option<OutputFormat>,
}

impl CliConfig {
    /// Load configuration from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        Ok(toml::from_str(&contents)?)
    }
}

/// Effective settings after flags, environment, and config file are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub token: Option<String>,
    pub format: OutputFormat,
}

impl Settings {
    /// Merge flag values over the config file over built-in defaults
    pub fn resolve(cli: &Cli, config: CliConfig) -> Self {
        Self {
            server_url: cli
                .server_url
                .clone()
                .or(config.server_url)
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            token: cli.token.clone().or(config.token),
            format: cli.format.or(config.output).unwrap_or(OutputFormat::Text),
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    initialize_logging(&cli.log_level);

    let config = CliConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, config);
    debug!(server_url = %settings.server_url, "Resolved CLI settings");

    let mut stdout = std::io::stdout().lock();
    execute(cli.command, &settings, &mut stdout).await
}

/// Run one command, writing its output to `out`
pub async fn execute<W: Write>(
    command: Commands,
    settings: &Settings,
    out: &mut W,
) -> Result<(), CliError> {
    if let Commands::Id { url } = &command {
        let id = WebhookId::derive(url);
        return match settings.format {
            OutputFormat::Text => Ok(writeln!(out, "{}", id)?),
            OutputFormat::Json => {
                Ok(writeln!(out, "{}", serde_json::json!({ "url": url, "id": id }))?)
            }
        };
    }

    let client = WebhookClient::new(&settings.server_url, settings.token.clone())?;

    match command {
        Commands::List { repo, namespace } => {
            let hooks = client.list(namespace.as_deref(), &repo).await?;
            write!(out, "{}", render_list(&hooks, settings.format)?)?;
        }
        Commands::Add {
            repo,
            url,
            events,
            namespace,
        } => {
            let mut request = AddWebhookRequest::new(url);
            if !events.is_empty() {
                request = request.with_events(events);
            }
            let created = client.add(namespace.as_deref(), &repo, &request).await?;
            match settings.format {
                OutputFormat::Text => {
                    let events: Vec<&str> = created.events.iter().map(|e| e.as_str()).collect();
                    writeln!(out, "{} {} [{}]", created.message, created.id, events.join(","))?
                }
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&created)?)?,
            }
        }
        Commands::Remove {
            repo,
            id,
            namespace,
        } => {
            let deleted = client.remove(namespace.as_deref(), &repo, &id).await?;
            match settings.format {
                OutputFormat::Text => writeln!(out, "{} {}", deleted.message, deleted.id)?,
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&deleted)?)?,
            }
        }
        Commands::Health => {
            let health = client.health().await?;
            match settings.format {
                OutputFormat::Text => writeln!(out, "{} (version {})", health.status, health.version)?,
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&health)?)?,
            }
        }
        Commands::Id { .. } => {}
    }

    Ok(())
}

/// Render a webhook listing
pub fn render_list(hooks: &[WebhookView], format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(hooks)?)),
        OutputFormat::Text if hooks.is_empty() => Ok("no webhooks registered\n".to_string()),
        OutputFormat::Text => {
            let mut rendered = String::new();
            for hook in hooks {
                let mut events = Vec::new();
                if hook.new {
                    events.push("new");
                }
                if hook.existing {
                    events.push("existing");
                }
                rendered.push_str(&format!(
                    "{}  {}  [{}]{}\n",
                    hook.id,
                    hook.url,
                    events.join(","),
                    if hook.active { "" } else { "  (inactive)" }
                ));
            }
            Ok(rendered)
        }
    }
}

fn initialize_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
