//! Layered configuration loading for the service binary.
//!
//! Sources, later overriding earlier:
//!  1. `/etc/repo-hooks/service.yaml`
//!  2. `./config/service.yaml`
//!  3. The file named by `RH_CONFIG_FILE`, which must exist when set
//!  4. Environment variables prefixed `RH__`, with `__` separating sections,
//!     e.g. `RH__SERVER__PORT=9090` sets `server.port`
//!
//! Every field carries a serde default, so a host with no files and no
//! variables still yields a valid configuration.

use repo_hooks_api::{ConfigError, ServiceConfig};

/// Variable naming an explicit configuration file
pub const CONFIG_FILE_VAR: &str = "RH_CONFIG_FILE";

/// Prefix for per-field environment overrides
pub const ENV_PREFIX: &str = "RH";

/// Where configuration is read from
#[derive(Debug, Clone)]
pub struct ConfigSources {
    pub default_files: Vec<String>,
    pub explicit_file: Option<String>,
    pub env_prefix: String,
}

impl ConfigSources {
    /// Sources used by the service at startup
    pub fn from_environment() -> Self {
        Self {
            default_files: vec![
                "/etc/repo-hooks/service".to_string(),
                "config/service".to_string(),
            ],
            explicit_file: std::env::var(CONFIG_FILE_VAR)
                .ok()
                .filter(|path| !path.is_empty()),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Files in the order they are applied, each paired with whether it must exist
    pub fn files(&self) -> Vec<(&str, bool)> {
        self.default_files
            .iter()
            .map(|file| (file.as_str(), false))
            .chain(self.explicit_file.iter().map(|file| (file.as_str(), true)))
            .collect()
    }
}

/// Build and validate the service configuration
///
/// A malformed file, a value that cannot be coerced to its field type, or a
/// configuration failing [`ServiceConfig::validate`] is an error.
pub fn load_config(sources: &ConfigSources) -> Result<ServiceConfig, ConfigError> {
    let mut builder = config::Config::builder();

    for (file, required) in sources.files() {
        builder = builder.add_source(
            config::File::with_name(file)
                .required(required)
                .format(config::FileFormat::Yaml),
        );
    }

    let service_config: ServiceConfig = builder
        .add_source(config::Environment::with_prefix(&sources.env_prefix).separator("__"))
        .build()
        .and_then(|built| built.try_deserialize())
        .map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;

    service_config.validate()?;
    Ok(service_config)
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
