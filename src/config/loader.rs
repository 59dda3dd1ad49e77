//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::HarnessConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `client.base_url`.
pub const ENV_BASE_URL: &str = "BASE_URL";
/// Environment variable overriding `client.default_timeout_secs`.
pub const ENV_DEFAULT_TIMEOUT: &str = "DEFAULT_TIMEOUT";
/// Environment variable overriding `server.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";
/// Environment variable overriding `server.seed_path`.
pub const ENV_SEED_PATH: &str = "SEED_PATH";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<HarnessConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: HarnessConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the effective configuration for a process.
///
/// Order: `.env` file (if present) → optional TOML file → environment
/// overrides → validation.
pub fn load_from_env(path: Option<&Path>) -> Result<HarnessConfig, ConfigError> {
    if let Ok(dotenv_path) = dotenvy::dotenv() {
        tracing::debug!(path = %dotenv_path.display(), "Loaded .env file");
    }

    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => HarnessConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut HarnessConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup(ENV_BASE_URL) {
        config.client.base_url = base_url;
    }
    if let Some(raw) = lookup(ENV_DEFAULT_TIMEOUT) {
        config.client.default_timeout_secs = raw.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_DEFAULT_TIMEOUT,
            value: raw.clone(),
        })?;
    }
    if let Some(bind) = lookup(ENV_BIND_ADDRESS) {
        config.server.bind_address = bind;
    }
    if let Some(seed) = lookup(ENV_SEED_PATH) {
        config.server.seed_path = Some(PathBuf::from(seed));
    }
    Ok(())
}
