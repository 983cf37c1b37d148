//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Path of the TOML config file.
pub const ENV_CONFIG_PATH: &str = "CHRONOBOND_CONFIG";
/// Swap backend base URL. An empty value disables quoting.
pub const ENV_SWAP_API_URL: &str = "CHRONOBOND_SWAP_API_URL";
/// Primary wallet bridge URL.
pub const ENV_BRIDGE_URL: &str = "CHRONOBOND_BRIDGE_URL";
/// API bind address.
pub const ENV_BIND_ADDRESS: &str = "CHRONOBOND_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_SWAP_API_URL) {
        let url = url.trim();
        config.swap.base_url = if url.is_empty() {
            None
        } else {
            Some(url.to_string())
        };
    }
    if let Some(url) = lookup(ENV_BRIDGE_URL).filter(|v| !v.trim().is_empty()) {
        config.chain.bridge_url = url.trim().to_string();
    }
    if let Some(addr) = lookup(ENV_BIND_ADDRESS).filter(|v| !v.trim().is_empty()) {
        config.server.bind_address = addr.trim().to_string();
    }
}

/// Build the runtime configuration from the process environment.
///
/// Reads the file named by `CHRONOBOND_CONFIG` when set, otherwise starts
/// from defaults, then applies the remaining variables and validates.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    load_with(|key| std::env::var(key).ok())
}

fn load_with<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup(ENV_CONFIG_PATH).filter(|p| !p.trim().is_empty()) {
        Some(path) => {
            let path = PathBuf::from(path.trim());
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
