//! Configuration loading and backend endpoint resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the backend base URL
pub const API_URL_ENV_VAR: &str = "TRILHA_API_URL";

/// Compiled default backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Compiled default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration for the backend collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// TOML config file schema (`~/.config/trilha/config.toml`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl TomlConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("invalid config file: {e}")))
    }
}

/// Backend URL resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. Compiled default (fallback)
pub fn resolve_api_url(cli_arg: Option<&str>) -> String {
    // Priority 1: Command-line argument
    if let Some(url) = cli_arg {
        return url.to_string();
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(API_URL_ENV_VAR) {
        if !url.is_empty() {
            return url;
        }
    }

    // Priority 3: TOML config file
    if let Ok(config) = load_config_file() {
        if let Some(url) = config.api_url {
            return url;
        }
    }

    // Priority 4: Compiled default
    DEFAULT_API_URL.to_string()
}

/// Resolve the full client configuration using the same ladder as
/// [`resolve_api_url`]; the timeout comes from the config file or the
/// compiled default (no CLI/env override is defined for it).
pub fn resolve_client_config(cli_arg: Option<&str>) -> ClientConfig {
    let file_config = load_config_file().unwrap_or_default();

    let api_url = if let Some(url) = cli_arg {
        url.to_string()
    } else if let Ok(url) = std::env::var(API_URL_ENV_VAR) {
        if url.is_empty() {
            file_config
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
        } else {
            url
        }
    } else if let Some(url) = file_config.api_url.clone() {
        url
    } else {
        DEFAULT_API_URL.to_string()
    };

    let timeout = Duration::from_secs(file_config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

    ClientConfig { api_url, timeout }
}

/// Locate the platform config file, if present
fn config_file_path() -> Result<PathBuf> {
    let path = dirs::config_dir()
        .map(|d| d.join("trilha").join("config.toml"))
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("config file not found: {path:?}")))
    }
}

fn load_config_file() -> Result<TomlConfig> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("could not read {path:?}: {e}")))?;
    let config = TomlConfig::parse(&content)?;
    tracing::debug!(path = ?path, "Loaded config file");
    Ok(config)
}
