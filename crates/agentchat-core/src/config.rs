use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/agent-chat/";
pub const DEFAULT_LOG_FILTER: &str = "agentchat=info";

pub const ENDPOINT_ENV: &str = "AGENTCHAT_ENDPOINT";
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the user config directory; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Backend URL: environment first, then the file, then the default.
    pub fn endpoint(&self) -> String {
        Self::resolve(std::env::var(ENDPOINT_ENV).ok(), self.endpoint.as_deref(), DEFAULT_ENDPOINT)
    }

    /// `tracing` filter directive: environment first, then the file, then the default.
    pub fn log_filter(&self) -> String {
        Self::resolve(std::env::var(LOG_FILTER_ENV).ok(), self.log_filter.as_deref(), DEFAULT_LOG_FILTER)
    }

    fn resolve(env: Option<String>, file: Option<&str>, default: &str) -> String {
        env.filter(|v| !v.trim().is_empty())
            .or_else(|| file.filter(|v| !v.trim().is_empty()).map(str::to_string))
            .unwrap_or_else(|| default.to_string())
    }

    /// Directory holding the config file and the log file.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("agentchat"))
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
