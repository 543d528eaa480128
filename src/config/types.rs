//! Configuration types.

use crate::format::OutputFormat;
use crate::types::{SortKey, StatusFilter};
use crate::view::ViewState;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default gateway address for a local backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Name of the per-user directory under `$HOME`.
pub const USER_DIR_NAME: &str = ".taskflow";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub view: ViewConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the routing gateway.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Readiness probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Fixed delay between probe attempts in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_retry_delay_ms() -> u64 {
    3_000
}

/// Where the session is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session file. Defaults to `~/.taskflow/session.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Initial list criteria and output format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub filter: StatusFilter,

    #[serde(default)]
    pub sort: SortKey,

    #[serde(default)]
    pub format: OutputFormat,
}

impl ViewConfig {
    pub fn state(&self) -> ViewState {
        ViewState {
            filter: self.filter,
            sort: self.sort,
        }
    }
}

impl Config {
    /// Load a single configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Resolved session file path, with a leading `~/` expanded.
    pub fn session_path(&self) -> PathBuf {
        match &self.session.path {
            Some(path) => expand_home(path),
            None => dirs::home_dir()
                .map(|home| home.join(USER_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(USER_DIR_NAME))
                .join("session.json"),
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
