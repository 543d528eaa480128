//! Configuration loader with tier-based merging.

use super::merge::deep_merge_all;
use super::types::{Config, USER_DIR_NAME};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENV_CONFIG_PATH: &str = "TASKFLOW_CONFIG_PATH";
pub const ENV_PROJECT_DIR: &str = "TASKFLOW_PROJECT_DIR";
pub const ENV_USER_DIR: &str = "TASKFLOW_USER_DIR";
pub const ENV_API_URL: &str = "TASKFLOW_API_URL";
pub const ENV_SESSION_PATH: &str = "TASKFLOW_SESSION_PATH";
pub const ENV_PROBE_DELAY_MS: &str = "TASKFLOW_PROBE_DELAY_MS";

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    Project = 1,
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Where each file-backed tier lives.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Replaces the project and user tiers when set.
    pub explicit: Option<PathBuf>,
    /// `$CWD/taskflow` unless overridden.
    pub project_dir: Option<PathBuf>,
    /// `~/.taskflow` unless overridden.
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover paths from the environment and conventional locations.
    pub fn discover() -> Self {
        let explicit = std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from);
        let project_dir = std::env::var(ENV_PROJECT_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("taskflow")));
        let user_dir = std::env::var(ENV_USER_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(USER_DIR_NAME)));
        Self {
            explicit,
            project_dir,
            user_dir,
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            explicit: None,
            project_dir,
            user_dir,
        }
    }

    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    paths: ConfigPaths,
    config: Config,
    /// Highest-priority file that contributed, if any.
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load from discovered paths and the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load with an explicit environment lookup.
    pub fn load_with_env(
        paths: ConfigPaths,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config_path = None;

        let mut config = if let Some(explicit) = &paths.explicit {
            config_path = Some(explicit.clone());
            Config::load(explicit)
                .with_context(|| format!("failed to load config from {}", explicit.display()))?
        } else {
            let mut tiers: Vec<Value> = vec![serde_json::to_value(Config::default())?];
            for (tier, dir) in [
                (ConfigTier::Project, paths.project_dir.as_deref()),
                (ConfigTier::User, paths.user_dir.as_deref()),
            ] {
                let Some(dir) = dir else { continue };
                let file = dir.join(CONFIG_FILE);
                if let Some(value) = read_tier(&file, tier) {
                    tiers.push(value);
                    config_path = Some(file);
                }
            }
            serde_json::from_value(deep_merge_all(tiers))?
        };

        apply_env_overrides(&mut config, env);

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }
}

/// Read one tier's YAML. Missing files are skipped; broken ones are skipped with a warning.
fn read_tier(file: &Path, tier: ConfigTier) -> Option<Value> {
    if !file.exists() {
        return None;
    }
    let parsed = std::fs::read_to_string(file)
        .map_err(anyhow::Error::from)
        .and_then(|content| Ok(serde_yaml::from_str::<Value>(&content)?));
    match parsed {
        Ok(value) => {
            debug!(%tier, path = %file.display(), "loaded config tier");
            Some(value)
        }
        Err(err) => {
            warn!(%tier, path = %file.display(), error = %err, "ignoring unreadable config");
            None
        }
    }
}

/// Environment variables override every file tier.
fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
    let tier = ConfigTier::Environment;
    if let Some(url) = env(ENV_API_URL) {
        debug!(%tier, var = ENV_API_URL, "override");
        config.api.base_url = url;
    }
    if let Some(path) = env(ENV_SESSION_PATH) {
        debug!(%tier, var = ENV_SESSION_PATH, "override");
        config.session.path = Some(PathBuf::from(path));
    }
    if let Some(delay) = env(ENV_PROBE_DELAY_MS) {
        match delay.parse() {
            Ok(ms) => {
                debug!(%tier, var = ENV_PROBE_DELAY_MS, "override");
                config.probe.retry_delay_ms = ms;
            }
            Err(_) => warn!(var = ENV_PROBE_DELAY_MS, value = %delay, "ignoring invalid probe delay"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();
        assert_eq!(loader.config().api.base_url, "http://localhost:8080");
        assert_eq!(loader.config().probe.retry_delay_ms, 3000);
        assert!(loader.config_path().is_none());
    }

    #[test]
    fn user_tier_overrides_project_per_field() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("taskflow");
        let user = temp.path().join("user");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::create_dir_all(&user).unwrap();

        std::fs::write(
            project.join("config.yaml"),
            "api:\n  base_url: http://project:8080\n  timeout_ms: 500\n",
        )
        .unwrap();
        std::fs::write(user.join("config.yaml"), "api:\n  timeout_ms: 750\n").unwrap();

        let loader =
            ConfigLoader::load_with_env(ConfigPaths::with_dirs(Some(project), Some(user.clone())), no_env)
                .unwrap();
        assert_eq!(loader.config().api.base_url, "http://project:8080");
        assert_eq!(loader.config().api.timeout_ms, 750);
        assert_eq!(loader.config_path(), Some(user.join("config.yaml").as_path()));
    }

    #[test]
    fn broken_tier_is_skipped() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("taskflow");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("config.yaml"), "api: [unclosed").unwrap();

        let loader =
            ConfigLoader::load_with_env(ConfigPaths::with_dirs(Some(project), None), no_env).unwrap();
        assert_eq!(loader.config().api.base_url, "http://localhost:8080");
    }

    #[test]
    fn explicit_file_replaces_tiers_and_must_exist() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("custom.yaml");
        std::fs::write(&file, "probe:\n  retry_delay_ms: 50\n").unwrap();

        let loader =
            ConfigLoader::load_with_env(ConfigPaths::default().with_explicit(&file), no_env).unwrap();
        assert_eq!(loader.config().probe.retry_delay_ms, 50);

        let missing = ConfigPaths::default().with_explicit(temp.path().join("nope.yaml"));
        assert!(ConfigLoader::load_with_env(missing, no_env).is_err());
    }

    #[test]
    fn environment_wins_over_files() {
        let temp = TempDir::new().unwrap();
        let env = |key: &str| match key {
            ENV_API_URL => Some("http://env:1234".to_string()),
            ENV_SESSION_PATH => Some("/tmp/env-session.json".to_string()),
            ENV_PROBE_DELAY_MS => Some("not-a-number".to_string()),
            _ => None,
        };
        let loader =
            ConfigLoader::load_with_env(ConfigPaths::with_dirs(Some(temp.path().into()), None), env)
                .unwrap();
        let config = loader.config();
        assert_eq!(config.api.base_url, "http://env:1234");
        assert_eq!(config.session_path(), PathBuf::from("/tmp/env-session.json"));
        assert_eq!(config.probe.retry_delay_ms, 3000);
    }
}
