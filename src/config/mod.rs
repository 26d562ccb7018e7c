//! Configuration management for scriptenv
//!
//! Values come from built-in defaults, then the TOML config file, then
//! `SCRIPTENV_*` environment variables.

pub mod schema;

pub use schema::{CacheConfig, Config, PipConfig};

use crate::error::{ScriptEnvError, ScriptEnvResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Overrides the cache root directory
pub const CACHE_PATH_VAR: &str = "SCRIPTENV_CACHE_PATH";
/// Toggles lockfile persistence and reuse
pub const USE_LOCKFILE_VAR: &str = "SCRIPTENV_USE_LOCKFILE";
/// Overrides the interpreter used to run pip
pub const PYTHON_VAR: &str = "SCRIPTENV_PYTHON";
/// Overrides the package index URL
pub const INDEX_URL_VAR: &str = "SCRIPTENV_INDEX_URL";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scriptenv")
            .join("config.toml")
    }

    /// Load the config file (defaults if missing) and apply environment overrides
    pub fn load(&self) -> ScriptEnvResult<Config> {
        let mut config = if self.config_path.exists() {
            self.load_from_file(&self.config_path)?
        } else {
            debug!("Config file not found, using defaults");
            Config::default()
        };

        apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, path: &Path) -> ScriptEnvResult<Config> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScriptEnvError::io(format!("reading config from {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| ScriptEnvError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> ScriptEnvResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ScriptEnvError::io(format!("creating config directory {}", parent.display()), e)
            })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).map_err(|e| {
            ScriptEnvError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `SCRIPTENV_*` overrides read through `lookup`
///
/// Empty values are ignored, matching an unset variable.
pub fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> ScriptEnvResult<()> {
    let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if let Some(path) = get(CACHE_PATH_VAR) {
        debug!("{} overrides cache path: {}", CACHE_PATH_VAR, path);
        config.cache.path = PathBuf::from(path);
    }
    if let Some(value) = get(USE_LOCKFILE_VAR) {
        config.cache.use_lockfile =
            parse_bool(&value).ok_or_else(|| ScriptEnvError::EnvVarInvalid {
                name: USE_LOCKFILE_VAR.to_string(),
                value,
            })?;
    }
    if let Some(python) = get(PYTHON_VAR) {
        config.pip.python = python;
    }
    if let Some(url) = get(INDEX_URL_VAR) {
        config.pip.index_url = Some(url);
    }
    Ok(())
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
