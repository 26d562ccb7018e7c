//! Configuration schema for scriptenv
//!
//! Configuration is stored at `~/.config/scriptenv/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache settings
    pub cache: CacheConfig,

    /// Package manager settings
    pub pip: PipConfig,
}

/// Cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Root directory holding locks, downloaded artifacts and installs
    pub path: PathBuf,

    /// Persist resolved requirement sets and reuse them on later runs
    pub use_lockfile: bool,
}

impl CacheConfig {
    /// Platform cache directory for scriptenv
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scriptenv")
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            use_lockfile: true,
        }
    }
}

/// Package manager settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipConfig {
    /// Interpreter used to run `-m pip`
    pub python: String,

    /// Package index to resolve against (pip's default when unset)
    pub index_url: Option<String>,
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            index_url: None,
        }
    }
}
