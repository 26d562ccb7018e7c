//! Cache directory layout

use crate::error::{ScriptEnvError, ScriptEnvResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Paths derived from the cache root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one lock file per resolved requirement set
    pub fn locks_dir(&self) -> PathBuf {
        self.root.join("locks")
    }

    /// Directory holding downloaded artifacts
    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    /// Directory holding one install directory per package
    pub fn install_dir(&self) -> PathBuf {
        self.root.join("install")
    }

    pub fn lock_path(&self, key: &str) -> PathBuf {
        self.locks_dir().join(key)
    }

    pub fn artifact_path(&self, package: &str) -> PathBuf {
        self.artifacts_dir().join(package)
    }

    pub fn package_dir(&self, package: &str) -> PathBuf {
        self.install_dir().join(package)
    }

    /// Create the locks directory
    pub fn ensure(&self) -> ScriptEnvResult<()> {
        let locks = self.locks_dir();
        fs::create_dir_all(&locks).map_err(|e| {
            ScriptEnvError::io(format!("creating directory {}", locks.display()), e)
        })
    }

    /// Number of entries in a cache directory (0 if it does not exist)
    pub fn count_entries(dir: &Path) -> ScriptEnvResult<usize> {
        if !dir.exists() {
            return Ok(0);
        }
        let entries = fs::read_dir(dir)
            .map_err(|e| ScriptEnvError::io(format!("reading directory {}", dir.display()), e))?;
        Ok(entries.filter_map(Result::ok).count())
    }
}
