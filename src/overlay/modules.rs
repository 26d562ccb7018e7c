//! Loaded-module registry
//!
//! Imports are resolved against a search path and cached by name, the same
//! way an interpreter caches imported modules. The overlay evicts cached
//! modules that came from its install directories, so a later import
//! re-resolves instead of returning a stale module.

use crate::error::{ScriptEnvError, ScriptEnvResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// A resolved module and the path it was loaded from
#[derive(Debug, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub origin: PathBuf,
}

/// Capability to drop cached modules by origin
pub trait ModuleRegistry {
    /// Remove every cached module whose origin matches, returning their names
    fn evict(&self, origin_matches: &dyn Fn(&Path) -> bool) -> Vec<String>;
}

/// Name-keyed cache of imported modules
#[derive(Debug, Default)]
pub struct ModuleCache {
    loaded: Mutex<BTreeMap<String, Arc<Module>>>,
}

impl ModuleCache {
    pub const fn new() -> Self {
        Self {
            loaded: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Arc<Module>>> {
        self.loaded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Import `name`, returning the cached module if it was imported before
    ///
    /// A module resolves to the first `<dir>/<name>` directory or
    /// `<dir>/<name>.py` file along `search_path`.
    pub fn import(&self, name: &str, search_path: &[PathBuf]) -> ScriptEnvResult<Arc<Module>> {
        let mut loaded = self.lock();
        if let Some(module) = loaded.get(name) {
            return Ok(Arc::clone(module));
        }

        let origin = find_module(name, search_path)
            .ok_or_else(|| ScriptEnvError::ModuleNotFound(name.to_string()))?;
        debug!("Imported {} from {}", name, origin.display());

        let module = Arc::new(Module {
            name: name.to_string(),
            origin,
        });
        loaded.insert(name.to_string(), Arc::clone(&module));
        Ok(module)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl ModuleRegistry for ModuleCache {
    fn evict(&self, origin_matches: &dyn Fn(&Path) -> bool) -> Vec<String> {
        let mut loaded = self.lock();
        let evicted: Vec<String> = loaded
            .iter()
            .filter(|(_, module)| origin_matches(&module.origin))
            .map(|(name, _)| name.clone())
            .collect();

        for name in &evicted {
            loaded.remove(name);
        }
        evicted
    }
}

fn find_module(name: &str, search_path: &[PathBuf]) -> Option<PathBuf> {
    search_path.iter().find_map(|dir| {
        let package = dir.join(name);
        if package.is_dir() {
            return Some(package);
        }
        let file = dir.join(format!("{}.py", name));
        file.is_file().then_some(file)
    })
}
