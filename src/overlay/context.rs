//! Process context abstraction
//!
//! The overlay mutates process-wide state: the import search path, the
//! environment variables inherited by subprocesses, and the loaded-module
//! registry. [`ProcessContext`] makes that state explicit so it can be bound
//! to the real process ([`SystemContext`]) or to an in-memory fake
//! ([`MemoryContext`]).
//!
//! None of this is synchronized across threads beyond what keeps the
//! globals memory-safe. Concurrent enable/disable is unsupported.

use crate::error::ScriptEnvResult;
use crate::overlay::modules::{Module, ModuleCache, ModuleRegistry};
use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Process-wide import search path
static SEARCH_PATH: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

/// Process-wide loaded-module registry
static LOADED_MODULES: ModuleCache = ModuleCache::new();

/// Read/replace access to the state the overlay mutates
pub trait ProcessContext {
    /// Snapshot of the import search path
    fn search_path(&self) -> Vec<PathBuf>;

    /// Replace the import search path
    fn set_search_path(&mut self, entries: Vec<PathBuf>);

    fn var(&self, name: &str) -> Option<OsString>;

    fn set_var(&mut self, name: &str, value: &OsStr);

    fn remove_var(&mut self, name: &str);

    /// Registry of modules imported through this context
    fn modules(&self) -> &dyn ModuleRegistry;
}

impl<C: ProcessContext + ?Sized> ProcessContext for &mut C {
    fn search_path(&self) -> Vec<PathBuf> {
        (**self).search_path()
    }

    fn set_search_path(&mut self, entries: Vec<PathBuf>) {
        (**self).set_search_path(entries)
    }

    fn var(&self, name: &str) -> Option<OsString> {
        (**self).var(name)
    }

    fn set_var(&mut self, name: &str, value: &OsStr) {
        (**self).set_var(name, value)
    }

    fn remove_var(&mut self, name: &str) {
        (**self).remove_var(name)
    }

    fn modules(&self) -> &dyn ModuleRegistry {
        (**self).modules()
    }
}

/// The real process: global search path, `std::env`, global module registry
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemContext;

impl ProcessContext for SystemContext {
    fn search_path(&self) -> Vec<PathBuf> {
        search_path()
    }

    fn set_search_path(&mut self, entries: Vec<PathBuf>) {
        *SEARCH_PATH.lock().unwrap_or_else(|p| p.into_inner()) = entries;
    }

    fn var(&self, name: &str) -> Option<OsString> {
        env::var_os(name)
    }

    fn set_var(&mut self, name: &str, value: &OsStr) {
        env::set_var(name, value);
    }

    fn remove_var(&mut self, name: &str) {
        env::remove_var(name);
    }

    fn modules(&self) -> &dyn ModuleRegistry {
        &LOADED_MODULES
    }
}

/// Snapshot of the process-wide import search path
pub fn search_path() -> Vec<PathBuf> {
    SEARCH_PATH.lock().unwrap_or_else(|p| p.into_inner()).clone()
}

/// Import a module from the process-wide search path
pub fn import(name: &str) -> ScriptEnvResult<Arc<Module>> {
    LOADED_MODULES.import(name, &search_path())
}

/// The process-wide loaded-module registry
pub fn loaded_modules() -> &'static ModuleCache {
    &LOADED_MODULES
}

/// Self-contained process state for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryContext {
    search_path: Vec<PathBuf>,
    vars: BTreeMap<String, OsString>,
    modules: ModuleCache,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_path<I, P>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_path = entries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_var(mut self, name: &str, value: impl Into<OsString>) -> Self {
        self.vars.insert(name.to_string(), value.into());
        self
    }

    /// Import a module from this context's search path
    pub fn import(&self, name: &str) -> ScriptEnvResult<Arc<Module>> {
        self.modules.import(name, &self.search_path)
    }

    pub fn loaded_modules(&self) -> &ModuleCache {
        &self.modules
    }
}

impl ProcessContext for MemoryContext {
    fn search_path(&self) -> Vec<PathBuf> {
        self.search_path.clone()
    }

    fn set_search_path(&mut self, entries: Vec<PathBuf>) {
        self.search_path = entries;
    }

    fn var(&self, name: &str) -> Option<OsString> {
        self.vars.get(name).cloned()
    }

    fn set_var(&mut self, name: &str, value: &OsStr) {
        self.vars.insert(name.to_string(), value.to_os_string());
    }

    fn remove_var(&mut self, name: &str) {
        self.vars.remove(name);
    }

    fn modules(&self) -> &dyn ModuleRegistry {
        &self.modules
    }
}
