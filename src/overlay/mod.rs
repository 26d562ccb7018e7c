//! Runtime overlay
//!
//! A [`ScriptEnv`] makes a set of installed packages visible to the current
//! process and its subprocesses by prepending their install directories to:
//!
//! - the process import search path
//! - `PYTHONPATH`, for imports in subprocesses
//! - `PATH` (each package's `bin/`), for entry points called from subprocesses
//!
//! Enabling is idempotent and disabling restores every collection to its
//! prior contents and order. Entries are attributed to the overlay by
//! component-wise prefix match against its package directories, so two
//! overlays sharing an install directory cannot be told apart.

pub mod context;
pub mod modules;

pub use context::{
    import, loaded_modules, search_path, MemoryContext, ProcessContext, SystemContext,
};
pub use modules::{Module, ModuleCache, ModuleRegistry};

use crate::error::{ScriptEnvError, ScriptEnvResult};
use std::collections::BTreeSet;
use std::env;
use std::ffi::OsString;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Module-search variable inherited by subprocesses
pub const MODULE_PATH_VAR: &str = "PYTHONPATH";
/// Executable-search variable inherited by subprocesses
pub const EXEC_PATH_VAR: &str = "PATH";
/// Subdirectory of an install directory holding entry points
pub const BIN_DIR: &str = "bin";

/// A set of installed packages that can be overlaid onto a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEnv {
    install_path: PathBuf,
    packages: Vec<String>,
}

impl ScriptEnv {
    /// Create an overlay for `packages` installed under `install_path`
    ///
    /// Packages are kept in sorted order, which is also the order their
    /// directories appear on the search path.
    pub fn new<I, S>(install_path: impl Into<PathBuf>, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let packages: BTreeSet<String> = packages.into_iter().map(Into::into).collect();
        Self {
            install_path: install_path.into(),
            packages: packages.into_iter().collect(),
        }
    }

    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Install directory of every package, in overlay order
    pub fn package_dirs(&self) -> Vec<PathBuf> {
        self.packages
            .iter()
            .map(|package| self.install_path.join(package))
            .collect()
    }

    /// Enable on the real process
    pub fn enable(&self) -> ScriptEnvResult<()> {
        self.enable_in(&mut SystemContext)
    }

    /// Disable on the real process
    pub fn disable(&self) -> ScriptEnvResult<()> {
        self.disable_in(&mut SystemContext)
    }

    /// Prepend this overlay's directories to the search path and propagation variables
    ///
    /// Any entries left by a previous `enable` are removed first.
    pub fn enable_in(&self, ctx: &mut dyn ProcessContext) -> ScriptEnvResult<()> {
        self.disable_in(ctx)?;
        if self.packages.is_empty() {
            return Ok(());
        }

        let dirs = self.package_dirs();
        let bins: Vec<PathBuf> = dirs.iter().map(|dir| dir.join(BIN_DIR)).collect();

        // Join both variables before touching anything so a bad path leaves state intact
        let module_path = prepended(ctx.var(MODULE_PATH_VAR), &dirs)?;
        let exec_path = prepended(ctx.var(EXEC_PATH_VAR), &bins)?;

        let mut search = dirs.clone();
        search.extend(ctx.search_path());
        ctx.set_search_path(search);
        ctx.set_var(MODULE_PATH_VAR, &module_path);
        ctx.set_var(EXEC_PATH_VAR, &exec_path);

        debug!(
            "Enabled {} packages from {}",
            self.packages.len(),
            self.install_path.display()
        );
        Ok(())
    }

    /// Remove this overlay's entries and evict modules loaded from its directories
    ///
    /// Entries that do not belong to the overlay keep their relative order.
    pub fn disable_in(&self, ctx: &mut dyn ProcessContext) -> ScriptEnvResult<()> {
        let dirs = self.package_dirs();
        let owned = |entry: &Path| dirs.iter().any(|dir| entry.starts_with(dir));

        let search: Vec<PathBuf> = ctx
            .search_path()
            .into_iter()
            .filter(|entry| !owned(entry.as_path()))
            .collect();
        ctx.set_search_path(search);

        for name in [MODULE_PATH_VAR, EXEC_PATH_VAR] {
            remove_entries(ctx, name, &owned)?;
        }

        let evicted = ctx.modules().evict(&owned);
        if !evicted.is_empty() {
            debug!("Evicted modules: {}", evicted.join(", "));
        }
        Ok(())
    }

    /// Enable on the real process and disable again when the guard drops
    pub fn scoped(self) -> ScriptEnvResult<ScopedEnv<SystemContext>> {
        self.scoped_in(SystemContext)
    }

    /// Enable in `ctx` and disable again when the guard drops
    pub fn scoped_in<C: ProcessContext>(self, mut ctx: C) -> ScriptEnvResult<ScopedEnv<C>> {
        self.enable_in(&mut ctx)?;
        Ok(ScopedEnv {
            env: self,
            ctx,
            released: false,
        })
    }
}

/// Guard returned by [`ScriptEnv::scoped`]
pub struct ScopedEnv<C: ProcessContext = SystemContext> {
    env: ScriptEnv,
    ctx: C,
    released: bool,
}

impl<C: ProcessContext> ScopedEnv<C> {
    pub fn context(&self) -> &C {
        &self.ctx
    }

    /// Disable now, reporting any error instead of logging it on drop
    pub fn release(mut self) -> ScriptEnvResult<()> {
        self.released = true;
        self.env.disable_in(&mut self.ctx)
    }
}

impl<C: ProcessContext> Deref for ScopedEnv<C> {
    type Target = ScriptEnv;

    fn deref(&self) -> &ScriptEnv {
        &self.env
    }
}

impl<C: ProcessContext> Drop for ScopedEnv<C> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.env.disable_in(&mut self.ctx) {
            warn!("Failed to disable script environment: {}", e);
        }
    }
}

/// `dirs` followed by the existing entries of a path-list value
///
/// An empty value has no entries. Splitting it would yield one empty entry,
/// which subprocesses read as the current directory.
fn prepended(existing: Option<OsString>, dirs: &[PathBuf]) -> ScriptEnvResult<OsString> {
    let mut entries = dirs.to_vec();
    if let Some(value) = existing.filter(|value| !value.is_empty()) {
        entries.extend(env::split_paths(&value));
    }
    join(entries)
}

/// Drop owned entries from a path-list variable
///
/// The variable is left untouched when nothing matches and removed when no
/// entries remain.
fn remove_entries(
    ctx: &mut dyn ProcessContext,
    name: &str,
    owned: &dyn Fn(&Path) -> bool,
) -> ScriptEnvResult<()> {
    let Some(value) = ctx.var(name) else {
        return Ok(());
    };

    let entries: Vec<PathBuf> = env::split_paths(&value).collect();
    let kept: Vec<PathBuf> = entries
        .iter()
        .filter(|entry| !owned(entry.as_path()))
        .cloned()
        .collect();

    if kept.len() == entries.len() {
        return Ok(());
    }
    if kept.is_empty() {
        ctx.remove_var(name);
    } else {
        ctx.set_var(name, &join(kept)?);
    }
    Ok(())
}

fn join(entries: Vec<PathBuf>) -> ScriptEnvResult<OsString> {
    env::join_paths(&entries).map_err(|e| {
        let path = entries
            .iter()
            .find(|entry| env::join_paths([entry]).is_err())
            .cloned()
            .unwrap_or_default();
        ScriptEnvError::PathInvalid {
            path,
            reason: e.to_string(),
        }
    })
}
