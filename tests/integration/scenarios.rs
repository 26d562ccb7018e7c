//! End-to-end overlay behavior against a fake package manager

use scriptenv::config::Config;
use scriptenv::overlay::{MemoryContext, ProcessContext, MODULE_PATH_VAR};
use scriptenv::pip::PackageManager;
use scriptenv::{ScriptEnvBuilder, ScriptEnvError, ScriptEnvResult};
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Resolves from a fixed dependency table and installs one module per package
struct FakeIndex {
    dependencies: BTreeMap<&'static str, Vec<&'static str>>,
    downloads: Cell<usize>,
    installs: Cell<usize>,
}

impl FakeIndex {
    fn new(table: &[(&'static str, &[&'static str])]) -> Self {
        Self {
            dependencies: table
                .iter()
                .map(|(name, packages)| (*name, packages.to_vec()))
                .collect(),
            downloads: Cell::new(0),
            installs: Cell::new(0),
        }
    }
}

impl PackageManager for FakeIndex {
    fn download(&self, requirements: &[String], _dest: &Path) -> ScriptEnvResult<BTreeSet<String>> {
        self.downloads.set(self.downloads.get() + 1);
        let mut packages = BTreeSet::new();
        for requirement in requirements {
            let resolved = self.dependencies.get(requirement.as_str()).ok_or_else(|| {
                ScriptEnvError::Resolution {
                    code: 1,
                    output: format!("No matching distribution found for {}", requirement),
                }
            })?;
            packages.extend(resolved.iter().map(|p| p.to_string()));
        }
        Ok(packages)
    }

    fn install(&self, _artifact: &Path, target: &Path) -> ScriptEnvResult<()> {
        self.installs.set(self.installs.get() + 1);
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        fs::create_dir_all(target).unwrap();
        fs::write(target.join(format!("{}.py", name)), "").unwrap();
        Ok(())
    }
}

fn builder(dir: &TempDir, index: FakeIndex) -> ScriptEnvBuilder<FakeIndex> {
    let mut config = Config::default();
    config.cache.path = dir.path().to_path_buf();
    ScriptEnvBuilder::with_package_manager(&config, index).unwrap()
}

fn split(value: Option<std::ffi::OsString>) -> Vec<PathBuf> {
    value.map(|v| env::split_paths(&v).collect()).unwrap_or_default()
}

#[test]
fn single_package_is_importable() {
    let dir = TempDir::new().unwrap();
    let builder = builder(&dir, FakeIndex::new(&[("pkgA@1.0.0", &["pkgA"])]));
    let mut ctx = MemoryContext::new().with_var(MODULE_PATH_VAR, "/existing");

    builder.apply(["pkgA@1.0.0"], &mut ctx).unwrap();

    let install = dir.path().join("install");
    assert_eq!(
        scriptenv::cache::CacheLayout::count_entries(&install).unwrap(),
        1
    );
    let module = ctx.import("pkgA").unwrap();
    assert_eq!(module.origin, install.join("pkgA").join("pkgA.py"));
    assert_eq!(
        split(ctx.var(MODULE_PATH_VAR)),
        vec![install.join("pkgA"), PathBuf::from("/existing")]
    );
}

#[test]
fn dependencies_are_installed_separately() {
    let dir = TempDir::new().unwrap();
    let builder = builder(&dir, FakeIndex::new(&[("pkg", &["pkg", "dep"])]));
    let mut ctx = MemoryContext::new();

    let env = builder.apply(["pkg"], &mut ctx).unwrap();

    assert_eq!(env.packages(), ["dep", "pkg"]);
    let install = dir.path().join("install");
    assert!(install.join("pkg").is_dir());
    assert!(install.join("dep").is_dir());
    assert!(ctx.import("pkg").is_ok());
    assert!(ctx.import("dep").is_ok());
}

#[test]
fn repeated_requirements_hit_caches() {
    let dir = TempDir::new().unwrap();
    let builder = builder(&dir, FakeIndex::new(&[("pkg", &["pkg", "dep"])]));

    let first = builder.build(["pkg"]).unwrap();
    let second = builder.build(["pkg"]).unwrap();

    assert_eq!(first, second);
    assert_eq!(builder.package_manager().downloads.get(), 1);
    assert_eq!(builder.package_manager().installs.get(), 2);
}

#[test]
fn disable_evicts_imported_modules() {
    let dir = TempDir::new().unwrap();
    let builder = builder(&dir, FakeIndex::new(&[("pkgA@1.0.0", &["pkgA"])]));
    let mut ctx = MemoryContext::new()
        .with_search_path(["/stdlib"])
        .with_var(MODULE_PATH_VAR, "/existing");

    let env = builder.apply(["pkgA@1.0.0"], &mut ctx).unwrap();
    ctx.import("pkgA").unwrap();
    assert!(ctx.loaded_modules().is_loaded("pkgA"));

    env.disable_in(&mut ctx).unwrap();

    assert!(!ctx.loaded_modules().is_loaded("pkgA"));
    let err = ctx.import("pkgA").unwrap_err();
    assert!(matches!(err, ScriptEnvError::ModuleNotFound(name) if name == "pkgA"));
    assert_eq!(ctx.search_path(), vec![PathBuf::from("/stdlib")]);
    assert_eq!(ctx.var(MODULE_PATH_VAR), Some("/existing".into()));
}

#[test]
fn scoped_overlay_is_removed_on_drop() {
    let dir = TempDir::new().unwrap();
    let builder = builder(&dir, FakeIndex::new(&[("pkg", &["pkg"])]));
    let env = builder.build(["pkg"]).unwrap();
    let mut ctx = MemoryContext::new();

    {
        let scoped = env.clone().scoped_in(&mut ctx).unwrap();
        assert_eq!(scoped.context().search_path(), env.package_dirs());
    }

    assert!(ctx.search_path().is_empty());
    assert_eq!(ctx.var(MODULE_PATH_VAR), None);
}

#[test]
fn unresolvable_requirement_leaves_context_untouched() {
    let dir = TempDir::new().unwrap();
    let builder = builder(&dir, FakeIndex::new(&[]));
    let mut ctx = MemoryContext::new().with_search_path(["/stdlib"]);

    let err = builder.apply(["missing"], &mut ctx).unwrap_err();

    assert!(matches!(err, ScriptEnvError::Resolution { code: 1, .. }));
    assert!(err.output().unwrap().contains("missing"));
    assert_eq!(ctx.search_path(), vec![PathBuf::from("/stdlib")]);
    assert_eq!(builder.package_manager().installs.get(), 0);
}
