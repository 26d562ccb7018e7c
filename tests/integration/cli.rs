use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Binary isolated from the user's config file and cache
fn scriptenv(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("scriptenv");
    cmd.env("SCRIPTENV_CONFIG", home.join("config.toml"))
        .env("SCRIPTENV_CACHE_PATH", home.join("cache"))
        .env_remove("SCRIPTENV_USE_LOCKFILE")
        .env_remove("SCRIPTENV_PYTHON")
        .env_remove("SCRIPTENV_INDEX_URL");
    cmd
}

/// Seed a lock and install directories so `run` never calls pip
fn seed_cache(root: &Path, requirements: &[&str], packages: &[&str]) {
    let locks = root.join("locks");
    fs::create_dir_all(&locks).unwrap();
    let lock = serde_json::to_string(packages).unwrap();
    fs::write(locks.join(scriptenv::cache::lock_key(requirements)), lock).unwrap();

    for package in packages {
        fs::create_dir_all(root.join("install").join(package).join("bin")).unwrap();
    }
}

#[test]
fn help_displays() {
    let home = TempDir::new().unwrap();
    scriptenv(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Declare script dependencies at run time",
        ));
}

#[test]
fn version_displays() {
    let home = TempDir::new().unwrap();
    scriptenv(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scriptenv"));
}

#[test]
fn config_path() {
    let home = TempDir::new().unwrap();
    scriptenv(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_show_reflects_env() {
    let home = TempDir::new().unwrap();
    scriptenv(home.path())
        .env("SCRIPTENV_USE_LOCKFILE", "off")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[cache]"))
        .stdout(predicate::str::contains("use_lockfile = false"));
}

#[test]
fn config_invalid_env_fails() {
    let home = TempDir::new().unwrap();
    scriptenv(home.path())
        .env("SCRIPTENV_USE_LOCKFILE", "sometimes")
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SCRIPTENV_USE_LOCKFILE"));
}

#[test]
fn config_init_then_set() {
    let home = TempDir::new().unwrap();
    scriptenv(home.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(home.path().join("config.toml").exists());

    scriptenv(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    scriptenv(home.path())
        .args(["config", "set", "pip.python", "python3.12"])
        .assert()
        .success();

    let written = fs::read_to_string(home.path().join("config.toml")).unwrap();
    assert!(written.contains("python3.12"));
}

#[test]
fn config_set_unknown_key() {
    let home = TempDir::new().unwrap();
    scriptenv(home.path())
        .args(["config", "set", "vm.name", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown key"));
}

#[test]
fn cache_path() {
    let home = TempDir::new().unwrap();
    scriptenv(home.path())
        .args(["cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            home.path().join("cache").display().to_string(),
        ));
}

#[test]
fn cache_info_counts_entries() {
    let home = TempDir::new().unwrap();
    seed_cache(&home.path().join("cache"), &["pkgA==1.0.0"], &["pkgA"]);

    scriptenv(home.path())
        .args(["cache", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Locks:").and(predicate::str::contains("1")))
        .stdout(predicate::str::contains("enabled"));
}

#[test]
fn run_requires_command() {
    let home = TempDir::new().unwrap();
    scriptenv(home.path())
        .args(["run", "requirement"])
        .assert()
        .failure();
}

#[cfg(unix)]
#[test]
fn run_propagates_exit_code() {
    let home = TempDir::new().unwrap();
    scriptenv(home.path())
        .args(["run", "-c", "sh", "-c", "exit 3"])
        .assert()
        .code(3);
}

#[cfg(unix)]
#[test]
fn run_with_cached_lock_exposes_packages() {
    let home = TempDir::new().unwrap();
    let root = home.path().join("cache");
    seed_cache(&root, &["pkgA==1.0.0", "pkgB"], &["pkgA", "pkgB"]);

    let pkg_a = root.join("install").join("pkgA");
    let pkg_b = root.join("install").join("pkgB");

    scriptenv(home.path())
        .env("PYTHONPATH", "/existing")
        .args(["run", "pkgB", "pkgA==1.0.0", "-c", "sh", "-c"])
        .arg(r#"echo "$PYTHONPATH"; echo "$PATH""#)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "{}:{}:/existing",
            pkg_a.display(),
            pkg_b.display()
        )))
        .stdout(predicate::str::contains(format!(
            "{}:{}:",
            pkg_a.join("bin").display(),
            pkg_b.join("bin").display()
        )));
}

#[cfg(unix)]
#[test]
fn run_with_pipfile() {
    let home = TempDir::new().unwrap();
    let root = home.path().join("cache");
    seed_cache(&root, &["pkg==2.0.0"], &["pkg"]);

    let project = home.path().join("project");
    fs::create_dir_all(&project).unwrap();
    fs::write(
        project.join("Pipfile.lock"),
        r#"{"_meta": {}, "default": {"pkg": {"version": "==2.0.0"}}}"#,
    )
    .unwrap();

    scriptenv(home.path())
        .arg("run")
        .arg("--pipfile")
        .arg(&project)
        .args(["-c", "sh", "-c", r#"echo "$PYTHONPATH""#])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            root.join("install").join("pkg").display().to_string(),
        ));
}

#[test]
fn run_with_corrupt_lock_fails() {
    let home = TempDir::new().unwrap();
    let locks = home.path().join("cache").join("locks");
    fs::create_dir_all(&locks).unwrap();
    fs::write(locks.join(scriptenv::cache::lock_key(["pkg"])), "not json").unwrap();

    scriptenv(home.path())
        .args(["run", "pkg", "-c", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Hint:"));
}
