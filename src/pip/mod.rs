//! Package manager adapter
//!
//! Resolution and installation are delegated to pip. The builder only talks
//! to the [`PackageManager`] trait, so tests can substitute a recording fake.

pub mod pipfile;

pub use pipfile::parse_pipfile_lock;

use crate::config::PipConfig;
use crate::error::{ScriptEnvError, ScriptEnvResult};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::sync::LazyLock;
use tracing::debug;

/// Matches the lines pip prints for artifacts that landed in `--dest`
///
/// `Downloading <url>` lines are not matched: candidates rejected while
/// backtracking are never saved.
static ARTIFACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(?:Saved|File was already downloaded)\s+.*[/\\](?P<name>[^/\\\s]+?\.(?:tar\.gz|whl|zip))\s*$",
    )
    .expect("valid artifact regex")
});

/// Abstract package manager interface
///
/// Both operations are synchronous and single-attempt.
pub trait PackageManager {
    /// Download `requirements` and all their dependencies into `dest`
    ///
    /// Returns the file names of every downloaded artifact.
    fn download(&self, requirements: &[String], dest: &Path) -> ScriptEnvResult<BTreeSet<String>>;

    /// Install a single artifact into `target` without its dependencies
    fn install(&self, artifact: &Path, target: &Path) -> ScriptEnvResult<()>;
}

/// Package manager backed by `python -m pip`
#[derive(Debug, Clone)]
pub struct Pip {
    python: String,
    index_url: Option<String>,
}

impl Pip {
    pub fn new(config: &PipConfig) -> Self {
        Self {
            python: config.python.clone(),
            index_url: config.index_url.clone(),
        }
    }

    fn command(&self, subcommand: &str) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.args(["-m", "pip", subcommand, "--disable-pip-version-check"])
            .env_remove("PIP_USER")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(url) = &self.index_url {
            cmd.args(["--index-url", url]);
        }
        cmd
    }

    /// Run pip with captured output, returning stdout or the exit code and combined output
    fn exec(&self, mut cmd: Command) -> ScriptEnvResult<Result<String, (i32, String)>> {
        debug!("Executing: {:?}", cmd);

        let Output {
            status,
            stdout,
            stderr,
        } = cmd
            .output()
            .map_err(|e| ScriptEnvError::command_failed(format!("{} -m pip", self.python), e))?;

        let stdout = String::from_utf8_lossy(&stdout).into_owned();
        if status.success() {
            return Ok(Ok(stdout));
        }

        let stderr = String::from_utf8_lossy(&stderr);
        let output = format!("{}{}", stdout, stderr);
        Ok(Err((status.code().unwrap_or(-1), output)))
    }
}

impl PackageManager for Pip {
    fn download(&self, requirements: &[String], dest: &Path) -> ScriptEnvResult<BTreeSet<String>> {
        let mut cmd = self.command("download");
        cmd.arg("--dest").arg(dest).args(requirements);

        match self.exec(cmd)? {
            Ok(stdout) => Ok(parse_artifact_names(&stdout)),
            Err((code, output)) => Err(ScriptEnvError::Resolution { code, output }),
        }
    }

    fn install(&self, artifact: &Path, target: &Path) -> ScriptEnvResult<()> {
        let mut cmd = self.command("install");
        cmd.args(["--no-deps", "--no-user", "--target"])
            .arg(target)
            .arg(artifact);

        match self.exec(cmd)? {
            Ok(_) => Ok(()),
            Err((code, output)) => Err(ScriptEnvError::Install {
                package: artifact
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| artifact.display().to_string()),
                code,
                output,
            }),
        }
    }
}

/// Extract downloaded artifact file names from `pip download` output
pub fn parse_artifact_names(output: &str) -> BTreeSet<String> {
    ARTIFACT_PATTERN
        .captures_iter(output)
        .filter_map(|caps| caps.name("name"))
        .map(|m| m.as_str().to_string())
        .collect()
}
