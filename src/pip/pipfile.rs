//! Pipfile.lock parsing
//!
//! Turns the pinned packages of a `Pipfile.lock` into requirement specifiers.

use crate::error::{ScriptEnvError, ScriptEnvResult};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const PIPFILE_LOCK: &str = "Pipfile.lock";
const META_SECTION: &str = "_meta";

/// Parse a `Pipfile.lock` (or a directory containing one) into requirements
///
/// Every section except `_meta` contributes `name + version`. Entries without
/// a pinned version, such as VCS or path dependencies, are skipped.
pub fn parse_pipfile_lock(path: &Path) -> ScriptEnvResult<Vec<String>> {
    let path: PathBuf = if path.is_dir() {
        path.join(PIPFILE_LOCK)
    } else {
        path.to_path_buf()
    };

    let content = fs::read(&path)
        .map_err(|e| ScriptEnvError::io(format!("reading {}", path.display()), e))?;
    let document: Value = serde_json::from_slice(&content)?;

    let invalid = |reason: String| ScriptEnvError::PipfileInvalid {
        path: path.clone(),
        reason,
    };

    let sections = document
        .as_object()
        .ok_or_else(|| invalid("top level is not an object".to_string()))?;

    let mut requirements = Vec::new();
    for (section, packages) in sections {
        if section == META_SECTION {
            continue;
        }
        let packages = packages
            .as_object()
            .ok_or_else(|| invalid(format!("section '{}' is not an object", section)))?;

        for (name, spec) in packages {
            match spec.get("version").and_then(Value::as_str) {
                Some(version) => requirements.push(format!("{}{}", name, version)),
                None => warn!("Skipping {} in {}: no pinned version", name, path.display()),
            }
        }
    }

    Ok(requirements)
}
