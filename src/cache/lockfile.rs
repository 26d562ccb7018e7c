//! Lock key derivation and lock persistence
//!
//! A lock records the packages a requirement set resolved to. The key is a
//! content hash of the requirement set, so the same set always maps to the
//! same lock file.

use crate::error::{ScriptEnvError, ScriptEnvResult};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Derive the lock key for a requirement set
///
/// Requirements are sorted and de-duplicated before hashing. Comparison is
/// case-sensitive: `Pkg` and `pkg` produce different keys. Each entry is
/// hashed with its length prefix so no two distinct sets share an encoding.
pub fn lock_key<I, S>(requirements: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let canonical: BTreeSet<String> = requirements
        .into_iter()
        .map(|r| r.as_ref().to_string())
        .collect();

    let mut hasher = Sha256::new();
    for requirement in &canonical {
        hasher.update((requirement.len() as u64).to_le_bytes());
        hasher.update(requirement.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Read the package identifiers recorded in a lock file
pub fn read_lock(path: &Path) -> ScriptEnvResult<BTreeSet<String>> {
    let content = fs::read_to_string(path)
        .map_err(|e| ScriptEnvError::io(format!("reading lockfile {}", path.display()), e))?;

    let packages: Vec<String> =
        serde_json::from_str(&content).map_err(|e| ScriptEnvError::LockfileCorrupt {
            path: path.to_path_buf(),
            source: e,
        })?;

    debug!("Read {} packages from {}", packages.len(), path.display());
    Ok(packages.into_iter().collect())
}

/// Persist package identifiers to a lock file
///
/// The lock is written to a temporary file next to `path` and renamed into
/// place, so readers see either no lock or a complete one.
pub fn write_lock(path: &Path, packages: &BTreeSet<String>) -> ScriptEnvResult<()> {
    let list: Vec<&String> = packages.iter().collect();
    let content = serde_json::to_string_pretty(&list)?;
    let context = || format!("writing lockfile {}", path.display());

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| ScriptEnvError::io(context(), e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| ScriptEnvError::io(context(), e))?;
    temp.persist(path)
        .map_err(|e| ScriptEnvError::io(context(), e.error))?;

    debug!("Wrote {} packages to {}", packages.len(), path.display());
    Ok(())
}
