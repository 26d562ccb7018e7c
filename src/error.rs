//! Error types for scriptenv
//!
//! All modules use `ScriptEnvResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scriptenv operations
pub type ScriptEnvResult<T> = Result<T, ScriptEnvError>;

/// All errors that can occur in scriptenv
#[derive(Error, Debug)]
pub enum ScriptEnvError {
    // Package manager errors
    #[error("Resolving requirements failed with exit code {code}")]
    Resolution { code: i32, output: String },

    #[error("Installing {package} failed with exit code {code}")]
    Install {
        package: String,
        code: i32,
        output: String,
    },

    // Cache errors
    #[error("Corrupt lockfile {path}: {source}")]
    LockfileCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid Pipfile.lock at {path}: {reason}")]
    PipfileInvalid { path: PathBuf, reason: String },

    // Overlay errors
    #[error("No module named '{0}'")]
    ModuleNotFound(String),

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid value for {name}: {value:?}")]
    EnvVarInvalid { name: String, value: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process terminated by signal")]
    ProcessSignaled,

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl ScriptEnvError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Captured package manager output, if this error carries any
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Resolution { output, .. } | Self::Install { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Resolution { .. } => {
                Some("Check the requirement specifiers and that the package index is reachable")
            }
            Self::Install { .. } => {
                Some("The install directory may be incomplete; remove it before retrying")
            }
            Self::LockfileCorrupt { .. } => {
                Some("Delete the lockfile or set SCRIPTENV_USE_LOCKFILE=false")
            }
            Self::EnvVarInvalid { .. } => Some("Use one of: true, false, 1, 0, yes, no, on, off"),
            _ => None,
        }
    }
}
