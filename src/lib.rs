//! scriptenv - Script-level dependencies
//!
//! Lets a standalone script declare third-party requirements at run time.
//! Each resolved package is installed once into its own cached directory and
//! overlaid onto the running process, without touching any shared
//! environment.
//!
//! ```rust,ignore
//! let env = scriptenv::requires(["requests==2.31.0"])?;
//! // PYTHONPATH and PATH now expose the packages to subprocesses
//! env.disable()?;
//! ```

pub mod builder;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod overlay;
pub mod pip;

pub use builder::ScriptEnvBuilder;
pub use error::{ScriptEnvError, ScriptEnvResult};
pub use overlay::{import, search_path, ScopedEnv, ScriptEnv};

use config::ConfigManager;

/// Make `requirements` available to the current process and its subprocesses
///
/// Loads configuration from the default config file and `SCRIPTENV_*`
/// environment variables, resolves and installs with pip, and enables the
/// resulting overlay. The returned handle can `disable()` it again.
pub fn requires<I, S>(requirements: I) -> ScriptEnvResult<ScriptEnv>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let config = ConfigManager::new().load()?;
    let env = ScriptEnvBuilder::new(&config)?.build(requirements)?;
    env.enable()?;
    Ok(env)
}
