//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{parse_bool, Config, ConfigManager};
use crate::error::{ScriptEnvError, ScriptEnvResult};
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> ScriptEnvResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force)?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value)?,
    }

    Ok(())
}

fn show_config(config: &Config) -> ScriptEnvResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn init_config(manager: &ConfigManager, force: bool) -> ScriptEnvResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        println!(
            "{} Config already exists at {}",
            style("!").yellow(),
            path.display()
        );
        println!("  Use --force to overwrite");
        return Ok(());
    }

    manager.save(&Config::default())?;
    println!(
        "{} Configuration initialized at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

/// Update one key in the config file (not the environment-merged view)
fn set_value(manager: &ConfigManager, key: &str, value: &str) -> ScriptEnvResult<()> {
    let mut config = if manager.path().exists() {
        manager.load_from_file(manager.path())?
    } else {
        Config::default()
    };

    apply_value(&mut config, key, value)?;
    manager.save(&config)?;

    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}

fn apply_value(config: &mut Config, key: &str, value: &str) -> ScriptEnvResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["cache", "path"] => config.cache.path = PathBuf::from(value),
        ["cache", "use_lockfile"] => {
            config.cache.use_lockfile =
                parse_bool(value).ok_or_else(|| ScriptEnvError::EnvVarInvalid {
                    name: key.to_string(),
                    value: value.to_string(),
                })?
        }
        ["pip", "python"] => config.pip.python = value.to_string(),
        ["pip", "index_url"] => {
            config.pip.index_url = (!value.is_empty()).then(|| value.to_string())
        }
        _ => {
            return Err(ScriptEnvError::ConfigInvalid {
                path: PathBuf::from(key),
                reason: "unknown key; valid keys: cache.path, cache.use_lockfile, pip.python, pip.index_url".to_string(),
            })
        }
    }
    Ok(())
}
