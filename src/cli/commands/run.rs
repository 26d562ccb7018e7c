//! Run command - execute a command with requirements available

use crate::builder::ScriptEnvBuilder;
use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::error::{ScriptEnvError, ScriptEnvResult};
use crate::overlay::ScriptEnv;
use crate::pip::parse_pipfile_lock;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use tokio::process::Command;
use tracing::debug;

/// Execute the run command, returning the child's exit code
pub async fn execute(args: RunArgs, config: &Config) -> ScriptEnvResult<i32> {
    let mut config = config.clone();
    if args.no_lockfile {
        config.cache.use_lockfile = false;
    }

    let requirements = collect_requirements(&args)?;
    debug!("Requirements: {:?}", requirements);

    let pb = create_progress_bar("Resolving requirements...");
    let result = build_env(&config, &requirements, &pb);
    pb.finish_and_clear();

    let env = result?;
    env.enable()?;
    debug!(
        "Enabled {} packages from {}",
        env.packages().len(),
        env.install_path().display()
    );

    spawn(&args.command).await
}

/// Positional requirements followed by any from `--pipfile`
fn collect_requirements(args: &RunArgs) -> ScriptEnvResult<Vec<String>> {
    let mut requirements = args.requirements.clone();
    if let Some(ref path) = args.pipfile {
        requirements.extend(parse_pipfile_lock(path)?);
    }
    Ok(requirements)
}

fn build_env(
    config: &Config,
    requirements: &[String],
    pb: &ProgressBar,
) -> ScriptEnvResult<ScriptEnv> {
    let builder = ScriptEnvBuilder::new(config)?;
    let packages = builder.fetch_requirements(requirements)?;

    pb.set_message(format!("Installing {} packages...", packages.len()));
    builder.install_packages(&packages)?;

    Ok(ScriptEnv::new(builder.layout().install_dir(), packages))
}

/// Run the command with inherited stdio and environment
async fn spawn(command: &[String]) -> ScriptEnvResult<i32> {
    let Some((program, rest)) = command.split_first() else {
        return Err(ScriptEnvError::command_failed(
            "",
            io::Error::new(io::ErrorKind::InvalidInput, "no command given"),
        ));
    };
    debug!("Executing: {:?}", command);

    let status = Command::new(program)
        .args(rest)
        .status()
        .await
        .map_err(|e| ScriptEnvError::command_failed(command.join(" "), e))?;

    status.code().ok_or(ScriptEnvError::ProcessSignaled)
}

fn create_progress_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
