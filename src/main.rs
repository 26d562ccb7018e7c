//! scriptenv - Script-level dependencies
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use scriptenv::cli::{Cli, Commands};
use scriptenv::config::ConfigManager;
use scriptenv::error::ScriptEnvResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(output) = e.output() {
                eprintln!("{}", style(output.trim_end()).dim());
            }
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ScriptEnvResult<i32> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("scriptenv=warn"),
        1 => EnvFilter::new("scriptenv=info"),
        _ => EnvFilter::new("scriptenv=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config_manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    let config = config_manager.load()?;

    match cli.command {
        Commands::Run(args) => scriptenv::cli::commands::run(args, &config).await,
        Commands::Config(args) => {
            scriptenv::cli::commands::config(args, &config, &config_manager).await?;
            Ok(0)
        }
        Commands::Cache(args) => {
            scriptenv::cli::commands::cache(args, &config).await?;
            Ok(0)
        }
    }
}
