//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// scriptenv - run commands with ad-hoc, cached dependencies
///
/// Resolves requirements once, installs each package into its own cached
/// directory, and exposes them through PYTHONPATH and PATH.
#[derive(Parser, Debug)]
#[command(name = "scriptenv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(long, global = true, env = "SCRIPTENV_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command with requirements available
    Run(RunArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Inspect the package cache
    Cache(CacheArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Requirement specifiers (e.g. requests==2.31.0)
    pub requirements: Vec<String>,

    /// Also require every pinned package from a Pipfile.lock (or its directory)
    #[arg(long)]
    pub pipfile: Option<PathBuf>,

    /// Resolve without reading or writing lockfiles
    #[arg(long)]
    pub no_lockfile: bool,

    /// Command and arguments to run
    #[arg(
        short,
        long,
        required = true,
        num_args = 1..,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.use_lockfile)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cache location and contents
    Info,

    /// Show the cache root directory
    Path,
}
