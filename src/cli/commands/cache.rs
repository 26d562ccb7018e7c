//! Cache command - inspect the package cache

use crate::cache::CacheLayout;
use crate::cli::args::{CacheAction, CacheArgs};
use crate::config::Config;
use crate::error::ScriptEnvResult;
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> ScriptEnvResult<()> {
    let layout = CacheLayout::new(&config.cache.path);

    match args.action {
        CacheAction::Info => show_info(&layout, config.cache.use_lockfile)?,
        CacheAction::Path => println!("{}", layout.root().display()),
    }

    Ok(())
}

fn show_info(layout: &CacheLayout, use_lockfile: bool) -> ScriptEnvResult<()> {
    let locks = CacheLayout::count_entries(&layout.locks_dir())?;
    let artifacts = CacheLayout::count_entries(&layout.artifacts_dir())?;
    let installed = CacheLayout::count_entries(&layout.install_dir())?;

    println!("{}", style("Cache").bold());
    println!("  {:<12} {}", "Root:", layout.root().display());
    println!(
        "  {:<12} {}",
        "Lockfiles:",
        if use_lockfile {
            style("enabled").green()
        } else {
            style("disabled").yellow()
        }
    );
    println!("  {:<12} {}", "Locks:", locks);
    println!("  {:<12} {}", "Artifacts:", artifacts);
    println!("  {:<12} {}", "Installed:", installed);
    Ok(())
}
