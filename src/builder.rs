//! Resolution and installation
//!
//! [`ScriptEnvBuilder`] turns requirement specifiers into a [`ScriptEnv`]:
//! requirements are resolved once per distinct set (cached as a lock),
//! and every resolved package is installed into its own directory once.

use crate::cache::{lock_key, read_lock, write_lock, CacheLayout};
use crate::config::Config;
use crate::error::ScriptEnvResult;
use crate::overlay::{ProcessContext, ScriptEnv};
use crate::pip::{PackageManager, Pip};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Builds script environments on top of a package manager
pub struct ScriptEnvBuilder<P: PackageManager = Pip> {
    layout: CacheLayout,
    use_lockfile: bool,
    package_manager: P,
}

impl ScriptEnvBuilder<Pip> {
    /// Create a builder backed by pip
    pub fn new(config: &Config) -> ScriptEnvResult<Self> {
        Self::with_package_manager(config, Pip::new(&config.pip))
    }
}

impl<P: PackageManager> ScriptEnvBuilder<P> {
    /// Create a builder backed by a custom package manager
    pub fn with_package_manager(config: &Config, package_manager: P) -> ScriptEnvResult<Self> {
        let layout = CacheLayout::new(&config.cache.path);
        layout.ensure()?;

        Ok(Self {
            layout,
            use_lockfile: config.cache.use_lockfile,
            package_manager,
        })
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    pub fn package_manager(&self) -> &P {
        &self.package_manager
    }

    /// Resolve, install, and return an overlay for `requirements`
    pub fn build<I, S>(&self, requirements: I) -> ScriptEnvResult<ScriptEnv>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let packages = self.fetch_requirements(requirements)?;
        self.install_packages(&packages)?;
        Ok(ScriptEnv::new(self.layout.install_dir(), packages))
    }

    /// Build and enable the overlay in `ctx`
    pub fn apply<I, S>(
        &self,
        requirements: I,
        ctx: &mut dyn ProcessContext,
    ) -> ScriptEnvResult<ScriptEnv>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let env = self.build(requirements)?;
        env.enable_in(ctx)?;
        Ok(env)
    }

    /// Resolve a set of requirements into package identifiers
    ///
    /// A lock hit never calls the package manager. With lockfiles disabled,
    /// existing locks are neither read nor written.
    pub fn fetch_requirements<I, S>(&self, requirements: I) -> ScriptEnvResult<BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requirements: Vec<String> = requirements
            .into_iter()
            .map(|r| r.as_ref().to_string())
            .collect();
        if requirements.is_empty() {
            return Ok(BTreeSet::new());
        }

        let lock_path = self.layout.lock_path(&lock_key(&requirements));

        if self.use_lockfile && lock_path.is_file() {
            debug!("Lock hit for {:?}: {}", requirements, lock_path.display());
            return read_lock(&lock_path);
        }

        info!("Resolving {}", requirements.join(" "));
        let packages = self
            .package_manager
            .download(&requirements, &self.layout.artifacts_dir())?;

        if self.use_lockfile {
            write_lock(&lock_path, &packages)?;
        }
        Ok(packages)
    }

    /// Install every package that does not have an install directory yet
    pub fn install_packages<I, S>(&self, packages: I) -> ScriptEnvResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for package in packages {
            let package = package.as_ref();
            let target = self.layout.package_dir(package);
            if target.exists() {
                debug!("Already installed: {}", package);
                continue;
            }

            info!("Installing {}", package);
            self.package_manager
                .install(&self.layout.artifact_path(package), &target)?;
        }
        Ok(())
    }
}
