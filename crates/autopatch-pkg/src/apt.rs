//! APT package manager (Debian/Ubuntu)

use std::sync::Arc;

use async_trait::async_trait;
use autopatch_exec::CommandExecutor;
use tracing::{debug, info, instrument, warn};

use crate::error::PackageError;
use crate::traits::PackageManager;
use crate::types::{DistroFamily, ExitStatus, PackageListing};

/// APT package manager implementation
pub struct AptManager {
    /// Executor for running apt-get
    executor: Arc<dyn CommandExecutor>,
    /// Whether to use sudo
    use_sudo: bool,
}

impl AptManager {
    /// Create a new APT manager
    ///
    /// # Arguments
    /// * `executor` - Executor for running apt-get commands
    /// * `use_sudo` - Whether to prefix commands with sudo
    pub fn new(executor: Arc<dyn CommandExecutor>, use_sudo: bool) -> Self {
        Self { executor, use_sudo }
    }

    /// Build the argv for an apt-get invocation, with optional sudo
    fn apt_cmd<'a>(&self, args: &[&'a str]) -> (&'static str, Vec<&'a str>) {
        if self.use_sudo {
            let mut argv = Vec::with_capacity(args.len() + 1);
            argv.push("apt-get");
            argv.extend_from_slice(args);
            ("sudo", argv)
        } else {
            ("apt-get", args.to_vec())
        }
    }
}

#[async_trait]
impl PackageManager for AptManager {
    #[instrument(skip(self))]
    async fn list_pending(&self) -> Result<PackageListing, PackageError> {
        debug!("refreshing package indexes");

        let (program, args) = self.apt_cmd(&["update", "-y"]);
        let update = self.executor.run(program, &args).await?;
        if !update.success() {
            // Stale indexes still produce a usable listing
            warn!(
                status = update.status,
                stderr = %update.stderr.trim(),
                "apt-get update failed"
            );
        }

        // --assume-no makes apt-get abort after printing the plan, so the
        // exit status is non-zero whenever something is pending.
        let (program, args) = self.apt_cmd(&[
            "--assume-no",
            "--show-upgraded",
            "--verbose-versions",
            "--quiet",
            "upgrade",
        ]);
        let result = self.executor.run(program, &args).await?;

        if result.stderr.contains("Could not get lock") {
            return Err(PackageError::LockConflict(result.stderr));
        }

        info!(lines = result.stdout.lines().count(), "listed pending updates");

        Ok(PackageListing::new(result.stdout))
    }

    #[instrument(skip(self))]
    async fn upgrade_one(&self, package: &str) -> Result<ExitStatus, PackageError> {
        let (program, args) = self.apt_cmd(&[
            "--quiet",
            "--assume-yes",
            "--only-upgrade",
            "install",
            package,
        ]);
        let result = self.executor.run_attached(program, &args).await?;

        debug!(package, status = result.status, "apt-get install finished");

        Ok(ExitStatus(result.status))
    }

    #[instrument(skip(self))]
    async fn clean_cache(&self) -> Result<(), PackageError> {
        for step in [&["autoremove", "-y"][..], &["clean", "--quiet"][..]] {
            let (program, args) = self.apt_cmd(step);
            let result = self.executor.run(program, &args).await?;
            if !result.success() {
                return Err(PackageError::from_failed_command(
                    result.status,
                    &result.stderr,
                ));
            }
        }

        debug!("apt cache cleaned");
        Ok(())
    }

    fn family(&self) -> DistroFamily {
        DistroFamily::Debian
    }
}
