//! YUM package manager (RHEL/CentOS/Fedora)

use std::sync::Arc;

use async_trait::async_trait;
use autopatch_exec::CommandExecutor;
use tracing::{debug, info, instrument};

use crate::error::PackageError;
use crate::traits::PackageManager;
use crate::types::{DistroFamily, ExitStatus, PackageListing};

/// `yum check-update` exit code when updates are available
const CHECK_UPDATE_PENDING: i32 = 100;

/// YUM package manager implementation
///
/// On dnf-based hosts `yum` is the compatibility alias, so the same
/// invocations work across RHEL 7 through current Fedora.
pub struct YumManager {
    executor: Arc<dyn CommandExecutor>,
    use_sudo: bool,
}

impl YumManager {
    /// Create a new YUM manager
    pub fn new(executor: Arc<dyn CommandExecutor>, use_sudo: bool) -> Self {
        Self { executor, use_sudo }
    }

    /// Build the argv for a yum invocation, with optional sudo
    fn yum_cmd<'a>(&self, args: &[&'a str]) -> (&'static str, Vec<&'a str>) {
        if self.use_sudo {
            let mut argv = Vec::with_capacity(args.len() + 1);
            argv.push("yum");
            argv.extend_from_slice(args);
            ("sudo", argv)
        } else {
            ("yum", args.to_vec())
        }
    }
}

#[async_trait]
impl PackageManager for YumManager {
    #[instrument(skip(self))]
    async fn list_pending(&self) -> Result<PackageListing, PackageError> {
        debug!("listing pending updates");

        let (program, args) = self.yum_cmd(&["check-update"]);
        let result = self.executor.run(program, &args).await?;

        // 0 = nothing pending, 100 = updates available
        if result.status != 0 && result.status != CHECK_UPDATE_PENDING {
            return Err(PackageError::from_failed_command(
                result.status,
                &result.stderr,
            ));
        }

        info!(lines = result.stdout.lines().count(), "listed pending updates");

        Ok(PackageListing::new(result.stdout))
    }

    #[instrument(skip(self))]
    async fn upgrade_one(&self, package: &str) -> Result<ExitStatus, PackageError> {
        let (program, args) = self.yum_cmd(&[
            "--quiet",
            "--assumeyes",
            "--exclude=kernel*",
            "--exclude=systemd*",
            "upgrade",
            package,
        ]);
        let result = self.executor.run_attached(program, &args).await?;

        debug!(package, status = result.status, "yum upgrade finished");

        Ok(ExitStatus(result.status))
    }

    #[instrument(skip(self))]
    async fn clean_cache(&self) -> Result<(), PackageError> {
        let (program, args) = self.yum_cmd(&["clean", "all", "--quiet"]);
        let result = self.executor.run(program, &args).await?;

        if !result.success() {
            return Err(PackageError::from_failed_command(
                result.status,
                &result.stderr,
            ));
        }

        debug!("yum cache cleaned");
        Ok(())
    }

    fn family(&self) -> DistroFamily {
        DistroFamily::Rpm
    }
}
