//! Sequential package installation

use autopatch_pkg::PackageManager;
use tracing::{error, info, instrument, warn};

use crate::console::Console;

/// Installs updatable packages one at a time
///
/// Package managers hold an exclusive lock, so upgrades are never
/// overlapped. A failing package is recorded and the batch continues.
pub struct UpdateExecutor<'a> {
    manager: &'a dyn PackageManager,
    console: &'a Console,
}

impl<'a> UpdateExecutor<'a> {
    pub fn new(manager: &'a dyn PackageManager, console: &'a Console) -> Self {
        Self { manager, console }
    }

    /// Upgrade every package in order and return the ones that failed
    ///
    /// The package cache is cleaned exactly once afterwards, whatever the
    /// outcome; a cleanup failure is only logged.
    #[instrument(skip_all, fields(count = updatable.len()))]
    pub async fn apply(&self, updatable: &[String]) -> Vec<String> {
        let mut failed = Vec::new();

        for package in updatable {
            let succeeded = match self.manager.upgrade_one(package).await {
                Ok(status) if status.success() => true,
                Ok(status) => {
                    warn!(package = %package, status = status.0, "upgrade failed");
                    false
                }
                Err(e) => {
                    error!(package = %package, error = %e, "upgrade could not run");
                    false
                }
            };

            if succeeded {
                info!(package = %package, "package upgraded");
            } else {
                self.console
                    .line(format!("Package {package} cannot be installed"));
                failed.push(package.clone());
            }
        }

        if let Err(e) = self.manager.clean_cache().await {
            warn!(error = %e, "cache cleanup failed");
        }

        failed
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use autopatch_pkg::{DistroFamily, ExitStatus, PackageError, PackageListing};

    use super::*;

    struct FakeManager {
        failing: HashSet<&'static str>,
        attempted: Mutex<Vec<String>>,
        cleanups: AtomicUsize,
        cleanup_fails: bool,
    }

    impl FakeManager {
        fn new(failing: &[&'static str]) -> Self {
            Self {
                failing: failing.iter().copied().collect(),
                attempted: Mutex::new(Vec::new()),
                cleanups: AtomicUsize::new(0),
                cleanup_fails: false,
            }
        }
    }

    #[async_trait]
    impl PackageManager for FakeManager {
        async fn list_pending(&self) -> Result<PackageListing, PackageError> {
            Ok(PackageListing::default())
        }

        async fn upgrade_one(&self, package: &str) -> Result<ExitStatus, PackageError> {
            self.attempted.lock().unwrap().push(package.to_string());
            if package == "unspawnable" {
                return Err(PackageError::ManagerNotFound("yum".to_string()));
            }
            Ok(ExitStatus(i32::from(self.failing.contains(package))))
        }

        async fn clean_cache(&self) -> Result<(), PackageError> {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            if self.cleanup_fails {
                return Err(PackageError::CommandFailed {
                    status: 1,
                    message: "cleanup".to_string(),
                });
            }
            Ok(())
        }

        fn family(&self) -> DistroFamily {
            DistroFamily::Rpm
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_never_aborts_early() {
        let manager = FakeManager::new(&["b", "d"]);
        let console = Console::capture();

        let failed = UpdateExecutor::new(&manager, &console)
            .apply(&names(&["a", "b", "c", "d"]))
            .await;

        assert_eq!(*manager.attempted.lock().unwrap(), names(&["a", "b", "c", "d"]));
        assert_eq!(failed, names(&["b", "d"]));
        assert_eq!(
            console.lines(),
            vec!["Package b cannot be installed", "Package d cannot be installed"]
        );
    }

    #[tokio::test]
    async fn test_cleanup_runs_once_for_any_outcome() {
        for failing in [&[][..], &["b"][..], &["a", "b", "c"][..]] {
            let manager = FakeManager::new(failing);
            let console = Console::capture();

            let failed = UpdateExecutor::new(&manager, &console)
                .apply(&names(&["a", "b", "c"]))
                .await;

            assert_eq!(failed.len(), failing.len());
            assert_eq!(manager.cleanups.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_invocation_error_counts_as_failure() {
        let manager = FakeManager::new(&[]);
        let console = Console::capture();

        let failed = UpdateExecutor::new(&manager, &console)
            .apply(&names(&["a", "unspawnable", "c"]))
            .await;

        assert_eq!(failed, names(&["unspawnable"]));
        assert_eq!(manager.attempted.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_cleanup_failure_is_swallowed() {
        let mut manager = FakeManager::new(&[]);
        manager.cleanup_fails = true;
        let console = Console::capture();

        let failed = UpdateExecutor::new(&manager, &console)
            .apply(&names(&["a"]))
            .await;

        assert!(failed.is_empty());
        assert_eq!(manager.cleanups.load(Ordering::SeqCst), 1);
    }
}
