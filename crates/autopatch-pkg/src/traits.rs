//! Package manager traits

use async_trait::async_trait;

use crate::error::PackageError;
use crate::types::{DistroFamily, ExitStatus, PackageListing};

/// Uniform interface over a distribution's package manager
///
/// Implementations must not retry: each method invokes the underlying tool
/// exactly once per call.
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Query the raw listing of pending updates
    async fn list_pending(&self) -> Result<PackageListing, PackageError>;

    /// Upgrade a single package, blocking until the tool exits
    async fn upgrade_one(&self, package: &str) -> Result<ExitStatus, PackageError>;

    /// Purge downloaded package data after a run
    async fn clean_cache(&self) -> Result<(), PackageError>;

    /// Distribution family this manager serves
    fn family(&self) -> DistroFamily;
}
