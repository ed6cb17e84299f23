//! Host distribution detection

use std::sync::Arc;

use autopatch_exec::CommandExecutor;
use tracing::{debug, info, instrument};

use crate::error::PackageError;
use crate::types::DistroFamily;

const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Distribution of the managed host, resolved once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDistro {
    /// os-release `ID`, e.g. `ubuntu`
    pub id: String,
    /// Supported family the host belongs to
    pub family: DistroFamily,
    /// Release codename, empty when the host has none (most RPM distros)
    pub codename: String,
}

impl HostDistro {
    /// Resolve the distribution from os-release content
    ///
    /// `ID` is tried first, then each `ID_LIKE` entry.
    ///
    /// # Errors
    /// Returns `PackageError::UnsupportedDistribution` if neither maps to a
    /// supported family.
    pub fn from_os_release(content: &str) -> Result<Self, PackageError> {
        let id = parse_os_release_field(content, "ID")
            .ok_or_else(|| PackageError::OsRelease("missing ID field".to_string()))?;
        let id_like = parse_os_release_field(content, "ID_LIKE").unwrap_or_default();

        let family = std::iter::once(id.as_str())
            .chain(id_like.split_whitespace())
            .find_map(DistroFamily::from_os_id)
            .ok_or_else(|| PackageError::UnsupportedDistribution(id.clone()))?;

        let codename = parse_os_release_field(content, "VERSION_CODENAME")
            .or_else(|| parse_os_release_field(content, "UBUNTU_CODENAME"))
            .unwrap_or_default();

        Ok(Self {
            id,
            family,
            codename,
        })
    }

    /// Detect the distribution of the local host
    ///
    /// Falls back to `lsb_release -c -s` for the codename on Debian-family
    /// hosts whose os-release lacks one.
    ///
    /// # Errors
    /// Returns an error if os-release cannot be read or the distribution is
    /// unsupported.
    #[instrument(skip(executor))]
    pub async fn detect(executor: Arc<dyn CommandExecutor>) -> Result<Self, PackageError> {
        let content = tokio::fs::read_to_string(OS_RELEASE_PATH)
            .await
            .map_err(|e| PackageError::OsRelease(format!("{OS_RELEASE_PATH}: {e}")))?;

        let mut distro = Self::from_os_release(&content)?;

        if distro.family == DistroFamily::Debian && distro.codename.is_empty() {
            match executor.run("lsb_release", &["-c", "-s"]).await {
                Ok(result) if result.success() => {
                    distro.codename = result.stdout.trim().to_string();
                }
                Ok(result) => debug!(status = result.status, "lsb_release failed"),
                Err(e) => debug!(error = %e, "lsb_release unavailable"),
            }
        }

        info!(
            id = %distro.id,
            family = %distro.family,
            codename = %distro.codename,
            "detected distribution"
        );

        Ok(distro)
    }
}

/// Parse a field from /etc/os-release format
#[must_use]
pub fn parse_os_release_field(content: &str, field: &str) -> Option<String> {
    let prefix = format!("{field}=");
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix(prefix.as_str()))
        .map(|value| value.trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|value| !value.is_empty())
}
