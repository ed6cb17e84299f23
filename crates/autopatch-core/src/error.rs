//! Core error types for autopatch-core

use autopatch_pkg::PackageError;
use thiserror::Error;

use crate::orchestrator::RunExit;

/// Problems with the environment configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("environment variable {0} must be provided explicitly")]
    Missing(&'static str),

    /// Port is not a number in 1..=65535
    #[error("invalid SMTP port {0:?}")]
    InvalidPort(String),

    /// Webhook URL cannot be parsed
    #[error("invalid webhook URL: {0}")]
    InvalidUrl(String),

    /// Recipient list contains no addresses
    #[error("recipient list is empty")]
    NoRecipients,
}

/// Errors that end a run before any report is sent
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Host distribution is not supported
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(#[source] PackageError),

    /// Pending updates could not be listed
    #[error("cannot list pending updates: {0}")]
    Listing(#[source] PackageError),
}

impl CoreError {
    /// Map a distribution detection failure
    #[must_use]
    pub fn from_detection(e: PackageError) -> Self {
        if e.is_unsupported_platform() {
            CoreError::UnsupportedPlatform(e)
        } else {
            CoreError::Listing(e)
        }
    }

    /// Process exit status for a run that stopped on this error
    ///
    /// An unsupported host is not a failure: the run just has nothing to do.
    #[must_use]
    pub fn exit(&self) -> RunExit {
        match self {
            CoreError::UnsupportedPlatform(_) => RunExit::Success,
            CoreError::Config(_) | CoreError::Listing(_) => RunExit::Fatal,
        }
    }
}
