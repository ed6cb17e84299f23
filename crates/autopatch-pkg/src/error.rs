//! Error types for autopatch-pkg

use thiserror::Error;

/// Errors that can occur during package operations
#[derive(Error, Debug, Clone)]
pub enum PackageError {
    /// Package manager binary could not be invoked
    #[error("package manager not found: {0}")]
    ManagerNotFound(String),

    /// Lock file conflict (another package manager process running)
    #[error("lock file conflict: {0}")]
    LockConflict(String),

    /// Command ran but reported failure
    #[error("command failed: {status} - {message}")]
    CommandFailed {
        /// Exit status
        status: i32,
        /// Error message
        message: String,
    },

    /// Execution error from the command executor
    #[error("execution error: {0}")]
    ExecutionError(String),

    /// Host distribution is not one of the supported families
    #[error("unsupported distribution: {0}")]
    UnsupportedDistribution(String),

    /// Distribution identification could not be read
    #[error("cannot identify distribution: {0}")]
    OsRelease(String),
}

impl PackageError {
    /// Check if error means the host cannot be managed at all
    #[must_use]
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(
            self,
            PackageError::UnsupportedDistribution(_) | PackageError::OsRelease(_)
        )
    }

    /// Classify a failed command by its stderr
    pub(crate) fn from_failed_command(status: i32, stderr: &str) -> Self {
        if stderr.contains("Could not get lock") || stderr.contains("Existing lock") {
            PackageError::LockConflict(stderr.trim().to_string())
        } else {
            PackageError::CommandFailed {
                status,
                message: stderr.trim().to_string(),
            }
        }
    }
}

impl From<autopatch_exec::ExecError> for PackageError {
    fn from(e: autopatch_exec::ExecError) -> Self {
        if e.is_not_found() {
            PackageError::ManagerNotFound(e.to_string())
        } else {
            PackageError::ExecutionError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_conflict_detection() {
        let err = PackageError::from_failed_command(
            100,
            "E: Could not get lock /var/lib/dpkg/lock-frontend\n",
        );
        assert!(matches!(err, PackageError::LockConflict(_)));

        let err = PackageError::from_failed_command(1, "Error: Nothing to do");
        assert!(matches!(err, PackageError::CommandFailed { status: 1, .. }));
    }

    #[test]
    fn test_unsupported_platform() {
        assert!(PackageError::UnsupportedDistribution("arch".into()).is_unsupported_platform());
        assert!(!PackageError::ManagerNotFound("yum".into()).is_unsupported_platform());
    }
}
