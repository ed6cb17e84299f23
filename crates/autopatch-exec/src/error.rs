//! Error types for autopatch-exec

use thiserror::Error;

/// Errors that can occur while running a command
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Program could not be started (missing binary, permissions)
    #[error("failed to spawn {program}: {message}")]
    SpawnError {
        /// Program that failed to start
        program: String,
        /// Underlying OS error
        message: String,
    },

    /// I/O error while waiting for the child
    #[error("I/O error: {0}")]
    IoError(String),
}

impl ExecError {
    /// Check if the program itself is missing from the host
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExecError::SpawnError { message, .. } if message.contains("No such file"))
    }
}
