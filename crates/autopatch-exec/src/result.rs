//! Result types for command execution

use std::time::Duration;

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit status code (0 for success)
    pub status: i32,
    /// stdout output (empty for attached runs)
    pub stdout: String,
    /// stderr output (empty for attached runs)
    pub stderr: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CommandResult {
    /// Build a result that only carries an exit status
    #[must_use]
    pub fn from_status(status: i32, duration: Duration) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: String::new(),
            duration,
        }
    }

    /// Check if command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }
}
