//! Local command execution using `tokio::process`

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::error::ExecError;
use crate::result::CommandResult;
use crate::traits::CommandExecutor;

/// Local command executor
///
/// Executes programs on the local machine using `tokio::process::Command`.
/// A child killed by a signal reports status `-1`.
#[derive(Debug, Clone)]
pub struct LocalExecutor;

impl LocalExecutor {
    /// Create a new local executor
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn command(program: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd
    }

    fn spawn_error(program: &str, e: &std::io::Error) -> ExecError {
        ExecError::SpawnError {
            program: program.to_string(),
            message: e.to_string(),
        }
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for LocalExecutor {
    #[instrument(skip(self), level = "debug")]
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        let output = Self::command(program, args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::spawn_error(program, &e))?
            .wait_with_output()
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        let duration = start.elapsed();
        let status = output.status.code().unwrap_or(-1);

        debug!(
            program,
            status,
            duration = ?duration,
            "command completed"
        );

        Ok(CommandResult {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration,
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn run_attached(
        &self,
        program: &str,
        args: &[&str],
    ) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        let status = Self::command(program, args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| Self::spawn_error(program, &e))?
            .wait()
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        let duration = start.elapsed();
        let code = status.code().unwrap_or(-1);

        if !status.success() {
            warn!(program, status = code, "command exited with failure");
        }

        Ok(CommandResult::from_status(code, duration))
    }
}
