//! Command executor trait

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;

/// Runs programs on the managed host
///
/// Arguments are passed as separate argv elements, never through a shell.
/// Neither method applies a timeout: a hung child blocks the caller.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a program and capture stdout and stderr
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult, ExecError>;

    /// Run a program with its output attached to the console
    ///
    /// The returned `CommandResult` carries the exit status only.
    async fn run_attached(&self, program: &str, args: &[&str])
    -> Result<CommandResult, ExecError>;
}
