//! autopatch-exec: Local command execution abstraction
//!
//! Provides the `CommandExecutor` trait used by package manager adapters and a
//! `tokio::process` backed implementation for the local host.

pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use local::LocalExecutor;
pub use result::CommandResult;
pub use traits::CommandExecutor;
