//! autopatch-core: Update run orchestration
//!
//! Holds the run configuration and context, the sequential update executor
//! and the orchestrator that ties listing, classification, installation and
//! notification together.

pub mod config;
pub mod console;
pub mod context;
pub mod error;
pub mod executor;
pub mod orchestrator;

pub use config::UpdaterConfig;
pub use console::Console;
pub use context::RunContext;
pub use error::{ConfigError, CoreError};
pub use executor::UpdateExecutor;
pub use orchestrator::{Orchestrator, RunExit, RunSummary};
