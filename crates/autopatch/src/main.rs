//! autopatch
//!
//! Unattended package updater: installs pending updates one by one, holds back
//! kernel/boot packages and reports what needs attention.

use std::process::ExitCode;
use std::sync::Arc;

use autopatch_core::{
    Console, CoreError, Orchestrator, RunContext, RunExit, RunSummary, UpdaterConfig,
};
use autopatch_exec::{CommandExecutor, LocalExecutor};
use autopatch_pkg::HostDistro;
use clap::Parser;
use color_eyre::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod factory;

#[derive(Parser)]
#[command(name = "autopatch", version)]
#[command(about = "Unattended OS package updater with Slack/SMTP reporting", long_about = None)]
struct Cli {}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Configure, detect the host and perform one run
async fn run(short_hostname: String) -> Result<RunSummary, CoreError> {
    let config = UpdaterConfig::from_env()?;
    let executor: Arc<dyn CommandExecutor> = Arc::new(LocalExecutor::new());

    let hostname = factory::fqdn(executor.as_ref(), short_hostname).await;
    let distro = HostDistro::detect(executor.clone())
        .await
        .map_err(CoreError::from_detection)?;

    let ctx = RunContext::new(hostname, distro, config);
    info!(host = %ctx.hostname, version = env!("CARGO_PKG_VERSION"), "autopatch starting");

    let use_sudo = factory::needs_sudo(executor.as_ref()).await;
    let manager = factory::package_manager(ctx.distro.family, executor, use_sudo);
    let dispatcher = factory::dispatcher(&ctx);

    Orchestrator::new(&ctx, manager, dispatcher, Console::stdout())
        .run()
        .await
}

/// Print the operator diagnostic for a run that stopped early
fn report_failure(err: &CoreError) {
    match err {
        CoreError::Config(e) => eprintln!("Error: {e}"),
        CoreError::UnsupportedPlatform(e) => {
            warn!(error = %e, "host cannot be managed");
            println!("Unknown Linux distribution");
            println!("Only RHEL/CentOS and Debian/Ubuntu are supported at the moment");
        }
        CoreError::Listing(e) => {
            error!(error = %e, "cannot list pending updates");
            eprintln!("Error: cannot list pending updates: {e}");
        }
    }
}

/// Exit status for the outcome of `run`
fn run_exit(outcome: &Result<RunSummary, CoreError>) -> RunExit {
    match outcome {
        Ok(summary) => summary.exit(),
        Err(e) => e.exit(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let _cli = Cli::parse();
    init_tracing();

    let short_hostname = hostname::get()?.to_string_lossy().into_owned();
    let outcome = run(short_hostname).await;

    match &outcome {
        Ok(summary) if !summary.undelivered.is_empty() => {
            warn!(undelivered = summary.undelivered.len(), "run finished with undelivered reports");
        }
        Ok(_) => {}
        Err(e) => report_failure(e),
    }

    Ok(ExitCode::from(run_exit(&outcome).code()))
}
