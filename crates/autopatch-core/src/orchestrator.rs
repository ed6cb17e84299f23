//! Run orchestration
//!
//! One run: list pending updates, classify, install, report. Everything is
//! awaited in sequence; nothing here spawns tasks.

use std::sync::Arc;

use autopatch_notify::{Category, DispatchOutcome, Dispatcher, Report};
use autopatch_pkg::{ClassifiedUpdates, LineShape, PackageManager};
use chrono::{DateTime, Local};
use tracing::{info, instrument, warn};

use crate::console::Console;
use crate::context::RunContext;
use crate::error::CoreError;
use crate::executor::UpdateExecutor;

const TIMESTAMP_FORMAT: &str = autopatch_notify::report::TIMESTAMP_FORMAT;

/// Process exit status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// Run completed and every report was delivered
    Success,
    /// Run could not start or could not list updates
    Fatal,
    /// Updates ran, but at least one report reached neither channel
    NotificationFailed,
}

impl RunExit {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            RunExit::Success => 0,
            RunExit::Fatal => 1,
            RunExit::NotificationFailed => 2,
        }
    }
}

/// What happened during one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub updates: ClassifiedUpdates,
    /// Categories a report was attempted for, in dispatch order
    pub dispatched: Vec<Category>,
    /// Categories whose report reached neither channel
    pub undelivered: Vec<Category>,
}

impl RunSummary {
    #[must_use]
    pub fn exit(&self) -> RunExit {
        if self.undelivered.is_empty() {
            RunExit::Success
        } else {
            RunExit::NotificationFailed
        }
    }
}

/// Drives a single update run on the local host
pub struct Orchestrator<'a> {
    ctx: &'a RunContext,
    manager: Arc<dyn PackageManager>,
    dispatcher: Dispatcher,
    console: Console,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        ctx: &'a RunContext,
        manager: Arc<dyn PackageManager>,
        dispatcher: Dispatcher,
        console: Console,
    ) -> Self {
        Self {
            ctx,
            manager,
            dispatcher,
            console,
        }
    }

    /// Console used by this run
    #[must_use]
    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Execute one run
    ///
    /// # Errors
    /// Returns `CoreError::Listing` if the pending updates cannot be listed;
    /// nothing is installed or reported in that case.
    #[instrument(skip(self), fields(host = %self.ctx.hostname, distro = %self.ctx.distro.id))]
    pub async fn run(&self) -> Result<RunSummary, CoreError> {
        let host = &self.ctx.hostname;
        let started_at = Local::now();
        self.console.line(format!(
            "Update check time: {} on host {host}",
            started_at.format(TIMESTAMP_FORMAT)
        ));

        let listing = self
            .manager
            .list_pending()
            .await
            .map_err(CoreError::Listing)?;
        let family = self.manager.family();
        let shape = LineShape::for_family(family, self.ctx.distro.codename.clone());
        let mut updates = ClassifiedUpdates::classify(&listing, &shape);

        info!(
            family = %family,
            updatable = updates.updatable.len(),
            manual_only = updates.manual_only.len(),
            "pending updates classified"
        );

        if updates.is_up_to_date() {
            self.console.line("Nothing to update. System is up to date");
            if let Err(e) = self.manager.clean_cache().await {
                warn!(error = %e, "cache cleanup failed");
            }
        } else {
            let executor = UpdateExecutor::new(self.manager.as_ref(), &self.console);
            updates.failed = executor.apply(&updates.updatable).await;
            debug_assert!(updates.failed_is_subsequence());

            self.console.line(format!(
                "{} of {} packages have been successfully installed on host {host}",
                updates.succeeded(),
                updates.updatable.len()
            ));
        }

        self.console.line(format!(
            "Packages to be installed: {}\n\
             Packages that must be installed manually: {}\n\
             Packages that have not been installed due to error: {}",
            updates.updatable.len(),
            updates.manual_only.len(),
            updates.failed.len()
        ));

        let finished_at = Local::now();
        self.console.line(format!(
            "Update finish time: {} on host {host}",
            finished_at.format(TIMESTAMP_FORMAT)
        ));

        let mut dispatched = Vec::new();
        let mut undelivered = Vec::new();
        for (category, packages) in [
            (Category::ManualRequired, &updates.manual_only),
            (Category::InstallFailed, &updates.failed),
        ] {
            if packages.is_empty() {
                continue;
            }

            let report = Report::new(finished_at, host.clone(), category, packages.clone());
            dispatched.push(category);

            if let DispatchOutcome::Undelivered { primary, secondary } =
                self.dispatcher.notify(&report).await
            {
                self.console.line(format!(
                    "Report ({category}) could not be delivered: {primary}; fallback: {secondary}"
                ));
                undelivered.push(category);
            }
        }

        Ok(RunSummary {
            started_at,
            finished_at,
            updates,
            dispatched,
            undelivered,
        })
    }
}
