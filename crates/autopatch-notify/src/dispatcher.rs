//! Primary/secondary report dispatch

use tracing::{error, info, instrument, warn};

use crate::channel::{Channel, DeliveryOutcome};
use crate::error::NotifyError;
use crate::report::Report;

/// How a single report ended up
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Primary channel accepted the report
    Primary,
    /// Primary failed, secondary delivered
    Fallback {
        /// Why the primary was skipped
        primary: NotifyError,
    },
    /// Neither channel delivered the report
    Undelivered {
        primary: NotifyError,
        secondary: NotifyError,
    },
}

impl DispatchOutcome {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        !matches!(self, DispatchOutcome::Undelivered { .. })
    }
}

/// Sends reports to the primary channel, falling back to the secondary
///
/// The secondary channel is attempted if and only if the primary attempt
/// did not succeed, within the same call.
pub struct Dispatcher {
    primary: Box<dyn Channel>,
    secondary: Box<dyn Channel>,
}

impl Dispatcher {
    pub fn new(primary: Box<dyn Channel>, secondary: Box<dyn Channel>) -> Self {
        Self { primary, secondary }
    }

    #[instrument(skip_all, fields(category = %report.category, packages = report.packages.len()))]
    pub async fn notify(&self, report: &Report) -> DispatchOutcome {
        let primary = match self.primary.deliver(report).await {
            DeliveryOutcome::Delivered => {
                info!(channel = self.primary.name(), "report delivered");
                return DispatchOutcome::Primary;
            }
            DeliveryOutcome::Failed(e) => e,
        };

        warn!(
            channel = self.primary.name(),
            fallback = self.secondary.name(),
            error = %primary,
            unreachable = primary.is_unreachable(),
            "primary channel failed, falling back"
        );

        match self.secondary.deliver(report).await {
            DeliveryOutcome::Delivered => {
                info!(channel = self.secondary.name(), "report delivered");
                DispatchOutcome::Fallback { primary }
            }
            DeliveryOutcome::Failed(secondary) => {
                error!(
                    channel = self.secondary.name(),
                    error = %secondary,
                    unreachable = secondary.is_unreachable(),
                    "report could not be delivered"
                );
                DispatchOutcome::Undelivered { primary, secondary }
            }
        }
    }
}
