//! Delivery channel trait

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::report::Report;

/// Result of one delivery attempt on one channel
#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(NotifyError),
}

impl DeliveryOutcome {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

impl From<Result<(), NotifyError>> for DeliveryOutcome {
    fn from(result: Result<(), NotifyError>) -> Self {
        match result {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => DeliveryOutcome::Failed(e),
        }
    }
}

/// A transport that can carry a report
///
/// A single `deliver` call makes one attempt and never retries.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn deliver(&self, report: &Report) -> DeliveryOutcome;

    /// Short name of the channel for logs
    fn name(&self) -> &'static str;
}
