//! Slack-compatible incoming webhook

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::channel::{Channel, DeliveryOutcome};
use crate::error::NotifyError;
use crate::report::Report;

/// Primary channel: posts the report as a webhook attachment
#[derive(Debug, Clone)]
pub struct SlackWebhook {
    client: Client,
    url: Url,
}

impl SlackWebhook {
    /// Create a webhook channel with a default `reqwest::Client`
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self::with_client(url, Client::new())
    }

    /// Create a webhook channel with a custom `reqwest::Client`
    #[must_use]
    pub fn with_client(url: Url, client: Client) -> Self {
        Self { client, url }
    }

    async fn post(&self, report: &Report) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&report.to_slack_payload())
            .send()
            .await?;

        // Only a plain 200 counts; Slack answers 200 "ok" on acceptance
        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, message });
        }

        Ok(())
    }
}

#[async_trait]
impl Channel for SlackWebhook {
    #[instrument(skip_all, fields(category = %report.category))]
    async fn deliver(&self, report: &Report) -> DeliveryOutcome {
        let result = self.post(report).await;
        match &result {
            Ok(()) => debug!("report posted to webhook"),
            Err(e) => warn!(error = %e, "webhook delivery failed"),
        }
        result.into()
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
