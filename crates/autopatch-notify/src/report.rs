//! Report construction

use chrono::{DateTime, Local};
use serde::Serialize;

/// Console and report timestamp format
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// What a report is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Packages held back for a human (kernel, systemd, bootloader)
    ManualRequired,
    /// Packages whose automatic upgrade failed
    InstallFailed,
}

impl Category {
    /// Attachment colour hint
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Category::ManualRequired => "#3700ef",
            Category::InstallFailed => "#ef0000",
        }
    }

    fn count_line(self, count: usize) -> String {
        match self {
            Category::ManualRequired => {
                format!("\nThe following {count} updates must be installed manually:")
            }
            Category::InstallFailed => {
                format!("\nThe following {count} updates have not been installed due to errors:")
            }
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::ManualRequired => write!(f, "manual-required"),
            Category::InstallFailed => write!(f, "install-failed"),
        }
    }
}

/// One category's report for one run
#[derive(Debug, Clone)]
pub struct Report {
    pub timestamp: DateTime<Local>,
    pub hostname: String,
    pub category: Category,
    pub packages: Vec<String>,
}

impl Report {
    pub fn new(
        timestamp: DateTime<Local>,
        hostname: impl Into<String>,
        category: Category,
        packages: Vec<String>,
    ) -> Self {
        Self {
            timestamp,
            hostname: hostname.into(),
            category,
            packages,
        }
    }

    /// Body lines: time, host, count line, package list
    #[must_use]
    pub fn body_lines(&self) -> Vec<String> {
        vec![
            format!("Check time: {}", self.timestamp.format(TIMESTAMP_FORMAT)),
            format!("Server name: {}", self.hostname),
            self.category.count_line(self.packages.len()),
            self.packages.join("\n"),
        ]
    }

    #[must_use]
    pub fn body(&self) -> String {
        self.body_lines().join("\n")
    }

    /// Mail subject, taken from the count line
    #[must_use]
    pub fn subject(&self) -> String {
        self.category
            .count_line(self.packages.len())
            .trim()
            .to_string()
    }

    #[must_use]
    pub fn pretext(&self) -> String {
        format!(
            "Host: {} - {} updates have not been installed",
            self.hostname,
            self.packages.len()
        )
    }

    /// Webhook payload with the body as a preformatted block
    #[must_use]
    pub fn to_slack_payload(&self) -> SlackPayload {
        SlackPayload {
            attachments: vec![Attachment {
                pretext: self.pretext(),
                color: self.category.color().to_string(),
                title: self.hostname.clone(),
                text: format!("```{}```", self.body()),
                mrkdwn_in: vec!["text".to_string()],
            }],
        }
    }
}

/// Slack incoming-webhook message
#[derive(Debug, Clone, Serialize)]
pub struct SlackPayload {
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub pretext: String,
    pub color: String,
    pub title: String,
    pub text: String,
    pub mrkdwn_in: Vec<String>,
}
