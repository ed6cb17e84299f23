//! Error types for autopatch-notify

use thiserror::Error;

/// Errors that can occur while delivering a report
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Webhook request could not be sent
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhook answered with something other than 200
    #[error("webhook returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Mail server could not be reached
    #[error("SMTP server {server} is unreachable: {message}")]
    SmtpUnreachable {
        /// `host:port` of the server
        server: String,
        /// Transport error
        message: String,
    },

    /// Mail server rejected or failed a single recipient
    #[error("cannot send message to {recipient}: {message}")]
    Recipient {
        /// Recipient that failed
        recipient: String,
        /// Transport error
        message: String,
    },

    /// Sender or recipient is not a valid mail address
    #[error("invalid mail address {address}: {message}")]
    Address {
        /// Offending address
        address: String,
        /// Parser message
        message: String,
    },

    /// Mail message could not be assembled
    #[error("cannot build mail message: {0}")]
    Message(String),
}

impl NotifyError {
    /// Check if the channel itself was unreachable rather than rejecting
    /// the report
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        match self {
            NotifyError::Http(e) => e.is_connect() || e.is_timeout(),
            NotifyError::SmtpUnreachable { .. } => true,
            _ => false,
        }
    }
}
