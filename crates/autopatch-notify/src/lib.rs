//! autopatch-notify: Run report delivery
//!
//! Builds per-category reports and delivers them to a Slack-compatible
//! webhook, falling back to SMTP mail when the webhook does not accept them.

pub mod channel;
pub mod dispatcher;
pub mod email;
pub mod error;
pub mod report;
pub mod slack;

pub use channel::{Channel, DeliveryOutcome};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use email::{EmailChannel, Mail, MailTransport, SmtpMailer};
pub use error::NotifyError;
pub use report::{Category, Report};
pub use slack::SlackWebhook;
