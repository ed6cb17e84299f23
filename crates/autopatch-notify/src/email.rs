//! SMTP mail fallback channel

use async_trait::async_trait;
use lettre::address::{Address, Envelope};
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{debug, error, info, instrument, warn};

use crate::channel::{Channel, DeliveryOutcome};
use crate::error::NotifyError;
use crate::report::Report;

/// A plain-text mail, rendered once per report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    /// Display name on the `From` header (the hostname)
    pub from_name: String,
    /// Envelope and header sender address
    pub from_address: String,
    /// Every recipient, shown on the `To` header
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Low-level mail session
///
/// Split out so the per-recipient policy in [`EmailChannel`] can be tested
/// without a mail server.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Check that the server accepts connections
    async fn test_connection(&self) -> Result<(), NotifyError>;

    /// Send `mail` to exactly one envelope recipient
    async fn send(&self, recipient: &str, mail: &Mail) -> Result<(), NotifyError>;
}

/// Secondary channel: mails the report to each recipient in turn
///
/// The first recipient failure abandons the remaining recipients.
pub struct EmailChannel<T> {
    transport: T,
    recipients: Vec<String>,
    from_address: String,
}

impl<T: MailTransport> EmailChannel<T> {
    pub fn new(transport: T, recipients: Vec<String>, from_address: impl Into<String>) -> Self {
        Self {
            transport,
            recipients,
            from_address: from_address.into(),
        }
    }

    /// Render the mail for a report
    #[must_use]
    pub fn compose(&self, report: &Report) -> Mail {
        Mail {
            from_name: report.hostname.clone(),
            from_address: self.from_address.clone(),
            to: self.recipients.clone(),
            subject: report.subject(),
            body: report.body(),
        }
    }

    async fn send_all(&self, report: &Report) -> Result<(), NotifyError> {
        self.transport.test_connection().await?;

        let mail = self.compose(report);
        for recipient in &self.recipients {
            if let Err(e) = self.transport.send(recipient, &mail).await {
                error!(recipient = %recipient, error = %e, "cannot send report by mail");
                return Err(e);
            }
            info!(recipient = %recipient, "report sent by mail");
        }

        Ok(())
    }
}

#[async_trait]
impl<T: MailTransport> Channel for EmailChannel<T> {
    #[instrument(skip_all, fields(category = %report.category))]
    async fn deliver(&self, report: &Report) -> DeliveryOutcome {
        let result = self.send_all(report).await;
        if let Err(e) = &result {
            warn!(error = %e, "mail delivery failed");
        }
        result.into()
    }

    fn name(&self) -> &'static str {
        "email"
    }
}

/// `MailTransport` over an unauthenticated SMTP session
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    server: String,
}

impl SmtpMailer {
    /// Create a mailer for `host:port`
    ///
    /// No connection is made until the first send.
    #[must_use]
    pub fn new(host: &str, port: u16) -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Self {
            transport,
            server: format!("{host}:{port}"),
        }
    }

    fn parse_address(address: &str) -> Result<Address, NotifyError> {
        address.trim().parse().map_err(|e: lettre::address::AddressError| {
            NotifyError::Address {
                address: address.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Render the message for one envelope
    ///
    /// The `To` header is informational: entries that do not parse are left
    /// out of it, and only the envelope recipient has to be valid.
    fn build_message(mail: &Mail, envelope: &Envelope) -> Result<Vec<u8>, NotifyError> {
        let from = Mailbox::new(
            Some(mail.from_name.clone()),
            Self::parse_address(&mail.from_address)?,
        );

        let mut builder = Message::builder()
            .from(from)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .envelope(envelope.clone());
        for to in &mail.to {
            match Self::parse_address(to) {
                Ok(address) => builder = builder.to(Mailbox::new(None, address)),
                Err(e) => debug!(error = %e, "address left out of To header"),
            }
        }

        let message = builder
            .body(mail.body.clone())
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        Ok(message.formatted())
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn test_connection(&self) -> Result<(), NotifyError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(NotifyError::SmtpUnreachable {
                server: self.server.clone(),
                message: "server did not answer NOOP".to_string(),
            }),
            Err(e) => Err(NotifyError::SmtpUnreachable {
                server: self.server.clone(),
                message: e.to_string(),
            }),
        }
    }

    async fn send(&self, recipient: &str, mail: &Mail) -> Result<(), NotifyError> {
        let envelope = Envelope::new(
            Some(Self::parse_address(&mail.from_address)?),
            vec![Self::parse_address(recipient)?],
        )
        .map_err(|e| NotifyError::Message(e.to_string()))?;
        let raw = Self::build_message(mail, &envelope)?;

        self.transport
            .send_raw(&envelope, &raw)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Recipient {
                recipient: recipient.to_string(),
                message: e.to_string(),
            })
    }
}
