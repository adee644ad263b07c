//! Outbound email through an SMTP relay
//!
//! A thin abstraction over [lettre](https://lettre.rs). The relay is
//! configured once at startup from [`MailCredentials`]; handlers never read
//! the environment.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::config::MailCredentials;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay credentials are not configured")]
    MissingCredentials,

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// A fully addressed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    /// HTML body
    pub html: String,
}

/// Delivery seam between the dispatcher and the relay
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// lettre-backed SMTP relay client
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build a STARTTLS transport for the configured relay
    pub fn new(credentials: &MailCredentials) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&credentials.host)
            .map_err(|e| MailError::Smtp(e.to_string()))?
            .port(credentials.port)
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build();

        Ok(Self { transport })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse::<Mailbox>()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}

/// Convert an [`OutgoingMail`] into a lettre message
pub fn build_message(mail: &OutgoingMail) -> Result<Message, MailError> {
    Message::builder()
        .from(mailbox(&mail.from)?)
        .to(mailbox(&mail.to)?)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(mail.html.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = build_message(mail)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            from: "alerts@example.com".to_string(),
            to: to.to_string(),
            subject: "StockMonitor Alert: 1 Low Stock, 0 Expiring".to_string(),
            html: "<h2>StockMonitor Alert Summary</h2>".to_string(),
        }
    }

    #[test]
    fn test_build_message_formats_html() {
        let message = build_message(&mail("owner@example.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("To: owner@example.com"));
        assert!(raw.contains("Content-Type: text/html"));
        assert!(raw.contains("Subject: StockMonitor Alert: 1 Low Stock, 0 Expiring"));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let err = build_message(&mail("not an address")).unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress(_)));
    }
}
