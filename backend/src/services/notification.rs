//! Notification dispatcher: delivers composed alerts to the acting user
//!
//! The relay is resolved once at startup. A dispatcher built without one
//! rejects every dispatch with [`AppError::MissingMailCredentials`] before
//! any message is built or any connection is opened.

use std::sync::Arc;

use shared::composer::ComposedAlert;
use shared::validation::validate_email;

use crate::config::MailCredentials;
use crate::error::{AppError, AppResult};
use crate::external::{Mailer, OutgoingMail, SmtpMailer};

/// Sends alert mail through the configured relay
#[derive(Clone)]
pub struct NotificationDispatcher {
    relay: Option<Relay>,
}

#[derive(Clone)]
struct Relay {
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl NotificationDispatcher {
    /// Dispatcher delivering through `mailer` with `from` as sender
    pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>) -> Self {
        Self {
            relay: Some(Relay {
                mailer,
                from: from.into(),
            }),
        }
    }

    /// Dispatcher with no relay; every dispatch fails fast
    pub fn unconfigured() -> Self {
        Self { relay: None }
    }

    /// Build the SMTP-backed dispatcher, or an unconfigured one when the
    /// relay credentials are absent
    pub fn from_credentials(credentials: Option<&MailCredentials>) -> AppResult<Self> {
        match credentials {
            Some(creds) => {
                let mailer = SmtpMailer::new(creds)?;
                Ok(Self::new(Arc::new(mailer), creds.from.clone()))
            }
            None => Ok(Self::unconfigured()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.relay.is_some()
    }

    /// Deliver `alert` to `recipient`
    pub async fn dispatch(&self, recipient: &str, alert: &ComposedAlert) -> AppResult<()> {
        let relay = self.relay.as_ref().ok_or(AppError::MissingMailCredentials)?;

        validate_email(recipient).map_err(|message| AppError::Validation {
            field: "email".to_string(),
            message: message.to_string(),
        })?;

        let mail = OutgoingMail {
            from: relay.from.clone(),
            to: recipient.to_string(),
            subject: alert.subject.clone(),
            html: alert.body.clone(),
        };

        relay.mailer.send(&mail).await?;

        tracing::info!(to = %recipient, subject = %alert.subject, "Alert email sent");
        Ok(())
    }
}
