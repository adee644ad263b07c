//! External service integrations

pub mod mail;

pub use mail::{MailError, Mailer, OutgoingMail, SmtpMailer};
