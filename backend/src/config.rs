//! Configuration management for StockMonitor
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with STOCKMONITOR_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::evaluator::AlertRule;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Bearer token verification for the external auth provider
    pub auth: AuthConfig,

    /// Outbound mail relay
    pub mail: MailConfig,

    /// Alert triggering behaviour
    pub alerts: AlertsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 secret shared with the auth provider
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// SMTP relay host
    pub smtp_host: String,

    /// SMTP relay port (submission)
    pub smtp_port: u16,

    /// Relay account identity
    pub username: Option<String>,

    /// Relay credential (app password)
    pub password: Option<String>,

    /// Sender address; defaults to the relay account
    pub from: Option<String>,
}

/// Validated relay credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailCredentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl MailConfig {
    /// Resolve the relay credentials, or `None` when either secret is missing
    pub fn credentials(&self) -> Option<MailCredentials> {
        let username = self.username.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        let from = self
            .from
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(username);

        Some(MailCredentials {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: username.to_string(),
            password: password.to_string(),
            from: from.to_string(),
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertsConfig {
    /// Send a single-product alert when an existing product is edited
    pub notify_on_edit: bool,

    /// Rule used by batch and daily triggers when the caller names none
    pub batch_rule: AlertRule,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKMONITOR_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("mail.smtp_host", "smtp.gmail.com")?
            .set_default("mail.smtp_port", 587)?
            .set_default("alerts.notify_on_edit", true)?
            .set_default("alerts.batch_rule", "legacy")?
            .set_default("logging.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKMONITOR_ prefix)
            .add_source(
                Environment::with_prefix("STOCKMONITOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(username: Option<&str>, password: Option<&str>, from: Option<&str>) -> MailConfig {
        MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            from: from.map(str::to_string),
        }
    }

    #[test]
    fn test_credentials_require_both_secrets() {
        assert!(mail(None, Some("secret"), None).credentials().is_none());
        assert!(mail(Some("shop@example.com"), None, None).credentials().is_none());
        assert!(mail(Some("  "), Some("secret"), None).credentials().is_none());
        assert!(mail(Some("shop@example.com"), Some(""), None).credentials().is_none());
    }

    #[test]
    fn test_sender_defaults_to_account() {
        let creds = mail(Some("shop@example.com"), Some("secret"), None)
            .credentials()
            .unwrap();
        assert_eq!(creds.from, "shop@example.com");

        let creds = mail(Some("shop@example.com"), Some("secret"), Some("alerts@example.com"))
            .credentials()
            .unwrap();
        assert_eq!(creds.from, "alerts@example.com");
        assert_eq!(creds.port, 587);
    }
}
