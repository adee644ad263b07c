//! Test fixtures shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;
use shared::evaluator::AlertRule;
use shared::models::ProductInput;
use stockmonitor_backend::config::{
    AlertsConfig, AuthConfig, Config, DatabaseConfig, LoggingConfig, MailConfig, ServerConfig,
};
use stockmonitor_backend::external::{MailError, Mailer, OutgoingMail};
use stockmonitor_backend::middleware::{AuthUser, Claims};
use stockmonitor_backend::services::NotificationDispatcher;
use stockmonitor_backend::store::MemoryStore;
use stockmonitor_backend::AppState;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";
pub const SENDER: &str = "alerts@example.com";

/// Mailer that keeps every message instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Refuse every message from now on
    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Smtp("relay refused connection".to_string()));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://localhost/unused".to_string(),
            max_connections: 1,
            min_connections: 0,
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
        },
        mail: MailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            username: None,
            password: None,
            from: None,
        },
        alerts: AlertsConfig {
            notify_on_edit: true,
            batch_rule: AlertRule::Legacy,
        },
        logging: LoggingConfig::default(),
    }
}

/// Everything a test needs to drive the app and inspect side effects
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

/// App with a working (recording) relay
pub fn test_app() -> TestApp {
    test_app_with(test_config(), true)
}

/// App whose relay credentials are missing
pub fn test_app_without_mail() -> TestApp {
    test_app_with(test_config(), false)
}

pub fn test_app_with(config: Config, mail_configured: bool) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher = if mail_configured {
        NotificationDispatcher::new(mailer.clone(), SENDER)
    } else {
        NotificationDispatcher::unconfigured()
    };

    TestApp {
        state: AppState::new(config, store.clone(), dispatcher),
        store,
        mailer,
    }
}

pub fn user() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        email: "owner@example.com".to_string(),
    }
}

/// Bearer token for `user`, valid for an hour
pub fn bearer(user: &AuthUser) -> String {
    let claims = Claims {
        sub: user.user_id.to_string(),
        email: user.email.clone(),
        exp: Utc::now().timestamp() + 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}

pub fn product_input(name: &str, price: &str, stock: i32) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        category: None,
        price: price.parse::<Decimal>().unwrap(),
        stock_quantity: stock,
        expiry_date: None,
        low_stock_threshold: 50,
        expiry_alert_days: 20,
        procurement_price: None,
    }
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}
