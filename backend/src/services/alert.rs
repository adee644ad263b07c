//! Alert service: evaluator, composer and dispatcher wired together
//!
//! Three triggers reach this service:
//! - a batch check over all of a user's products,
//! - a single-product notice after a product is saved,
//! - the daily batch, which runs at most once per calendar day per user.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use shared::composer::{compose_batch, compose_single, current_alerts, ComposedAlert};
use shared::evaluator::AlertRule;
use shared::models::{Alert, ProductAlertInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::NotificationDispatcher;
use crate::store::{AlertRunStore, ProductStore};

/// Result of an alert trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlertOutcome {
    /// A message was delivered
    Sent { subject: String, alerts: Vec<Alert> },
    /// Nothing met an alert condition; no message was built
    NoAlertNeeded,
    /// The daily batch already ran today for this user
    AlreadyRanToday { date: NaiveDate },
}

impl AlertOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            AlertOutcome::Sent { .. } => "sent",
            AlertOutcome::NoAlertNeeded => "no_alert_needed",
            AlertOutcome::AlreadyRanToday { .. } => "already_ran_today",
        }
    }
}

/// Runs alert checks for one user at a time
#[derive(Clone)]
pub struct AlertService {
    products: Arc<dyn ProductStore>,
    alert_runs: Arc<dyn AlertRunStore>,
    dispatcher: NotificationDispatcher,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl AlertService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        alert_runs: Arc<dyn AlertRunStore>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            products,
            alert_runs,
            dispatcher,
            today: local_today,
        }
    }

    /// Replace the source of "today"
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    // =========================================================================
    // Batch
    // =========================================================================

    /// Alerts that currently hold for the user's products, without sending
    pub async fn current_alerts(&self, user_id: Uuid, rule: AlertRule) -> AppResult<Vec<Alert>> {
        let products = self.products.list_products(user_id).await?;
        Ok(current_alerts(&products, (self.today)(), rule))
    }

    /// Evaluate every product the user owns and mail one summary
    pub async fn send_batch(&self, user: &AuthUser, rule: AlertRule) -> AppResult<AlertOutcome> {
        let products = self.products.list_products(user.user_id).await?;
        let today = (self.today)();

        match compose_batch(&products, today, rule) {
            Some(composed) => self.deliver(user, composed).await,
            None => {
                tracing::debug!(user_id = %user.user_id, rule = rule.as_str(), "No alerts to send");
                Ok(AlertOutcome::NoAlertNeeded)
            }
        }
    }

    // =========================================================================
    // Single product
    // =========================================================================

    /// Notice for one product that was just created or edited
    pub async fn send_single(
        &self,
        user: &AuthUser,
        product: &ProductAlertInput,
    ) -> AppResult<AlertOutcome> {
        match compose_single(product, (self.today)()) {
            Some(composed) => self.deliver(user, composed).await,
            None => Ok(AlertOutcome::NoAlertNeeded),
        }
    }

    // =========================================================================
    // Daily
    // =========================================================================

    /// Batch check that runs at most once per calendar day per user
    ///
    /// The day is claimed before evaluating. A failed run releases the claim
    /// so the next dashboard visit retries.
    pub async fn send_daily(&self, user: &AuthUser, rule: AlertRule) -> AppResult<AlertOutcome> {
        let today = (self.today)();

        if !self.alert_runs.claim_daily_run(user.user_id, today).await? {
            tracing::debug!(user_id = %user.user_id, %today, "Daily alert already ran");
            return Ok(AlertOutcome::AlreadyRanToday { date: today });
        }

        match self.send_batch(user, rule).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let released = self.alert_runs.release_daily_run(user.user_id, today).await;
                if let Err(release_err) = released {
                    tracing::warn!(
                        user_id = %user.user_id,
                        error = %release_err,
                        "Failed to release daily alert claim"
                    );
                }
                Err(err)
            }
        }
    }

    async fn deliver(&self, user: &AuthUser, composed: ComposedAlert) -> AppResult<AlertOutcome> {
        self.dispatcher.dispatch(&user.email, &composed).await?;
        Ok(AlertOutcome::Sent {
            subject: composed.subject,
            alerts: composed.alerts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_status_strings() {
        assert_eq!(AlertOutcome::NoAlertNeeded.status(), "no_alert_needed");
        let sent = AlertOutcome::Sent {
            subject: "s".to_string(),
            alerts: vec![],
        };
        assert_eq!(sent.status(), "sent");

        let json = serde_json::to_value(&sent).unwrap();
        assert_eq!(json["status"], "sent");
    }
}
