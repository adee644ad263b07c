//! HTTP handlers for alert endpoints

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::evaluator::AlertRule;
use shared::models::{Alert, ProductAlertInput};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::AlertOutcome;
use crate::AppState;

/// Optional rule override for batch checks
#[derive(Debug, Default, Deserialize)]
pub struct AlertRuleQuery {
    pub rule: Option<AlertRule>,
}

/// Body of the alert trigger; empty means a batch check
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAlertsRequest {
    pub new_product: Option<ProductAlertInput>,
}

/// Response of every alert trigger
#[derive(Debug, Serialize)]
pub struct AlertSendResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub alerts: Vec<Alert>,
}

impl From<AlertOutcome> for AlertSendResponse {
    fn from(outcome: AlertOutcome) -> Self {
        let status = outcome.status();
        match outcome {
            AlertOutcome::Sent { subject, alerts } => Self {
                status,
                message: "Email sent".to_string(),
                subject: Some(subject),
                date: None,
                alerts,
            },
            AlertOutcome::NoAlertNeeded => Self {
                status,
                message: "No alerts to send".to_string(),
                subject: None,
                date: None,
                alerts: Vec::new(),
            },
            AlertOutcome::AlreadyRanToday { date } => Self {
                status,
                message: "Daily alert check already ran today".to_string(),
                subject: None,
                date: Some(date),
                alerts: Vec::new(),
            },
        }
    }
}

fn parse_send_request(body: &Bytes) -> AppResult<SendAlertsRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SendAlertsRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::Validation {
        field: "newProduct".to_string(),
        message: format!("Invalid alert request: {}", e),
    })
}

/// Alerts that currently hold, without sending mail
pub async fn list_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<AlertRuleQuery>,
) -> AppResult<Json<Vec<Alert>>> {
    let rule = query.rule.unwrap_or(state.config.alerts.batch_rule);
    let alerts = state
        .alert_service()
        .current_alerts(current_user.0.user_id, rule)
        .await?;
    Ok(Json(alerts))
}

/// Alert trigger: batch check, or a single product when `newProduct` is given
pub async fn send_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<AlertRuleQuery>,
    body: Bytes,
) -> AppResult<Json<AlertSendResponse>> {
    let request = parse_send_request(&body)?;
    let service = state.alert_service();

    let outcome = match request.new_product {
        Some(product) => {
            product.validate()?;
            service.send_single(&current_user.0, &product).await?
        }
        None => {
            let rule = query.rule.unwrap_or(state.config.alerts.batch_rule);
            service.send_batch(&current_user.0, rule).await?
        }
    };

    Ok(Json(outcome.into()))
}

/// Daily batch check, at most once per calendar day per user
pub async fn send_daily_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<AlertRuleQuery>,
) -> AppResult<Json<AlertSendResponse>> {
    let rule = query.rule.unwrap_or(state.config.alerts.batch_rule);
    let outcome = state
        .alert_service()
        .send_daily(&current_user.0, rule)
        .await?;
    Ok(Json(outcome.into()))
}
