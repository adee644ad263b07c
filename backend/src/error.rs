//! Error handling for StockMonitor
//!
//! Every failure reaches the caller as a JSON envelope with a stable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::validation::{field_issues, FieldIssue};
use thiserror::Error;
use uuid::Uuid;

use crate::external::MailError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation failed on {} field(s)", .0.len())]
    InvalidFields(Vec<FieldIssue>),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Insufficient stock: only {available} in stock, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    /// Sale row exists but the stock decrement did not happen
    #[error("Sale {sale_id} recorded but stock for product {product_id} was not updated: {reason}")]
    PartialWrite {
        sale_id: Uuid,
        product_id: Uuid,
        reason: String,
    },

    // Mail relay errors
    #[error("Mail relay credentials are not configured")]
    MissingMailCredentials,

    #[error("Mail delivery failed: {0}")]
    Delivery(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidFields(field_issues(&errors))
    }
}

impl From<MailError> for AppError {
    fn from(error: MailError) -> Self {
        match error {
            MailError::MissingCredentials => AppError::MissingMailCredentials,
            MailError::InvalidAddress(addr) => AppError::Validation {
                field: "email".to_string(),
                message: format!("Invalid email address: {}", addr),
            },
            MailError::Build(msg) | MailError::Smtp(msg) => AppError::Delivery(msg),
        }
    }
}

impl From<shared::StockShortfall> for AppError {
    fn from(shortfall: shared::StockShortfall) -> Self {
        AppError::InsufficientStock {
            available: shortfall.available,
            requested: shortfall.requested,
        }
    }
}

impl From<shared::AmountOutOfRange> for AppError {
    fn from(_: shared::AmountOutOfRange) -> Self {
        AppError::Validation {
            field: "quantity".to_string(),
            message: "Sale amount exceeds the largest storable value".to_string(),
        }
    }
}

impl AppError {
    /// Stable machine-readable code for the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Validation { .. } | AppError::InvalidFields(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::PartialWrite { .. } => "PARTIAL_WRITE",
            AppError::MissingMailCredentials => "MAIL_NOT_CONFIGURED",
            AppError::Delivery(_) => "MAIL_DELIVERY_FAILED",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation { .. } | AppError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MissingMailCredentials => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Delivery(_) => StatusCode::BAD_GATEWAY,
            AppError::PartialWrite { .. }
            | AppError::DatabaseError(_)
            | AppError::Internal(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = self.status();

        let detail = match &self {
            AppError::Unauthorized(msg) => ErrorDetail::new(code, msg.clone()),
            AppError::Validation { field, message } => ErrorDetail {
                field: Some(field.clone()),
                ..ErrorDetail::new(code, message.clone())
            },
            AppError::InvalidFields(issues) => ErrorDetail {
                field: issues.first().map(|i| i.field.clone()),
                details: serde_json::to_value(issues).ok(),
                ..ErrorDetail::new(
                    code,
                    issues
                        .first()
                        .map(|i| i.message.clone())
                        .unwrap_or_else(|| "Invalid input".to_string()),
                )
            },
            AppError::NotFound(resource) => {
                ErrorDetail::new(code, format!("{} not found", resource))
            }
            AppError::InsufficientStock {
                available,
                requested,
            } => ErrorDetail {
                field: Some("quantity".to_string()),
                details: Some(serde_json::json!({
                    "available": available,
                    "requested": requested,
                })),
                ..ErrorDetail::new(code, format!("Only {} items in stock!", available))
            },
            AppError::PartialWrite {
                sale_id,
                product_id,
                ..
            } => ErrorDetail {
                details: Some(serde_json::json!({
                    "sale_id": sale_id,
                    "product_id": product_id,
                })),
                ..ErrorDetail::new(
                    code,
                    "The sale was recorded but the stock level could not be updated. \
                     Please reconcile the product's stock manually.",
                )
            },
            AppError::MissingMailCredentials => ErrorDetail::new(
                code,
                "Email alerts are not configured: mail relay credentials are missing",
            ),
            AppError::Delivery(msg) => {
                ErrorDetail::new(code, format!("Failed to send email: {}", msg))
            }
            AppError::DatabaseError(_) => ErrorDetail::new(code, "A database error occurred"),
            AppError::Internal(msg) => ErrorDetail::new(code, msg.clone()),
            AppError::InternalError(_) => {
                ErrorDetail::new(code, "An internal server error occurred")
            }
        };

        // Log the error for debugging
        match &self {
            AppError::PartialWrite { .. } => {
                tracing::error!(
                    error = %self,
                    "Data left inconsistent, manual reconciliation required"
                )
            }
            _ if status.is_server_error() => tracing::error!("Error: {:?}", self),
            _ => tracing::debug!("Request rejected: {}", self),
        }

        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
