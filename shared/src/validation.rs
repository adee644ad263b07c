//! Validation utilities shared by the backend and the browser bindings

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

/// Largest amount a `NUMERIC(12, 2)` money column holds
pub const MAX_MONEY_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Decimal places kept for money amounts
pub const MONEY_SCALE: u32 = 2;

fn money_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

/// Reject negative prices and costs
pub fn non_negative_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(money_error("non_negative", "Must be a valid non-negative number"));
    }
    Ok(())
}

/// Prices and costs: non-negative, at most two decimal places, and within
/// what the money columns store
pub fn money_amount(value: &Decimal) -> Result<(), ValidationError> {
    non_negative_decimal(value)?;
    if value.normalize().scale() > MONEY_SCALE {
        return Err(money_error("money_scale", "Must have at most 2 decimal places"));
    }
    if *value > MAX_MONEY_AMOUNT {
        return Err(money_error("money_range", "Must not exceed 9999999999.99"));
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && email.len() >= 5 => {
            Ok(())
        }
        _ => Err("Invalid email format"),
    }
}

/// One invalid input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Flatten validator output into per-field messages, ordered by field name
pub fn field_issues(errors: &ValidationErrors) -> Vec<FieldIssue> {
    let mut issues: Vec<FieldIssue> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldIssue {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", e.code)),
            })
        })
        .collect();
    issues.sort_by(|a, b| a.field.cmp(&b.field));
    issues
}
