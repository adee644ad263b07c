//! Transient alert models

use serde::{Deserialize, Serialize};

/// Kind of condition an alert reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    LowStock,
    Expiry,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LowStock => "LOW_STOCK",
            AlertKind::Expiry => "EXPIRY",
        }
    }
}

/// An alert computed on demand; never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    /// Names of the affected products
    pub items: Vec<String>,
}

impl Alert {
    pub fn low_stock(items: Vec<String>) -> Self {
        Self {
            kind: AlertKind::LowStock,
            message: format!("{} items are running low on stock.", items.len()),
            items,
        }
    }

    pub fn expiry(items: Vec<String>) -> Self {
        Self {
            kind: AlertKind::Expiry,
            message: format!("{} items are expiring soon.", items.len()),
            items,
        }
    }
}
