//! Threshold evaluation for low-stock and expiring-soon status
//!
//! Two rules coexist:
//! - [`AlertRule::Configurable`] reads each product's own threshold and lead
//!   time, falling back to 50 units and 20 days.
//! - [`AlertRule::Legacy`] applies a fixed 10-unit threshold and a 7-day
//!   expiry window to every product.
//!
//! All functions are pure; "today" is supplied by the caller as a calendar date.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{
    Product, ProductAlertInput, DEFAULT_EXPIRY_ALERT_DAYS, DEFAULT_LOW_STOCK_THRESHOLD,
};

/// Fixed low-stock threshold of the legacy rule
pub const LEGACY_LOW_STOCK_THRESHOLD: i32 = 10;

/// Fixed expiry window (days) of the legacy rule
pub const LEGACY_EXPIRY_WINDOW_DAYS: i32 = 7;

/// Stock figures the evaluator reads from a product-like record
pub trait StockLevels {
    fn stock_quantity(&self) -> i32;
    fn expiry_date(&self) -> Option<NaiveDate>;
    fn low_stock_threshold(&self) -> Option<i32>;
    fn expiry_alert_days(&self) -> Option<i32>;
}

impl StockLevels for Product {
    fn stock_quantity(&self) -> i32 {
        self.stock_quantity
    }

    fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    fn low_stock_threshold(&self) -> Option<i32> {
        Some(self.low_stock_threshold)
    }

    fn expiry_alert_days(&self) -> Option<i32> {
        Some(self.expiry_alert_days)
    }
}

impl StockLevels for ProductAlertInput {
    fn stock_quantity(&self) -> i32 {
        self.stock_quantity
    }

    fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    fn low_stock_threshold(&self) -> Option<i32> {
        self.low_stock_threshold
    }

    fn expiry_alert_days(&self) -> Option<i32> {
        self.expiry_alert_days
    }
}

/// Which thresholds an evaluation applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertRule {
    /// Fixed 10 units / 7 days for every product
    #[default]
    Legacy,
    /// Per-product threshold and lead time, defaulting to 50 units / 20 days
    Configurable,
}

impl AlertRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertRule::Legacy => "legacy",
            AlertRule::Configurable => "configurable",
        }
    }

    /// Effective low-stock threshold for an item under this rule
    pub fn low_stock_threshold<T: StockLevels + ?Sized>(&self, item: &T) -> i32 {
        match self {
            AlertRule::Legacy => LEGACY_LOW_STOCK_THRESHOLD,
            AlertRule::Configurable => item
                .low_stock_threshold()
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
        }
    }

    /// Effective expiry lead time (days) for an item under this rule
    pub fn expiry_window_days<T: StockLevels + ?Sized>(&self, item: &T) -> i32 {
        match self {
            AlertRule::Legacy => LEGACY_EXPIRY_WINDOW_DAYS,
            AlertRule::Configurable => item
                .expiry_alert_days()
                .unwrap_or(DEFAULT_EXPIRY_ALERT_DAYS),
        }
    }
}

/// Outcome of evaluating one item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub low_stock: bool,
    pub expiring_soon: bool,
}

impl Evaluation {
    pub fn needs_alert(&self) -> bool {
        self.low_stock || self.expiring_soon
    }
}

/// Stock is strictly below the effective threshold
pub fn is_low_stock<T: StockLevels + ?Sized>(item: &T, rule: AlertRule) -> bool {
    item.stock_quantity() < rule.low_stock_threshold(item)
}

/// Expiry date lies in `[today, today + lead days]`, both ends inclusive
pub fn is_expiring_soon<T: StockLevels + ?Sized>(
    item: &T,
    today: NaiveDate,
    rule: AlertRule,
) -> bool {
    let Some(expiry) = item.expiry_date() else {
        return false;
    };
    if expiry < today {
        return false;
    }

    let lead_days = rule.expiry_window_days(item).max(0) as u64;
    match today.checked_add_days(Days::new(lead_days)) {
        Some(window_end) => expiry <= window_end,
        // Window runs past the representable calendar
        None => true,
    }
}

/// Evaluate both conditions for one item
pub fn evaluate<T: StockLevels + ?Sized>(
    item: &T,
    today: NaiveDate,
    rule: AlertRule,
) -> Evaluation {
    Evaluation {
        low_stock: is_low_stock(item, rule),
        expiring_soon: is_expiring_soon(item, today, rule),
    }
}
