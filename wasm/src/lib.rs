//! WebAssembly module for StockMonitor
//!
//! Provides client-side computation for:
//! - Low-stock and expiry previews on the product form
//! - Sale total and profit on the sale form
//! - Stock checks before a sale is submitted

use chrono::NaiveDate;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::evaluator::*;
pub use shared::models::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("stockmonitor-wasm loaded"));
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, String> {
    raw.trim()
        .parse::<NaiveDate>()
        .map_err(|e| format!("Invalid {} '{}': {}", field, raw, e))
}

fn parse_decimal(raw: &str, field: &str) -> Result<Decimal, String> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| format!("Invalid {} '{}': {}", field, raw, e))
}

fn parse_rule(raw: &str) -> Result<AlertRule, String> {
    match raw.trim() {
        "" | "configurable" => Ok(AlertRule::Configurable),
        "legacy" => Ok(AlertRule::Legacy),
        other => Err(format!("Unknown alert rule '{}'", other)),
    }
}

/// Today's date from the browser clock, local time
fn browser_today() -> Result<NaiveDate, String> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| "Browser clock returned an invalid date".to_string())
}

fn resolve_today(today: Option<String>) -> Result<NaiveDate, String> {
    match today.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_date(raw, "today"),
        _ => browser_today(),
    }
}

fn evaluate_json(product_json: &str, today: NaiveDate, rule: &str) -> Result<String, String> {
    let product: ProductAlertInput = serde_json::from_str(product_json)
        .map_err(|e| format!("Invalid product JSON: {}", e))?;
    let evaluation = evaluate(&product, today, parse_rule(rule)?);
    serde_json::to_string(&evaluation).map_err(|e| e.to_string())
}

fn sale_total_string(price: &str, quantity: i32) -> Result<String, String> {
    let price = parse_decimal(price, "price")?;
    sale_total(price, quantity)
        .map(|total| total.round_dp(2).to_string())
        .map_err(|e| format!("Invalid sale: {}", e))
}

fn sale_profit_string(
    total_price: &str,
    procurement_price: &str,
    lot_size: i32,
    quantity: i32,
) -> Result<Option<String>, String> {
    if procurement_price.trim().is_empty() || lot_size <= 0 {
        return Ok(None);
    }
    let total = parse_decimal(total_price, "total price")?;
    let cost = parse_decimal(procurement_price, "procurement price")?;
    let unit_cost = cost
        .checked_div(Decimal::from(lot_size))
        .ok_or_else(|| "Invalid procurement price".to_string())?;
    sale_profit(total, Some(unit_cost), quantity)
        .map(|profit| profit.map(|p| p.to_string()))
        .map_err(|e| format!("Invalid sale: {}", e))
}

/// Whether a stock level is below its threshold (50 when none is given)
#[wasm_bindgen]
pub fn check_low_stock(stock_quantity: i32, low_stock_threshold: Option<i32>) -> bool {
    let item = ProductAlertInput {
        name: String::new(),
        category: None,
        price: None,
        stock_quantity,
        expiry_date: None,
        low_stock_threshold,
        expiry_alert_days: None,
    };
    is_low_stock(&item, AlertRule::Configurable)
}

/// Whether an expiry date (`YYYY-MM-DD`) falls within the alert window
///
/// `today` defaults to the browser's local date when omitted.
#[wasm_bindgen]
pub fn check_expiring_soon(
    expiry_date: &str,
    expiry_alert_days: Option<i32>,
    today: Option<String>,
) -> Result<bool, JsValue> {
    let inner = || -> Result<bool, String> {
        if expiry_date.trim().is_empty() {
            return Ok(false);
        }
        let item = ProductAlertInput {
            name: String::new(),
            category: None,
            price: None,
            stock_quantity: 0,
            expiry_date: Some(parse_date(expiry_date, "expiry date")?),
            low_stock_threshold: None,
            expiry_alert_days,
        };
        Ok(is_expiring_soon(&item, resolve_today(today)?, AlertRule::Configurable))
    };
    inner().map_err(|e| JsValue::from_str(&e))
}

/// Evaluate a product form and return `{"low_stock":..,"expiring_soon":..}`
#[wasm_bindgen]
pub fn evaluate_product(
    product_json: &str,
    rule: &str,
    today: Option<String>,
) -> Result<String, JsValue> {
    resolve_today(today)
        .and_then(|day| evaluate_json(product_json, day, rule))
        .map_err(|e| JsValue::from_str(&e))
}

/// Sale total for the sale form, as a decimal string
#[wasm_bindgen]
pub fn calculate_sale_total(price: &str, quantity: i32) -> Result<String, JsValue> {
    sale_total_string(price, quantity).map_err(|e| JsValue::from_str(&e))
}

/// Profit of a sale over the lot cost, or `undefined` when the cost is unknown
#[wasm_bindgen]
pub fn calculate_sale_profit(
    total_price: &str,
    procurement_price: &str,
    lot_size: i32,
    quantity: i32,
) -> Result<Option<String>, JsValue> {
    sale_profit_string(total_price, procurement_price, lot_size, quantity)
        .map_err(|e| JsValue::from_str(&e))
}

/// Message to show when a sale quantity exceeds stock, if it does
#[wasm_bindgen]
pub fn stock_shortfall_message(available: i32, requested: i32) -> Option<String> {
    if requested < 1 {
        return Some("Quantity must be a positive integer".to_string());
    }
    check_stock(available, requested)
        .err()
        .map(|s| format!("Only {} items in stock!", s.available))
}
