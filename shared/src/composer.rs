//! Alert composition: turns evaluator output into an email-ready summary

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::evaluator::{evaluate, AlertRule};
use crate::models::{category_label, Alert, Product, ProductAlertInput};

/// A rendered alert ready for dispatch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedAlert {
    pub subject: String,
    /// HTML body
    pub body: String,
    pub alerts: Vec<Alert>,
}

/// Products grouped by the condition they meet
#[derive(Debug, Default)]
pub struct AlertBuckets<'a> {
    pub low_stock: Vec<&'a Product>,
    pub expiring: Vec<&'a Product>,
}

impl<'a> AlertBuckets<'a> {
    pub fn is_empty(&self) -> bool {
        self.low_stock.is_empty() && self.expiring.is_empty()
    }

    /// Transient alert list, low stock first
    pub fn alerts(&self) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if !self.low_stock.is_empty() {
            alerts.push(Alert::low_stock(names(&self.low_stock)));
        }
        if !self.expiring.is_empty() {
            alerts.push(Alert::expiry(names(&self.expiring)));
        }
        alerts
    }
}

fn names(products: &[&Product]) -> Vec<String> {
    products.iter().map(|p| p.name.clone()).collect()
}

/// Evaluate every product and sort matches into buckets
pub fn bucket_products(
    products: &[Product],
    today: NaiveDate,
    rule: AlertRule,
) -> AlertBuckets<'_> {
    let mut buckets = AlertBuckets::default();
    for product in products {
        let eval = evaluate(product, today, rule);
        if eval.low_stock {
            buckets.low_stock.push(product);
        }
        if eval.expiring_soon {
            buckets.expiring.push(product);
        }
    }
    buckets
}

/// Current alerts for a product list without rendering a message
pub fn current_alerts(products: &[Product], today: NaiveDate, rule: AlertRule) -> Vec<Alert> {
    bucket_products(products, today, rule).alerts()
}

/// Batch summary across all products; `None` when nothing matches
pub fn compose_batch(
    products: &[Product],
    today: NaiveDate,
    rule: AlertRule,
) -> Option<ComposedAlert> {
    let buckets = bucket_products(products, today, rule);
    if buckets.is_empty() {
        return None;
    }

    let mut body = String::from("<h2>StockMonitor Alert Summary</h2>");

    if !buckets.low_stock.is_empty() {
        let _ = write!(
            body,
            "<h3 style=\"color: #dc2626;\">Low Stock Items{}</h3><ul>",
            threshold_caption(rule)
        );
        for p in &buckets.low_stock {
            let _ = write!(
                body,
                "<li><strong>{}</strong> ({}) - Remaining: <strong>{}</strong></li>",
                escape_html(&p.name),
                escape_html(p.category_label()),
                p.stock_quantity
            );
        }
        body.push_str("</ul>");
    }

    if !buckets.expiring.is_empty() {
        let _ = write!(
            body,
            "<h3 style=\"color: #d97706;\">Expiring Soon{}</h3><ul>",
            window_caption(rule)
        );
        for p in &buckets.expiring {
            let expiry = p.expiry_date.map(|d| d.to_string()).unwrap_or_default();
            let _ = write!(
                body,
                "<li><strong>{}</strong> ({}) - Expires: <strong>{}</strong></li>",
                escape_html(&p.name),
                escape_html(p.category_label()),
                expiry
            );
        }
        body.push_str("</ul>");
    }

    Some(ComposedAlert {
        subject: format!(
            "StockMonitor Alert: {} Low Stock, {} Expiring",
            buckets.low_stock.len(),
            buckets.expiring.len()
        ),
        body,
        alerts: buckets.alerts(),
    })
}

fn threshold_caption(rule: AlertRule) -> String {
    match rule {
        AlertRule::Legacy => format!(" (< {})", crate::evaluator::LEGACY_LOW_STOCK_THRESHOLD),
        AlertRule::Configurable => String::new(),
    }
}

fn window_caption(rule: AlertRule) -> String {
    match rule {
        AlertRule::Legacy => {
            format!(" (Next {} Days)", crate::evaluator::LEGACY_EXPIRY_WINDOW_DAYS)
        }
        AlertRule::Configurable => String::new(),
    }
}

const LOW_STOCK_COLOR: &str = "#dc2626";
const EXPIRY_COLOR: &str = "#d97706";

/// Inline style for the condition that triggered the notice
fn highlight(triggered: bool, color: &str) -> String {
    if triggered {
        format!(" style=\"color: {}; font-weight: bold;\"", color)
    } else {
        String::new()
    }
}

/// Notice for one created or edited product; `None` means no alert is needed
pub fn compose_single(product: &ProductAlertInput, today: NaiveDate) -> Option<ComposedAlert> {
    let rule = AlertRule::Configurable;
    let eval = evaluate(product, today, rule);
    if !eval.needs_alert() {
        return None;
    }

    let name = escape_html(&product.name);
    let mut body = format!("<h2>StockMonitor Alert: {}</h2>", name);
    let _ = write!(
        body,
        "<p><strong>{}</strong> ({})",
        name,
        escape_html(category_label(product.category.as_deref()))
    );
    if let Some(price) = product.price {
        let _ = write!(body, " - Price: {}", price);
    }
    body.push_str("</p><ul>");

    let mut alerts = Vec::new();
    let _ = write!(
        body,
        "<li{}>Stock: <strong>{}</strong> remaining (threshold {})</li>",
        highlight(eval.low_stock, LOW_STOCK_COLOR),
        product.stock_quantity,
        rule.low_stock_threshold(product)
    );
    if eval.low_stock {
        alerts.push(Alert::low_stock(vec![product.name.clone()]));
    }

    let expiry = match product.expiry_date {
        Some(date) => format!("Expires on <strong>{}</strong>", date),
        None => "No expiry date".to_string(),
    };
    let _ = write!(
        body,
        "<li{}>{} (alert window {} days)</li>",
        highlight(eval.expiring_soon, EXPIRY_COLOR),
        expiry,
        rule.expiry_window_days(product)
    );
    if eval.expiring_soon {
        alerts.push(Alert::expiry(vec![product.name.clone()]));
    }
    body.push_str("</ul>");

    Some(ComposedAlert {
        subject: format!("StockMonitor Alert: {}", product.name),
        body,
        alerts,
    })
}

/// Escape text for inclusion in an HTML body
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
