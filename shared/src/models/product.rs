//! Product catalog models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::types::empty_as_none;

/// Low-stock threshold applied when a product does not carry its own
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 50;

/// Expiry alert lead time (days) applied when a product does not carry its own
pub const DEFAULT_EXPIRY_ALERT_DAYS: i32 = 20;

fn default_low_stock_threshold() -> i32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn default_expiry_alert_days() -> i32 {
    DEFAULT_EXPIRY_ALERT_DAYS
}

/// A product owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub expiry_date: Option<NaiveDate>,
    pub low_stock_threshold: i32,
    pub expiry_alert_days: i32,
    /// Total procurement cost for the current lot
    pub procurement_price: Option<Decimal>,
    /// Stock quantity at the time the lot was recorded
    pub lot_size: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Cost basis per unit of the current lot, when the procurement cost is known
    pub fn unit_cost(&self) -> Option<Decimal> {
        match (self.procurement_price, self.lot_size) {
            (Some(cost), Some(lot)) if lot > 0 => Some(cost / Decimal::from(lot)),
            _ => None,
        }
    }

    pub fn category_label(&self) -> &str {
        category_label(self.category.as_deref())
    }
}

/// Display label for an optional category
pub fn category_label(category: Option<&str>) -> &str {
    match category {
        Some(c) if !c.trim().is_empty() => c,
        _ => "No Category",
    }
}

/// Input for creating or updating a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,

    #[validate(custom = "crate::validation::money_amount")]
    pub price: Decimal,

    #[validate(range(min = 0, message = "Stock quantity must be a non-negative integer"))]
    pub stock_quantity: i32,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub expiry_date: Option<NaiveDate>,

    #[serde(default = "default_low_stock_threshold")]
    #[validate(range(min = 0, message = "Threshold must be a non-negative integer"))]
    pub low_stock_threshold: i32,

    #[serde(default = "default_expiry_alert_days")]
    #[validate(range(min = 0, message = "Days must be a non-negative integer"))]
    pub expiry_alert_days: i32,

    #[serde(default)]
    #[validate(custom = "crate::validation::money_amount")]
    pub procurement_price: Option<Decimal>,
}

impl ProductInput {
    /// Trim the name and drop blank categories before persisting
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self
    }

    /// Lot size mirrors the submitted stock quantity
    pub fn lot_size(&self) -> i32 {
        self.stock_quantity
    }

    /// Snapshot used for single-product alert evaluation
    pub fn alert_snapshot(&self) -> ProductAlertInput {
        ProductAlertInput {
            name: self.name.clone(),
            category: self.category.clone(),
            price: Some(self.price),
            stock_quantity: self.stock_quantity,
            expiry_date: self.expiry_date,
            low_stock_threshold: Some(self.low_stock_threshold),
            expiry_alert_days: Some(self.expiry_alert_days),
        }
    }
}

/// Product fields submitted to the alert trigger for a single product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ProductAlertInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,

    #[serde(default)]
    #[validate(custom = "crate::validation::money_amount")]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "Stock quantity must be a non-negative integer"))]
    pub stock_quantity: i32,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub expiry_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Threshold must be a non-negative integer"))]
    pub low_stock_threshold: Option<i32>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Days must be a non-negative integer"))]
    pub expiry_alert_days: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(procurement_price: Option<Decimal>, lot_size: Option<i32>) -> Product {
        Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Rice".to_string(),
            category: None,
            price: Decimal::from(20),
            stock_quantity: 10,
            expiry_date: None,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            expiry_alert_days: DEFAULT_EXPIRY_ALERT_DAYS,
            procurement_price,
            lot_size,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_unit_cost_from_lot() {
        let p = product(Some(Decimal::from(150)), Some(10));
        assert_eq!(p.unit_cost(), Some(Decimal::from(15)));
    }

    #[test]
    fn test_unit_cost_requires_positive_lot() {
        assert_eq!(product(Some(Decimal::from(150)), Some(0)).unit_cost(), None);
        assert_eq!(product(None, Some(10)).unit_cost(), None);
    }

    #[test]
    fn test_input_defaults_and_blank_fields() {
        let json = r#"{"name":" Milk ","category":"","price":"12.50",
            "stock_quantity":4,"expiry_date":""}"#;
        let input: ProductInput = serde_json::from_str(json).unwrap();
        let input = input.normalized();

        assert_eq!(input.name, "Milk");
        assert_eq!(input.category, None);
        assert_eq!(input.expiry_date, None);
        assert_eq!(input.low_stock_threshold, 50);
        assert_eq!(input.expiry_alert_days, 20);
        assert_eq!(input.lot_size(), 4);
    }

    #[test]
    fn test_input_validation() {
        let mut input: ProductInput = serde_json::from_str(
            r#"{"name":"Milk","price":1,"stock_quantity":4}"#,
        )
        .unwrap();
        assert!(input.validate().is_ok());

        input.stock_quantity = -1;
        input.price = Decimal::from(-2);
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("stock_quantity"));
        assert!(fields.contains_key("price"));
    }

    #[test]
    fn test_money_fields_match_column_range() {
        let mut input: ProductInput = serde_json::from_str(
            r#"{"name":"Milk","price":"79228162514264337593543950335","stock_quantity":4}"#,
        )
        .unwrap();
        input.procurement_price = Some(Decimal::new(12_345, 3));
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("procurement_price"));

        input.price = Decimal::new(999_999_999_999, 2);
        input.procurement_price = Some(Decimal::new(1_250, 2));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_alert_input_rejects_negative_levels() {
        let input: ProductAlertInput = serde_json::from_str(
            r#"{"name":"Milk","stock_quantity":-1,
                "low_stock_threshold":-5,"expiry_alert_days":-2}"#,
        )
        .unwrap();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("stock_quantity"));
        assert!(fields.contains_key("low_stock_threshold"));
        assert!(fields.contains_key("expiry_alert_days"));

        let input: ProductAlertInput =
            serde_json::from_str(r#"{"name":"Milk","stock_quantity":0}"#).unwrap();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_category_label() {
        assert_eq!(category_label(Some("Dairy")), "Dairy");
        assert_eq!(category_label(Some("  ")), "No Category");
        assert_eq!(category_label(None), "No Category");
    }
}
