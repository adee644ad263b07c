//! Common types used across the platform

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::models::DailyRevenue;

/// Treat a missing or blank string as `None`, otherwise parse it.
///
/// Form posts send `""` for untouched optional fields.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// Dashboard overview for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub total_products: i64,
    pub total_sales: i64,
    pub low_stock_count: usize,
    /// Revenue per day over the trailing window, oldest first
    pub revenue_by_day: Vec<DailyRevenue>,
    pub revenue_total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "empty_as_none")]
        date: Option<NaiveDate>,
    }

    #[test]
    fn test_empty_as_none() {
        let blank: Form = serde_json::from_str(r#"{"date":""}"#).unwrap();
        assert_eq!(blank.date, None);

        let missing: Form = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.date, None);

        let null: Form = serde_json::from_str(r#"{"date":null}"#).unwrap();
        assert_eq!(null.date, None);

        let set: Form = serde_json::from_str(r#"{"date":"2024-02-29"}"#).unwrap();
        assert_eq!(set.date, NaiveDate::from_ymd_opt(2024, 2, 29));

        assert!(serde_json::from_str::<Form>(r#"{"date":"tomorrow"}"#).is_err());
    }
}
