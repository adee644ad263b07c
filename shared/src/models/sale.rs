//! Sales models and the arithmetic behind a sale

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::validation::MAX_MONEY_AMOUNT;

/// A completed sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total_price: Decimal,
    pub profit: Option<Decimal>,
    pub sale_date: DateTime<Utc>,
}

/// A sale joined with the name of the product sold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentSale {
    pub id: Uuid,
    pub product_id: Uuid,
    /// `None` when the product has since been deleted
    pub product_name: Option<String>,
    pub quantity: i32,
    pub total_price: Decimal,
    pub profit: Option<Decimal>,
    pub sale_date: DateTime<Utc>,
}

/// Input for recording a sale
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordSaleInput {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,
}

/// Fields of a sale row about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total_price: Decimal,
    pub profit: Option<Decimal>,
}

/// Requested quantity exceeds what is on hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("only {available} items in stock, {requested} requested")]
pub struct StockShortfall {
    pub available: i32,
    pub requested: i32,
}

/// Check a requested quantity against current stock
pub fn check_stock(available: i32, requested: i32) -> Result<(), StockShortfall> {
    if requested > available {
        return Err(StockShortfall {
            available,
            requested,
        });
    }
    Ok(())
}

/// A sale amount that does not fit a money column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sale amount is out of range")]
pub struct AmountOutOfRange;

fn within_money_range(amount: Decimal) -> Result<Decimal, AmountOutOfRange> {
    if amount.abs() > MAX_MONEY_AMOUNT {
        return Err(AmountOutOfRange);
    }
    Ok(amount)
}

/// Total price of a sale at the current unit price
pub fn sale_total(unit_price: Decimal, quantity: i32) -> Result<Decimal, AmountOutOfRange> {
    let total = unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or(AmountOutOfRange)?;
    within_money_range(total)
}

/// Profit over the lot's cost basis, if one is known
pub fn sale_profit(
    total_price: Decimal,
    unit_cost: Option<Decimal>,
    quantity: i32,
) -> Result<Option<Decimal>, AmountOutOfRange> {
    let Some(cost) = unit_cost else {
        return Ok(None);
    };
    let profit = cost
        .checked_mul(Decimal::from(quantity))
        .and_then(|lot_cost| total_price.checked_sub(lot_cost))
        .ok_or(AmountOutOfRange)?;
    within_money_range(profit.round_dp(2)).map(Some)
}

/// Revenue for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub total: Decimal,
}

/// Sum sale totals per calendar day (UTC), oldest day first
pub fn revenue_by_day<'a, I>(sales: I) -> Vec<DailyRevenue>
where
    I: IntoIterator<Item = (&'a DateTime<Utc>, &'a Decimal)>,
{
    let mut grouped: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for (sold_at, total) in sales {
        *grouped.entry(sold_at.date_naive()).or_insert(Decimal::ZERO) += *total;
    }

    grouped
        .into_iter()
        .map(|(date, total)| DailyRevenue { date, total })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_sale_total() {
        assert_eq!(sale_total(dec("20.00"), 3), Ok(dec("60.00")));
        assert_eq!(sale_total(dec("0.99"), 0), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_sale_total_out_of_range() {
        assert_eq!(sale_total(Decimal::MAX, 2), Err(AmountOutOfRange));
        assert_eq!(sale_total(dec("9999999999.99"), 2), Err(AmountOutOfRange));
        assert_eq!(sale_total(dec("9999999999.99"), 1), Ok(dec("9999999999.99")));
    }

    #[test]
    fn test_sale_profit_out_of_range() {
        assert_eq!(sale_profit(dec("1"), Some(Decimal::MAX), 2), Err(AmountOutOfRange));
    }

    #[test]
    fn test_check_stock() {
        assert!(check_stock(10, 10).is_ok());
        assert!(check_stock(10, 3).is_ok());
        assert_eq!(
            check_stock(10, 11),
            Err(StockShortfall {
                available: 10,
                requested: 11
            })
        );
    }

    #[test]
    fn test_sale_profit() {
        assert_eq!(sale_profit(dec("60.00"), Some(dec("15")), 3), Ok(Some(dec("15.00"))));
        assert_eq!(sale_profit(dec("30.00"), Some(dec("15")), 3), Ok(Some(dec("-15.00"))));
        assert_eq!(sale_profit(dec("60.00"), None, 3), Ok(None));
    }

    #[test]
    fn test_revenue_by_day_groups_and_sorts() {
        let d1 = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let d1_late = Utc.with_ymd_and_hms(2024, 5, 2, 22, 30, 0).unwrap();
        let d0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let t1 = dec("10.50");
        let t2 = dec("4.50");
        let t0 = dec("7");

        let rows = vec![(&d1, &t1), (&d0, &t0), (&d1_late, &t2)];
        let revenue = revenue_by_day(rows);

        assert_eq!(revenue.len(), 2);
        assert_eq!(revenue[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(revenue[0].total, dec("7"));
        assert_eq!(revenue[1].total, dec("15.00"));
    }

    proptest! {
        #[test]
        fn prop_check_stock_accepts_only_what_is_on_hand(
            available in 0i32..1000,
            requested in 1i32..1000,
        ) {
            prop_assert_eq!(check_stock(available, requested).is_ok(), requested <= available);
        }

        #[test]
        fn prop_zero_cost_profit_equals_total(cents in 0i64..1_000_000, quantity in 1i32..100) {
            let total = Decimal::new(cents, 2);
            prop_assert_eq!(
                sale_profit(total, Some(Decimal::ZERO), quantity),
                Ok(Some(total.round_dp(2)))
            );
        }

        #[test]
        fn prop_sale_total_never_panics(
            lo in any::<u32>(),
            mid in any::<u32>(),
            hi in any::<u32>(),
            scale in 0u32..=28,
            quantity in any::<i32>(),
        ) {
            let price = Decimal::from_parts(lo, mid, hi, false, scale);
            if let Ok(total) = sale_total(price, quantity) {
                prop_assert!(total.abs() <= MAX_MONEY_AMOUNT);
            }
        }
    }
}
