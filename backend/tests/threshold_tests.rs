//! Threshold evaluator tests
//!
//! Property-based tests for:
//! - Low stock iff stock is strictly below the effective threshold
//! - Expiring soon iff the expiry date lies in [today, today + lead]
//! - The fixed rule ignores per-product settings

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use shared::evaluator::{
    evaluate, is_expiring_soon, is_low_stock, AlertRule, LEGACY_EXPIRY_WINDOW_DAYS,
    LEGACY_LOW_STOCK_THRESHOLD,
};
use shared::models::{ProductAlertInput, DEFAULT_EXPIRY_ALERT_DAYS, DEFAULT_LOW_STOCK_THRESHOLD};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn today_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

fn rule_strategy() -> impl Strategy<Value = AlertRule> {
    prop_oneof![Just(AlertRule::Legacy), Just(AlertRule::Configurable)]
}

fn item(
    stock: i32,
    threshold: Option<i32>,
    expiry: Option<NaiveDate>,
    lead: Option<i32>,
) -> ProductAlertInput {
    ProductAlertInput {
        name: "Item".to_string(),
        category: None,
        price: None,
        stock_quantity: stock,
        expiry_date: expiry,
        low_stock_threshold: threshold,
        expiry_alert_days: lead,
    }
}

fn shift(day: NaiveDate, offset: i64) -> NaiveDate {
    if offset >= 0 {
        day.checked_add_days(Days::new(offset as u64)).unwrap()
    } else {
        day.checked_sub_days(Days::new(offset.unsigned_abs())).unwrap()
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_low_stock_matches_configurable_threshold(
        stock in 0i32..1000,
        threshold in proptest::option::of(0i32..1000),
    ) {
        let effective = threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        prop_assert_eq!(
            is_low_stock(&item(stock, threshold, None, None), AlertRule::Configurable),
            stock < effective
        );
    }

    #[test]
    fn prop_legacy_threshold_is_fixed(
        stock in 0i32..1000,
        threshold in proptest::option::of(0i32..1000),
    ) {
        prop_assert_eq!(
            is_low_stock(&item(stock, threshold, None, None), AlertRule::Legacy),
            stock < LEGACY_LOW_STOCK_THRESHOLD
        );
    }

    #[test]
    fn prop_expiry_window_inclusive(
        today in today_strategy(),
        offset in -60i64..60,
        lead in proptest::option::of(0i32..45),
    ) {
        let expiry = shift(today, offset);
        let effective = lead.unwrap_or(DEFAULT_EXPIRY_ALERT_DAYS) as i64;
        prop_assert_eq!(
            is_expiring_soon(&item(100, None, Some(expiry), lead), today, AlertRule::Configurable),
            offset >= 0 && offset <= effective
        );
    }

    #[test]
    fn prop_legacy_window_is_seven_days(
        today in today_strategy(),
        offset in -30i64..30,
        lead in proptest::option::of(0i32..45),
    ) {
        let expiry = shift(today, offset);
        prop_assert_eq!(
            is_expiring_soon(&item(100, None, Some(expiry), lead), today, AlertRule::Legacy),
            offset >= 0 && offset <= LEGACY_EXPIRY_WINDOW_DAYS as i64
        );
    }

    #[test]
    fn prop_no_expiry_never_expiring(
        today in today_strategy(),
        lead in proptest::option::of(0i32..365),
        rule in rule_strategy(),
    ) {
        prop_assert!(!is_expiring_soon(&item(0, None, None, lead), today, rule));
    }

    #[test]
    fn prop_evaluate_agrees_with_predicates(
        today in today_strategy(),
        stock in 0i32..200,
        threshold in proptest::option::of(0i32..200),
        offset in proptest::option::of(-10i64..40),
        lead in proptest::option::of(0i32..30),
        rule in rule_strategy(),
    ) {
        let p = item(stock, threshold, offset.map(|o| shift(today, o)), lead);
        let eval = evaluate(&p, today, rule);
        prop_assert_eq!(eval.low_stock, is_low_stock(&p, rule));
        prop_assert_eq!(eval.expiring_soon, is_expiring_soon(&p, today, rule));
        prop_assert_eq!(eval.needs_alert(), eval.low_stock || eval.expiring_soon);
    }
}

// ============================================================================
// Worked examples
// ============================================================================

#[test]
fn test_documented_examples() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let rule = AlertRule::Configurable;

    assert!(is_low_stock(&item(5, Some(10), None, None), rule));
    assert!(!is_low_stock(&item(50, Some(50), None, None), rule));
    assert!(is_expiring_soon(&item(1, None, Some(shift(today, 20)), Some(20)), today, rule));
    assert!(!is_expiring_soon(&item(1, None, Some(shift(today, 21)), Some(20)), today, rule));
}

#[test]
fn test_leap_day_window() {
    let today = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
    let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    let rule = AlertRule::Configurable;

    assert!(is_expiring_soon(&item(1, None, Some(leap), Some(1)), today, rule));
    assert!(!is_expiring_soon(&item(1, None, Some(march), Some(1)), today, rule));
}
