//! Storage boundary
//!
//! Services depend on these traits rather than on a connection pool, so the
//! same logic runs against PostgreSQL in production and against
//! [`MemoryStore`] in tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::models::{NewSale, Product, ProductInput, RecentSale, Sale};
use uuid::Uuid;

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result of a conditional stock decrement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUpdate {
    /// Stock now holds this many units
    Updated(i32),
    /// Stock was below the requested quantity when the update ran
    Insufficient,
    /// No product row matched
    Missing,
}

/// Product rows, always scoped to their owner
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create_product(
        &self,
        user_id: Uuid,
        input: &ProductInput,
        lot_size: i32,
    ) -> AppResult<Product>;

    async fn get_product(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Option<Product>>;

    async fn update_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        input: &ProductInput,
        lot_size: i32,
    ) -> AppResult<Option<Product>>;

    /// Returns whether a row was deleted
    async fn delete_product(&self, user_id: Uuid, product_id: Uuid) -> AppResult<bool>;

    /// All of the owner's products, newest first
    async fn list_products(&self, user_id: Uuid) -> AppResult<Vec<Product>>;

    /// Products with stock above zero, ordered by name
    async fn list_in_stock(&self, user_id: Uuid) -> AppResult<Vec<Product>>;

    /// Subtract `quantity` only if at least that much is on hand
    async fn decrement_stock(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<StockUpdate>;

    async fn count_products(&self, user_id: Uuid) -> AppResult<i64>;

    /// Connectivity probe for health checks
    async fn ping(&self) -> AppResult<()>;
}

/// Sale rows, append-only
#[async_trait]
pub trait SaleStore: Send + Sync {
    async fn insert_sale(&self, sale: &NewSale) -> AppResult<Sale>;

    /// Sales joined with product names, newest first
    async fn recent_sales(&self, user_id: Uuid, limit: Option<i64>) -> AppResult<Vec<RecentSale>>;

    async fn count_sales(&self, user_id: Uuid) -> AppResult<i64>;

    /// `(sale_date, total_price)` for sales at or after `since`
    async fn sale_totals_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<(DateTime<Utc>, Decimal)>>;
}

/// Per-user record of the last day a daily alert ran
#[async_trait]
pub trait AlertRunStore: Send + Sync {
    /// Record `day` as the latest run. Returns `false` if a run for `day`
    /// (or later) was already recorded.
    async fn claim_daily_run(&self, user_id: Uuid, day: NaiveDate) -> AppResult<bool>;

    /// Forget a claim so a failed run can be retried the same day
    async fn release_daily_run(&self, user_id: Uuid, day: NaiveDate) -> AppResult<()>;
}
