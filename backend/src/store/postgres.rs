//! PostgreSQL implementation of the storage traits

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::models::{NewSale, Product, ProductInput, RecentSale, Sale};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{AlertRunStore, ProductStore, SaleStore, StockUpdate};
use crate::error::AppResult;

const PRODUCT_COLUMNS: &str = "id, user_id, name, category, price, stock_quantity, expiry_date, \
     low_stock_threshold, expiry_alert_days, procurement_price, lot_size, created_at, updated_at";

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Row for product queries
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    category: Option<String>,
    price: Decimal,
    stock_quantity: i32,
    expiry_date: Option<NaiveDate>,
    low_stock_threshold: i32,
    expiry_alert_days: i32,
    procurement_price: Option<Decimal>,
    lot_size: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            category: r.category,
            price: r.price,
            stock_quantity: r.stock_quantity,
            expiry_date: r.expiry_date,
            low_stock_threshold: r.low_stock_threshold,
            expiry_alert_days: r.expiry_alert_days,
            procurement_price: r.procurement_price,
            lot_size: r.lot_size,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Row for sale queries
#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    total_price: Decimal,
    profit: Option<Decimal>,
    sale_date: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
    fn from(r: SaleRow) -> Self {
        Sale {
            id: r.id,
            user_id: r.user_id,
            product_id: r.product_id,
            quantity: r.quantity,
            total_price: r.total_price,
            profit: r.profit,
            sale_date: r.sale_date,
        }
    }
}

/// Row for the recent-sales join
#[derive(Debug, FromRow)]
struct RecentSaleRow {
    id: Uuid,
    product_id: Uuid,
    product_name: Option<String>,
    quantity: i32,
    total_price: Decimal,
    profit: Option<Decimal>,
    sale_date: DateTime<Utc>,
}

#[async_trait]
impl ProductStore for PgStore {
    async fn create_product(
        &self,
        user_id: Uuid,
        input: &ProductInput,
        lot_size: i32,
    ) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (
                user_id, name, category, price, stock_quantity, expiry_date,
                low_stock_threshold, expiry_alert_days, procurement_price, lot_size
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price)
        .bind(input.stock_quantity)
        .bind(input.expiry_date)
        .bind(input.low_stock_threshold)
        .bind(input.expiry_alert_days)
        .bind(input.procurement_price)
        .bind(lot_size)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn get_product(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1 AND user_id = $2",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn update_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        input: &ProductInput,
        lot_size: i32,
    ) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $3, category = $4, price = $5, stock_quantity = $6, expiry_date = $7,
                low_stock_threshold = $8, expiry_alert_days = $9, procurement_price = $10,
                lot_size = $11, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price)
        .bind(input.stock_quantity)
        .bind(input.expiry_date)
        .bind(input.low_stock_threshold)
        .bind(input.expiry_alert_days)
        .bind(input.procurement_price)
        .bind(lot_size)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_product(&self, user_id: Uuid, product_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
            .bind(product_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_products(&self, user_id: Uuid) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE user_id = $1 ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_in_stock(&self, user_id: Uuid) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE user_id = $1 AND stock_quantity > 0 ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn decrement_stock(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<StockUpdate> {
        let remaining = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND stock_quantity >= $3
            RETURNING stock_quantity
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(&self.db)
        .await?;

        if let Some(stock) = remaining {
            return Ok(StockUpdate::Updated(stock));
        }

        // Tell a lost race apart from a vanished row
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1 AND user_id = $2)",
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(if exists {
            StockUpdate::Insufficient
        } else {
            StockUpdate::Missing
        })
    }

    async fn count_products(&self, user_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl SaleStore for PgStore {
    async fn insert_sale(&self, sale: &NewSale) -> AppResult<Sale> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            INSERT INTO sales (user_id, product_id, quantity, total_price, profit)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, product_id, quantity, total_price, profit, sale_date
            "#,
        )
        .bind(sale.user_id)
        .bind(sale.product_id)
        .bind(sale.quantity)
        .bind(sale.total_price)
        .bind(sale.profit)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn recent_sales(&self, user_id: Uuid, limit: Option<i64>) -> AppResult<Vec<RecentSale>> {
        let rows = sqlx::query_as::<_, RecentSaleRow>(
            r#"
            SELECT s.id, s.product_id, p.name AS product_name, s.quantity, s.total_price,
                   s.profit, s.sale_date
            FROM sales s
            LEFT JOIN products p ON p.id = s.product_id
            WHERE s.user_id = $1
            ORDER BY s.sale_date DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        // NULL means no limit
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| RecentSale {
                id: r.id,
                product_id: r.product_id,
                product_name: r.product_name,
                quantity: r.quantity,
                total_price: r.total_price,
                profit: r.profit,
                sale_date: r.sale_date,
            })
            .collect())
    }

    async fn count_sales(&self, user_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    async fn sale_totals_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<(DateTime<Utc>, Decimal)>> {
        let rows = sqlx::query_as::<_, (DateTime<Utc>, Decimal)>(
            r#"
            SELECT sale_date, total_price
            FROM sales
            WHERE user_id = $1 AND sale_date >= $2
            ORDER BY sale_date
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl AlertRunStore for PgStore {
    async fn claim_daily_run(&self, user_id: Uuid, day: NaiveDate) -> AppResult<bool> {
        let claimed = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO alert_runs (user_id, last_run_date)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
                SET last_run_date = EXCLUDED.last_run_date, updated_at = NOW()
                WHERE alert_runs.last_run_date < EXCLUDED.last_run_date
            RETURNING user_id
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_optional(&self.db)
        .await?;

        Ok(claimed.is_some())
    }

    async fn release_daily_run(&self, user_id: Uuid, day: NaiveDate) -> AppResult<()> {
        sqlx::query("DELETE FROM alert_runs WHERE user_id = $1 AND last_run_date = $2")
            .bind(user_id)
            .bind(day)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
