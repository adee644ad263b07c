//! In-process store used by tests and local demos

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::models::{NewSale, Product, ProductInput, RecentSale, Sale};
use uuid::Uuid;

use super::{AlertRunStore, ProductStore, SaleStore, StockUpdate};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    products: HashMap<Uuid, Product>,
    sales: Vec<Sale>,
    alert_runs: HashMap<Uuid, NaiveDate>,
}

/// Store that keeps every table in memory
///
/// Failure switches let tests break a single write step to observe how
/// callers handle it.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_sale_insert: AtomicBool,
    fail_stock_update: AtomicBool,
    sale_inserts: AtomicUsize,
    stock_updates: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next sale insert fail with a storage error
    pub fn fail_next_sale_insert(&self) {
        self.fail_sale_insert.store(true, Ordering::SeqCst);
    }

    /// Make the next stock decrement fail with a storage error
    pub fn fail_next_stock_update(&self) {
        self.fail_stock_update.store(true, Ordering::SeqCst);
    }

    /// Number of sale rows written
    pub fn sale_inserts(&self) -> usize {
        self.sale_inserts.load(Ordering::SeqCst)
    }

    /// Number of successful stock decrements
    pub fn stock_updates(&self) -> usize {
        self.stock_updates.load(Ordering::SeqCst)
    }

    /// Overwrite a product's stock level directly
    pub fn set_stock(&self, product_id: Uuid, stock_quantity: i32) -> AppResult<()> {
        let mut tables = self.tables()?;
        let product = tables
            .products
            .get_mut(&product_id)
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        product.stock_quantity = stock_quantity;
        Ok(())
    }

    fn tables(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    fn injected_failure(flag: &AtomicBool, what: &str) -> AppResult<()> {
        if flag.swap(false, Ordering::SeqCst) {
            return Err(AppError::DatabaseError(sqlx::Error::Protocol(format!(
                "injected {} failure",
                what
            ))));
        }
        Ok(())
    }
}

fn build_product(
    id: Uuid,
    user_id: Uuid,
    input: &ProductInput,
    lot_size: i32,
    created_at: DateTime<Utc>,
) -> Product {
    Product {
        id,
        user_id,
        name: input.name.clone(),
        category: input.category.clone(),
        price: input.price,
        stock_quantity: input.stock_quantity,
        expiry_date: input.expiry_date,
        low_stock_threshold: input.low_stock_threshold,
        expiry_alert_days: input.expiry_alert_days,
        procurement_price: input.procurement_price,
        lot_size: Some(lot_size),
        created_at,
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn create_product(
        &self,
        user_id: Uuid,
        input: &ProductInput,
        lot_size: i32,
    ) -> AppResult<Product> {
        let product = build_product(Uuid::new_v4(), user_id, input, lot_size, Utc::now());
        self.tables()?.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Option<Product>> {
        Ok(self
            .tables()?
            .products
            .get(&product_id)
            .filter(|p| p.user_id == user_id)
            .cloned())
    }

    async fn update_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        input: &ProductInput,
        lot_size: i32,
    ) -> AppResult<Option<Product>> {
        let mut tables = self.tables()?;
        let Some(existing) = tables
            .products
            .get_mut(&product_id)
            .filter(|p| p.user_id == user_id)
        else {
            return Ok(None);
        };

        *existing = build_product(product_id, user_id, input, lot_size, existing.created_at);
        Ok(Some(existing.clone()))
    }

    async fn delete_product(&self, user_id: Uuid, product_id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables()?;
        let owned = tables
            .products
            .get(&product_id)
            .is_some_and(|p| p.user_id == user_id);
        if owned {
            tables.products.remove(&product_id);
        }
        Ok(owned)
    }

    async fn list_products(&self, user_id: Uuid) -> AppResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .tables()?
            .products
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn list_in_stock(&self, user_id: Uuid) -> AppResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .tables()?
            .products
            .values()
            .filter(|p| p.user_id == user_id && p.stock_quantity > 0)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn decrement_stock(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<StockUpdate> {
        Self::injected_failure(&self.fail_stock_update, "stock update")?;

        let mut tables = self.tables()?;
        let Some(product) = tables
            .products
            .get_mut(&product_id)
            .filter(|p| p.user_id == user_id)
        else {
            return Ok(StockUpdate::Missing);
        };

        if product.stock_quantity < quantity {
            return Ok(StockUpdate::Insufficient);
        }

        product.stock_quantity -= quantity;
        product.updated_at = Utc::now();
        self.stock_updates.fetch_add(1, Ordering::SeqCst);
        Ok(StockUpdate::Updated(product.stock_quantity))
    }

    async fn count_products(&self, user_id: Uuid) -> AppResult<i64> {
        let count = self
            .tables()?
            .products
            .values()
            .filter(|p| p.user_id == user_id)
            .count();
        Ok(count as i64)
    }

    async fn ping(&self) -> AppResult<()> {
        self.tables().map(|_| ())
    }
}

#[async_trait]
impl SaleStore for MemoryStore {
    async fn insert_sale(&self, sale: &NewSale) -> AppResult<Sale> {
        Self::injected_failure(&self.fail_sale_insert, "sale insert")?;

        let row = Sale {
            id: Uuid::new_v4(),
            user_id: sale.user_id,
            product_id: sale.product_id,
            quantity: sale.quantity,
            total_price: sale.total_price,
            profit: sale.profit,
            sale_date: Utc::now(),
        };
        self.tables()?.sales.push(row.clone());
        self.sale_inserts.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn recent_sales(&self, user_id: Uuid, limit: Option<i64>) -> AppResult<Vec<RecentSale>> {
        let tables = self.tables()?;
        let mut sales: Vec<RecentSale> = tables
            .sales
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| RecentSale {
                id: s.id,
                product_id: s.product_id,
                product_name: tables.products.get(&s.product_id).map(|p| p.name.clone()),
                quantity: s.quantity,
                total_price: s.total_price,
                profit: s.profit,
                sale_date: s.sale_date,
            })
            .collect();

        // Newest first; insertion order breaks ties within the same instant
        sales.reverse();
        sales.sort_by(|a, b| b.sale_date.cmp(&a.sale_date));
        if let Some(limit) = limit {
            sales.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        }
        Ok(sales)
    }

    async fn count_sales(&self, user_id: Uuid) -> AppResult<i64> {
        let count = self
            .tables()?
            .sales
            .iter()
            .filter(|s| s.user_id == user_id)
            .count();
        Ok(count as i64)
    }

    async fn sale_totals_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<(DateTime<Utc>, Decimal)>> {
        Ok(self
            .tables()?
            .sales
            .iter()
            .filter(|s| s.user_id == user_id && s.sale_date >= since)
            .map(|s| (s.sale_date, s.total_price))
            .collect())
    }
}

#[async_trait]
impl AlertRunStore for MemoryStore {
    async fn claim_daily_run(&self, user_id: Uuid, day: NaiveDate) -> AppResult<bool> {
        let mut tables = self.tables()?;
        match tables.alert_runs.get(&user_id) {
            Some(last) if *last >= day => Ok(false),
            _ => {
                tables.alert_runs.insert(user_id, day);
                Ok(true)
            }
        }
    }

    async fn release_daily_run(&self, user_id: Uuid, day: NaiveDate) -> AppResult<()> {
        let mut tables = self.tables()?;
        if tables.alert_runs.get(&user_id) == Some(&day) {
            tables.alert_runs.remove(&user_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, stock: i32) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            category: None,
            price: Decimal::from(20),
            stock_quantity: stock,
            expiry_date: None,
            low_stock_threshold: 50,
            expiry_alert_days: 20,
            procurement_price: None,
        }
    }

    #[tokio::test]
    async fn test_products_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let product = store.create_product(owner, &input("Rice", 5), 5).await.unwrap();

        assert!(store.get_product(other, product.id).await.unwrap().is_none());
        assert!(!store.delete_product(other, product.id).await.unwrap());
        assert_eq!(store.count_products(owner).await.unwrap(), 1);
        assert_eq!(store.count_products(other).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_decrement_is_conditional() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let product = store.create_product(owner, &input("Rice", 10), 10).await.unwrap();

        assert_eq!(
            store.decrement_stock(owner, product.id, 3).await.unwrap(),
            StockUpdate::Updated(7)
        );
        assert_eq!(
            store.decrement_stock(owner, product.id, 8).await.unwrap(),
            StockUpdate::Insufficient
        );
        assert_eq!(
            store.decrement_stock(owner, Uuid::new_v4(), 1).await.unwrap(),
            StockUpdate::Missing
        );
        assert_eq!(store.stock_updates(), 1);
    }

    #[tokio::test]
    async fn test_daily_run_claim_and_release() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        assert!(store.claim_daily_run(owner, today).await.unwrap());
        assert!(!store.claim_daily_run(owner, today).await.unwrap());

        store.release_daily_run(owner, today).await.unwrap();
        assert!(store.claim_daily_run(owner, today).await.unwrap());
        assert!(store.claim_daily_run(owner, today.succ_opt().unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let product = store.create_product(owner, &input("Rice", 10), 10).await.unwrap();

        store.fail_next_stock_update();
        assert!(store.decrement_stock(owner, product.id, 1).await.is_err());
        assert!(store.decrement_stock(owner, product.id, 1).await.is_ok());
    }
}
