//! Dashboard summary

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use shared::evaluator::{is_low_stock, AlertRule};
use shared::models::revenue_by_day;
use shared::types::DashboardSummary;
use uuid::Uuid;

use crate::error::AppResult;
use crate::store::{ProductStore, SaleStore};

/// Days of revenue shown on the dashboard
pub const REVENUE_WINDOW_DAYS: i64 = 7;

#[derive(Clone)]
pub struct DashboardService {
    products: Arc<dyn ProductStore>,
    sales: Arc<dyn SaleStore>,
}

impl DashboardService {
    pub fn new(products: Arc<dyn ProductStore>, sales: Arc<dyn SaleStore>) -> Self {
        Self { products, sales }
    }

    pub async fn summary(&self, user_id: Uuid) -> AppResult<DashboardSummary> {
        let products = self.products.list_products(user_id).await?;
        let total_products = self.products.count_products(user_id).await?;
        let total_sales = self.sales.count_sales(user_id).await?;

        let since = Utc::now() - Duration::days(REVENUE_WINDOW_DAYS);
        let totals = self.sales.sale_totals_since(user_id, since).await?;
        let revenue = revenue_by_day(totals.iter().map(|(at, total)| (at, total)));
        let revenue_total = revenue.iter().map(|d| d.total).sum::<Decimal>();

        // Dashboard badge follows the fixed rule used by the daily batch
        let low_stock_count = products
            .iter()
            .filter(|p| is_low_stock(*p, AlertRule::Legacy))
            .count();

        tracing::debug!(%user_id, total_products, total_sales, "Dashboard summary built");

        Ok(DashboardSummary {
            total_products,
            total_sales,
            low_stock_count,
            revenue_by_day: revenue,
            revenue_total,
        })
    }
}
