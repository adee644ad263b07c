//! Sale recorder
//!
//! Recording a sale is two writes: the sale row, then the stock decrement.
//! They are not wrapped in a transaction. A failure between them leaves a
//! recorded sale with stale stock, which surfaces as
//! [`AppError::PartialWrite`] and is never retried.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use shared::models::{
    check_stock, sale_profit, sale_total, NewSale, RecentSale, RecordSaleInput, Sale,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{ProductStore, SaleStore, StockUpdate};

/// Default number of rows in the recent-sales list
pub const DEFAULT_RECENT_SALES: i64 = 10;

/// Stage a sale attempt reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleStage {
    Validating,
    WritingSale,
    WritingStock,
    Complete,
}

impl fmt::Display for SaleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaleStage::Validating => "validating",
            SaleStage::WritingSale => "writing_sale",
            SaleStage::WritingStock => "writing_stock",
            SaleStage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// A completed sale with the stock left afterwards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedSale {
    #[serde(flatten)]
    pub sale: Sale,
    pub remaining_stock: i32,
}

/// Sale recorder service
#[derive(Clone)]
pub struct SaleRecorder {
    products: Arc<dyn ProductStore>,
    sales: Arc<dyn SaleStore>,
}

impl SaleRecorder {
    pub fn new(products: Arc<dyn ProductStore>, sales: Arc<dyn SaleStore>) -> Self {
        Self { products, sales }
    }

    /// Record a sale of `input.quantity` units and decrement stock
    pub async fn record(&self, user_id: Uuid, input: RecordSaleInput) -> AppResult<RecordedSale> {
        let mut stage = SaleStage::Validating;
        tracing::debug!(
            product_id = %input.product_id,
            quantity = input.quantity,
            %stage,
            "Recording sale"
        );

        input.validate()?;

        let product = self
            .products
            .get_product(user_id, input.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        if let Err(shortfall) = check_stock(product.stock_quantity, input.quantity) {
            tracing::info!(
                product_id = %product.id,
                available = shortfall.available,
                requested = shortfall.requested,
                "Sale rejected"
            );
            return Err(shortfall.into());
        }

        let total_price = sale_total(product.price, input.quantity)?;
        let profit = sale_profit(total_price, product.unit_cost(), input.quantity)?;

        stage = SaleStage::WritingSale;
        let sale = self
            .sales
            .insert_sale(&NewSale {
                user_id,
                product_id: product.id,
                quantity: input.quantity,
                total_price,
                profit,
            })
            .await
            .map_err(|err| {
                tracing::error!(
                    product_id = %product.id,
                    %stage,
                    error = %err,
                    "Sale write failed"
                );
                err
            })?;

        stage = SaleStage::WritingStock;
        let partial = |reason: String| AppError::PartialWrite {
            sale_id: sale.id,
            product_id: product.id,
            reason,
        };

        let remaining_stock = match self
            .products
            .decrement_stock(user_id, product.id, input.quantity)
            .await
        {
            Ok(StockUpdate::Updated(remaining)) => remaining,
            Ok(StockUpdate::Insufficient) => {
                return Err(partial("stock fell below the sold quantity concurrently".to_string()))
            }
            Ok(StockUpdate::Missing) => {
                return Err(partial("product was deleted before stock was updated".to_string()))
            }
            Err(err) => {
                tracing::error!(sale_id = %sale.id, %stage, error = %err, "Stock write failed");
                return Err(partial(err.to_string()));
            }
        };

        stage = SaleStage::Complete;
        tracing::info!(
            sale_id = %sale.id,
            product_id = %product.id,
            quantity = sale.quantity,
            total = %sale.total_price,
            remaining_stock,
            %stage,
            "Sale recorded"
        );

        Ok(RecordedSale {
            sale,
            remaining_stock,
        })
    }

    /// Most recent sales, newest first
    pub async fn recent(&self, user_id: Uuid, limit: Option<i64>) -> AppResult<Vec<RecentSale>> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_SALES);
        if limit < 1 {
            return Err(AppError::Validation {
                field: "limit".to_string(),
                message: "Limit must be a positive integer".to_string(),
            });
        }
        self.sales.recent_sales(user_id, Some(limit)).await
    }
}
