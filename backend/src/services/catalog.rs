//! Product catalog: the only writer of product rows
//!
//! Every save resets the lot size to the submitted stock quantity and may
//! trigger a single-product alert. Alert failures never fail the save.

use std::sync::Arc;

use shared::models::{Product, ProductInput};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::{AlertOutcome, AlertService};
use crate::store::ProductStore;

/// Which save triggered an alert check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveKind {
    Created,
    Edited,
}

/// Product catalog service
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductStore>,
    alerts: AlertService,
    notify_on_edit: bool,
}

impl CatalogService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        alerts: AlertService,
        notify_on_edit: bool,
    ) -> Self {
        Self {
            products,
            alerts,
            notify_on_edit,
        }
    }

    /// List all of the user's products, newest first
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Product>> {
        self.products.list_products(user_id).await
    }

    /// Products that can still be sold, ordered by name
    pub async fn list_in_stock(&self, user_id: Uuid) -> AppResult<Vec<Product>> {
        self.products.list_in_stock(user_id).await
    }

    pub async fn get(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Product> {
        self.products
            .get_product(user_id, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Create a product and check it against the alert rules
    pub async fn create(&self, user: &AuthUser, input: ProductInput) -> AppResult<Product> {
        let input = input.normalized();
        input.validate()?;

        let product = self
            .products
            .create_product(user.user_id, &input, input.lot_size())
            .await?;

        tracing::info!(product_id = %product.id, user_id = %user.user_id, "Product created");

        self.notify(user, &input, SaveKind::Created).await;
        Ok(product)
    }

    /// Replace a product's fields
    pub async fn update(
        &self,
        user: &AuthUser,
        product_id: Uuid,
        input: ProductInput,
    ) -> AppResult<Product> {
        let input = input.normalized();
        input.validate()?;

        let product = self
            .products
            .update_product(user.user_id, product_id, &input, input.lot_size())
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        tracing::info!(product_id = %product.id, user_id = %user.user_id, "Product updated");

        if self.notify_on_edit {
            self.notify(user, &input, SaveKind::Edited).await;
        }
        Ok(product)
    }

    pub async fn delete(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()> {
        if !self.products.delete_product(user_id, product_id).await? {
            return Err(AppError::NotFound("Product".to_string()));
        }
        tracing::info!(%product_id, %user_id, "Product deleted");
        Ok(())
    }

    async fn notify(&self, user: &AuthUser, input: &ProductInput, kind: SaveKind) {
        match self.alerts.send_single(user, &input.alert_snapshot()).await {
            Ok(AlertOutcome::Sent { .. }) => {
                tracing::info!(product = %input.name, ?kind, "Product alert sent")
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(
                product = %input.name,
                ?kind,
                error = %err,
                "Product saved but alert could not be sent"
            ),
        }
    }
}
