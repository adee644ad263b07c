//! StockMonitor backend
//!
//! Inventory and sales tracking for small shops: a product catalog, a sale
//! recorder that keeps stock in step, and email alerts for low-stock and
//! soon-to-expire products.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use services::{AlertService, CatalogService, NotificationDispatcher};
use store::{AlertRunStore, ProductStore, SaleStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub products: Arc<dyn ProductStore>,
    pub sales: Arc<dyn SaleStore>,
    pub alert_runs: Arc<dyn AlertRunStore>,
    pub dispatcher: NotificationDispatcher,
}

impl AppState {
    /// State whose three stores are all served by `store`
    pub fn new<S>(config: Config, store: Arc<S>, dispatcher: NotificationDispatcher) -> Self
    where
        S: ProductStore + SaleStore + AlertRunStore + 'static,
    {
        Self {
            config: Arc::new(config),
            products: store.clone(),
            sales: store.clone(),
            alert_runs: store,
            dispatcher,
        }
    }

    pub fn alert_service(&self) -> AlertService {
        AlertService::new(
            self.products.clone(),
            self.alert_runs.clone(),
            self.dispatcher.clone(),
        )
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(
            self.products.clone(),
            self.alert_service(),
            self.config.alerts.notify_on_edit,
        )
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "StockMonitor API v1"
}
