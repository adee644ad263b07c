//! Business logic services for StockMonitor

pub mod alert;
pub mod catalog;
pub mod dashboard;
pub mod notification;
pub mod sale;

pub use alert::{AlertOutcome, AlertService};
pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use notification::NotificationDispatcher;
pub use sale::{RecordedSale, SaleRecorder, SaleStage};
