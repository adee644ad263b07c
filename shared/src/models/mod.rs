//! Domain models for StockMonitor

mod alert;
mod product;
mod sale;

pub use alert::*;
pub use product::*;
pub use sale::*;
