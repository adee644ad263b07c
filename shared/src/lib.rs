//! Shared types, models and alert rules for StockMonitor
//!
//! This crate contains the pure domain logic shared between the backend and
//! the browser bindings (via WASM): the threshold evaluator, the alert
//! composer, and the sale arithmetic.

pub mod composer;
pub mod evaluator;
pub mod models;
pub mod types;
pub mod validation;

pub use composer::*;
pub use evaluator::*;
pub use models::*;
pub use types::*;
pub use validation::*;
