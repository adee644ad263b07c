//! HTTP request handlers

pub mod alert;
pub mod dashboard;
pub mod health;
pub mod product;
pub mod sale;

pub use alert::*;
pub use dashboard::*;
pub use health::*;
pub use product::*;
pub use sale::*;
