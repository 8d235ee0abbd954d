//! HTTP handlers

pub mod health;
pub mod logistics;
pub mod reports;
pub mod returns;
pub mod sales;
pub mod stock;

pub use health::*;
pub use logistics::*;
pub use reports::*;
pub use returns::*;
pub use sales::*;
pub use stock::*;
