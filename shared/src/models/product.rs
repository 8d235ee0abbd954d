//! Product catalog models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product. Read-mostly, owned outside the stock core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Current list price, snapshotted onto sale items at sale time
    pub price: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
}
