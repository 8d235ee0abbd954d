//! Stock ledger models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quantity of one product held by one store.
///
/// There is at most one row per `(store_id, product_id)` and `quantity`
/// never drops below zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreStock {
    pub id: Uuid,
    pub store_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Central stock of a product, summed over all logistics stores
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CentralStockEntry {
    pub product_id: Uuid,
    pub stock: i64,
    pub name: String,
}

/// A page of central stock entries with the unpaginated total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarehouseStock {
    pub items: Vec<CentralStockEntry>,
    /// Number of distinct products held in logistics stores
    pub total: i64,
}

/// Central stock view returned to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CentralStock {
    pub products: Vec<CentralStockEntry>,
    pub total: i64,
}

impl From<WarehouseStock> for CentralStock {
    fn from(stock: WarehouseStock) -> Self {
        Self {
            products: stock.items,
            total: stock.total,
        }
    }
}
