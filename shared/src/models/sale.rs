//! Sale models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A completed sale at a store. Created and deleted together with its items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub store_id: Uuid,
    pub sale_items: Vec<SaleItem>,
}

impl Sale {
    /// Sum of item quantities
    pub fn total_quantity(&self) -> i64 {
        self.sale_items.iter().map(|i| i64::from(i.quantity)).sum()
    }

    /// Sum of `quantity * unit_price` over all items
    pub fn total_amount(&self) -> Decimal {
        self.sale_items
            .iter()
            .map(|i| i.unit_price * Decimal::from(i.quantity))
            .sum()
    }
}

/// One line of a sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Catalog price captured when the sale was recorded
    pub unit_price: Decimal,
}

/// Requested line of a new sale
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineInput {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,
}

/// Input for recording a sale
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleInput {
    pub store_id: Uuid,
    #[validate(
        length(min = 1, message = "A sale needs at least one item"),
        custom = "crate::validation::validate_sale_lines"
    )]
    pub items: Vec<SaleLineInput>,
}

/// Sale line ready to be persisted, price already resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSaleItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Sale ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    pub store_id: Uuid,
    pub date: DateTime<Utc>,
    pub items: Vec<NewSaleItem>,
}

/// Units sold per store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSalesTotal {
    pub store_id: Uuid,
    pub total_quantity: i64,
}

/// Units sold per product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSalesTotal {
    pub product_id: Uuid,
    pub total_quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, price: i64) -> SaleItem {
        SaleItem {
            id: Uuid::new_v4(),
            sale_id: Uuid::nil(),
            product_id: Uuid::new_v4(),
            quantity,
            unit_price: Decimal::new(price, 2),
        }
    }

    #[test]
    fn test_sale_totals() {
        let sale = Sale {
            id: Uuid::nil(),
            date: Utc::now(),
            store_id: Uuid::nil(),
            sale_items: vec![item(2, 1050), item(3, 200)],
        };
        assert_eq!(sale.total_quantity(), 5);
        assert_eq!(sale.total_amount(), Decimal::new(2700, 2));
    }

    #[test]
    fn test_record_sale_input_validation() {
        let empty = RecordSaleInput {
            store_id: Uuid::nil(),
            items: vec![],
        };
        assert!(empty.validate().is_err());

        let negative = RecordSaleInput {
            store_id: Uuid::nil(),
            items: vec![SaleLineInput {
                product_id: Uuid::nil(),
                quantity: -1,
            }],
        };
        assert!(negative.validate().is_err());

        let ok = RecordSaleInput {
            store_id: Uuid::nil(),
            items: vec![SaleLineInput {
                product_id: Uuid::nil(),
                quantity: 1,
            }],
        };
        assert!(ok.validate().is_ok());
    }
}
