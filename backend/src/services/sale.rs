//! Sale recording
//!
//! Recording runs in two phases inside one transaction: every line is
//! checked against current stock before anything is written, then the sale
//! is stored and stock is decremented once per product, in product id
//! order. The conditional decrement is the final gate; if a concurrent sale
//! drained the stock between the phases the whole transaction is discarded.

use chrono::Utc;
use shared::{
    aggregate_lines, validate_quantity, AccessScope, DateWindow, NewSale, NewSaleItem, Sale,
    SaleLineInput,
};
use uuid::Uuid;

use super::{check_window, ledger};
use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, StoreTx};

/// Sale service
#[derive(Clone)]
pub struct SaleService<S> {
    store: S,
}

impl<S: InventoryStore> SaleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a sale and consume the sold stock, all or nothing
    pub async fn record(&self, store_id: Uuid, items: &[SaleLineInput]) -> AppResult<Sale> {
        if items.is_empty() {
            return Err(AppError::validation("items", "A sale needs at least one item"));
        }
        for item in items {
            validate_quantity(item.quantity).map_err(|msg| AppError::validation("quantity", msg))?;
        }
        let required = aggregate_lines(items).map_err(|msg| AppError::validation("quantity", msg))?;

        let mut tx = self.store.begin().await?;

        if tx.find_store(store_id).await?.is_none() {
            return Err(AppError::StoreNotFound(store_id));
        }

        // Phase 1: validate every product before any write
        for (product_id, quantity) in &required {
            let available = ledger::get_stock(&mut tx, store_id, *product_id)
                .await?
                .unwrap_or(0);
            if available < *quantity {
                tracing::warn!(
                    "Sale rejected at store {}: product {} has {} available, {} requested",
                    store_id,
                    product_id,
                    available,
                    quantity
                );
                return Err(AppError::insufficient_stock(*product_id));
            }
        }

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = tx
                .find_product(item.product_id)
                .await?
                .ok_or(AppError::ProductNotFound(item.product_id))?;
            lines.push(NewSaleItem {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: product.price,
            });
        }

        // Phase 2: persist the sale, then consume stock
        let sale = tx
            .insert_sale(&NewSale {
                store_id,
                date: Utc::now(),
                items: lines,
            })
            .await?;

        // fixed row order so concurrent sales lock stock rows consistently
        let mut consumed = required;
        consumed.sort_by_key(|(product_id, _)| *product_id);
        for (product_id, quantity) in &consumed {
            ledger::decrement(&mut tx, store_id, *product_id, *quantity).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Sale {} recorded at store {}: {} item(s), {} unit(s)",
            sale.id,
            store_id,
            sale.sale_items.len(),
            sale.total_quantity()
        );
        Ok(sale)
    }

    pub async fn get_by_id(&self, sale_id: Uuid) -> AppResult<Option<Sale>> {
        let mut tx = self.store.begin().await?;
        tx.find_sale(sale_id).await
    }

    /// Sales visible to `scope` within `window`, newest first
    pub async fn list(&self, scope: &AccessScope, window: &DateWindow) -> AppResult<Vec<Sale>> {
        check_window(window)?;
        let mut tx = self.store.begin().await?;
        tx.list_sales(scope.store_ids(), window).await
    }
}
