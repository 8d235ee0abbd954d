//! Stock ledger
//!
//! The free functions in this module are the only write path for store
//! stock. Workflows call them with their own open transaction; the
//! [`LedgerService`] methods run a single operation in a transaction of
//! their own.

use shared::{validate_quantity, validate_threshold, PageRequest, StoreStock, WarehouseStock};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, StoreTx};

fn check_quantity(quantity: i32) -> AppResult<()> {
    validate_quantity(quantity).map_err(|msg| AppError::validation("quantity", msg))
}

/// Current quantity, `None` if the pair was never stocked
pub async fn get_stock<T: StoreTx>(
    tx: &mut T,
    store_id: Uuid,
    product_id: Uuid,
) -> AppResult<Option<i32>> {
    tx.stock_quantity(store_id, product_id).await
}

/// Add stock, creating the row on first use. Returns the new quantity.
pub async fn increment<T: StoreTx>(
    tx: &mut T,
    store_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<i32> {
    check_quantity(quantity)?;
    tx.add_stock(store_id, product_id, quantity).await
}

/// Remove stock if enough is held. `Ok(None)` leaves the row unchanged.
pub async fn try_decrement<T: StoreTx>(
    tx: &mut T,
    store_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<Option<i32>> {
    check_quantity(quantity)?;
    tx.take_stock(store_id, product_id, quantity).await
}

/// Remove stock, failing with `InsufficientStock` when the row is absent or
/// holds less than `quantity`.
pub async fn decrement<T: StoreTx>(
    tx: &mut T,
    store_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<i32> {
    try_decrement(tx, store_id, product_id, quantity)
        .await?
        .ok_or_else(|| AppError::insufficient_stock(product_id))
}

/// Rows with `quantity < threshold`
pub async fn find_below_threshold<T: StoreTx>(tx: &mut T, threshold: i32) -> AppResult<Vec<StoreStock>> {
    validate_threshold(threshold).map_err(|msg| AppError::validation("threshold", msg))?;
    tx.stock_below(threshold).await
}

/// Stock ledger service
#[derive(Clone)]
pub struct LedgerService<S> {
    store: S,
    default_page_size: u32,
}

impl<S: InventoryStore> LedgerService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_page_size: 20,
        }
    }

    /// Page size used when only `page` is given to `find_warehouse_stock`
    pub fn with_default_page_size(mut self, default_page_size: u32) -> Self {
        self.default_page_size = default_page_size;
        self
    }

    pub async fn get_stock(&self, store_id: Uuid, product_id: Uuid) -> AppResult<Option<i32>> {
        let mut tx = self.store.begin().await?;
        get_stock(&mut tx, store_id, product_id).await
    }

    pub async fn increment(&self, store_id: Uuid, product_id: Uuid, quantity: i32) -> AppResult<i32> {
        let mut tx = self.store.begin().await?;
        let new_quantity = increment(&mut tx, store_id, product_id, quantity).await?;
        tx.commit().await?;

        tracing::debug!(
            "Stock of product {} at store {} increased by {} to {}",
            product_id,
            store_id,
            quantity,
            new_quantity
        );
        Ok(new_quantity)
    }

    pub async fn decrement(&self, store_id: Uuid, product_id: Uuid, quantity: i32) -> AppResult<i32> {
        let mut tx = self.store.begin().await?;
        let new_quantity = decrement(&mut tx, store_id, product_id, quantity).await?;
        tx.commit().await?;

        tracing::debug!(
            "Stock of product {} at store {} decreased by {} to {}",
            product_id,
            store_id,
            quantity,
            new_quantity
        );
        Ok(new_quantity)
    }

    pub async fn find_below_threshold(&self, threshold: i32) -> AppResult<Vec<StoreStock>> {
        let mut tx = self.store.begin().await?;
        find_below_threshold(&mut tx, threshold).await
    }

    pub async fn find_all_for_store(&self, store_id: Uuid) -> AppResult<Vec<StoreStock>> {
        let mut tx = self.store.begin().await?;
        tx.stock_for_store(store_id).await
    }

    /// Logistics stock per product, paginated when `page` or `limit` is set
    pub async fn find_warehouse_stock(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> AppResult<WarehouseStock> {
        let page = PageRequest::from_parts(page, limit, self.default_page_size)
            .map_err(|msg| AppError::validation("page", msg))?;
        let mut tx = self.store.begin().await?;
        tx.warehouse_stock(page).await
    }
}
