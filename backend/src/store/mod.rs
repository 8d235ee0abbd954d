//! Transactional storage backends
//!
//! Every service works against an [`InventoryStore`]: it opens a [`StoreTx`],
//! performs all reads and writes of one operation through it and commits once.
//! Dropping a transaction without committing discards its writes.
//!
//! The stock primitives (`add_stock`, `take_stock`) are only called from
//! [`crate::services::ledger`], which owns validation and error mapping for
//! stock mutations.

mod memory;
mod postgres;

pub use memory::{MemoryInventoryStore, MemoryTx};
pub use postgres::{PgInventoryStore, PgTx};

use async_trait::async_trait;
use shared::{
    DateWindow, NewSale, PageRequest, Product, ProductSalesTotal, ReplenishmentRequest,
    RequestStatus, Sale, Store, StoreSalesTotal, StoreStock, StoreType, WarehouseStock,
};
use uuid::Uuid;

use crate::error::AppResult;

/// A backend able to open transactions
#[async_trait]
pub trait InventoryStore: Clone + Send + Sync + 'static {
    type Tx: StoreTx;

    async fn begin(&self) -> AppResult<Self::Tx>;
}

/// One unit of work against the backend
#[async_trait]
pub trait StoreTx: Send {
    // Stock rows

    async fn stock_quantity(&mut self, store_id: Uuid, product_id: Uuid) -> AppResult<Option<i32>>;

    /// Add `quantity` to the row, creating it if absent. Returns the new quantity.
    async fn add_stock(&mut self, store_id: Uuid, product_id: Uuid, quantity: i32)
        -> AppResult<i32>;

    /// Subtract `quantity` if at least that much is held, in a single
    /// conditional update. Returns `None` and leaves the row untouched
    /// otherwise.
    async fn take_stock(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<Option<i32>>;

    /// Rows with `quantity < threshold`, lowest first
    async fn stock_below(&mut self, threshold: i32) -> AppResult<Vec<StoreStock>>;

    async fn stock_for_store(&mut self, store_id: Uuid) -> AppResult<Vec<StoreStock>>;

    /// Stock of logistics stores summed per product, ordered by product name
    async fn warehouse_stock(&mut self, page: Option<PageRequest>) -> AppResult<WarehouseStock>;

    // Stores and catalog

    async fn find_store(&mut self, store_id: Uuid) -> AppResult<Option<Store>>;

    async fn stores_by_type(&mut self, store_type: StoreType) -> AppResult<Vec<Store>>;

    async fn find_product(&mut self, product_id: Uuid) -> AppResult<Option<Product>>;

    // Replenishment requests

    async fn insert_request(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<ReplenishmentRequest>;

    async fn find_request(&mut self, request_id: Uuid) -> AppResult<Option<ReplenishmentRequest>>;

    /// Like `find_request`, but holds the row until the transaction ends
    async fn lock_request(&mut self, request_id: Uuid) -> AppResult<Option<ReplenishmentRequest>>;

    /// Flip a PENDING request to APPROVED. `None` if it was not PENDING.
    async fn approve_request(
        &mut self,
        request_id: Uuid,
        source_store_id: Uuid,
    ) -> AppResult<Option<ReplenishmentRequest>>;

    /// Requests newest first, optionally filtered by status
    async fn list_requests(
        &mut self,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<ReplenishmentRequest>>;

    // Sales

    async fn insert_sale(&mut self, sale: &NewSale) -> AppResult<Sale>;

    async fn find_sale(&mut self, sale_id: Uuid) -> AppResult<Option<Sale>>;

    /// Sales newest first. `store_ids == None` means every store.
    async fn list_sales(
        &mut self,
        store_ids: Option<&[Uuid]>,
        window: &DateWindow,
    ) -> AppResult<Vec<Sale>>;

    /// Delete a sale with its items. Returns whether a sale was removed.
    async fn delete_sale(&mut self, sale_id: Uuid) -> AppResult<bool>;

    // Reports

    async fn sales_by_store(
        &mut self,
        store_ids: Option<&[Uuid]>,
        window: &DateWindow,
    ) -> AppResult<Vec<StoreSalesTotal>>;

    /// Best selling products, highest total first, at most `limit` rows
    async fn top_products(
        &mut self,
        store_ids: Option<&[Uuid]>,
        window: &DateWindow,
        limit: u32,
    ) -> AppResult<Vec<ProductSalesTotal>>;

    async fn commit(self) -> AppResult<()>;
}
