//! Read-side stock and sales aggregations
//!
//! Every store-filtered query takes the caller's [`AccessScope`].

use serde::Serialize;
use shared::{
    AccessScope, CentralStock, DateWindow, PageRequest, ProductSalesTotal, StoreSalesTotal,
    StoreStock,
};
use uuid::Uuid;

use super::check_window;
use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, StoreTx};

/// Sales report combining per-store and per-product totals
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedReport {
    pub sales_by_store: Vec<StoreSalesTotal>,
    pub top_products: Vec<ProductSalesTotal>,
}

/// Stock aggregation service
#[derive(Clone)]
pub struct StockAggregator<S> {
    store: S,
    default_page_size: u32,
}

impl<S: InventoryStore> StockAggregator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_page_size: 20,
        }
    }

    pub fn with_default_page_size(mut self, default_page_size: u32) -> Self {
        self.default_page_size = default_page_size;
        self
    }

    /// Stock of logistics stores per product, with product names
    pub async fn central_stock(&self, page: Option<u32>, limit: Option<u32>) -> AppResult<CentralStock> {
        let page = PageRequest::from_parts(page, limit, self.default_page_size)
            .map_err(|msg| AppError::validation("page", msg))?;
        let mut tx = self.store.begin().await?;
        Ok(tx.warehouse_stock(page).await?.into())
    }

    /// All stock rows of one store the caller may see
    pub async fn store_stock(&self, scope: &AccessScope, store_id: Uuid) -> AppResult<Vec<StoreStock>> {
        if !scope.allows(store_id) {
            return Err(AppError::InsufficientPermissions);
        }
        let mut tx = self.store.begin().await?;
        if tx.find_store(store_id).await?.is_none() {
            return Err(AppError::StoreNotFound(store_id));
        }
        tx.stock_for_store(store_id).await
    }

    /// Units sold per accessible store within `window`
    pub async fn sales_by_store(
        &self,
        scope: &AccessScope,
        window: &DateWindow,
    ) -> AppResult<Vec<StoreSalesTotal>> {
        check_window(window)?;
        let mut tx = self.store.begin().await?;
        tx.sales_by_store(scope.store_ids(), window).await
    }

    /// Best selling products across accessible stores within `window`
    pub async fn top_products(
        &self,
        scope: &AccessScope,
        limit: u32,
        window: &DateWindow,
    ) -> AppResult<Vec<ProductSalesTotal>> {
        check_window(window)?;
        if limit == 0 {
            return Err(AppError::validation("limit", "Limit must be at least 1"));
        }
        let mut tx = self.store.begin().await?;
        tx.top_products(scope.store_ids(), window, limit).await
    }

    /// Both sales reports read from one snapshot
    pub async fn consolidated(
        &self,
        scope: &AccessScope,
        limit: u32,
        window: &DateWindow,
    ) -> AppResult<ConsolidatedReport> {
        check_window(window)?;
        if limit == 0 {
            return Err(AppError::validation("limit", "Limit must be at least 1"));
        }
        let mut tx = self.store.begin().await?;
        let sales_by_store = tx.sales_by_store(scope.store_ids(), window).await?;
        let top_products = tx.top_products(scope.store_ids(), window, limit).await?;
        Ok(ConsolidatedReport {
            sales_by_store,
            top_products,
        })
    }
}
