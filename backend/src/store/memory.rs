//! In-memory backend
//!
//! Intended for tests and local runs. Transactions are serialised by an async
//! mutex and work on a copy of the tables that only replaces the shared state
//! on commit.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use shared::{
    CentralStockEntry, DateWindow, NewSale, PageRequest, Product, ProductSalesTotal,
    ReplenishmentRequest, RequestStatus, Sale, SaleItem, Store, StoreSalesTotal, StoreStock,
    StoreType, WarehouseStock,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{InventoryStore, StoreTx};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
struct Tables {
    stores: BTreeMap<Uuid, Store>,
    products: BTreeMap<Uuid, Product>,
    stock: BTreeMap<(Uuid, Uuid), StoreStock>,
    requests: BTreeMap<Uuid, ReplenishmentRequest>,
    sales: BTreeMap<Uuid, Sale>,
}

/// Store holding all tables in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryInventoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store. Store management lives outside the stock core.
    pub async fn add_store(&self, store: Store) {
        self.tables.lock().await.stores.insert(store.id, store);
    }

    /// Remove a store. Its stock rows and requests are left in place.
    pub async fn remove_store(&self, store_id: Uuid) {
        self.tables.lock().await.stores.remove(&store_id);
    }

    /// Register a catalog product
    pub async fn add_product(&self, product: Product) {
        self.tables.lock().await.products.insert(product.id, product);
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> AppResult<MemoryTx> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx { guard, working })
    }
}

/// Exclusive transaction over the in-memory tables
pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

impl MemoryTx {
    fn in_scope(store_ids: Option<&[Uuid]>, store_id: Uuid) -> bool {
        store_ids.map_or(true, |ids| ids.contains(&store_id))
    }

    fn scoped_sales<'a>(
        &'a self,
        store_ids: Option<&'a [Uuid]>,
        window: &'a DateWindow,
    ) -> impl Iterator<Item = &'a Sale> + 'a {
        self.working
            .sales
            .values()
            .filter(move |s| Self::in_scope(store_ids, s.store_id) && window.contains(s.date))
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn stock_quantity(&mut self, store_id: Uuid, product_id: Uuid) -> AppResult<Option<i32>> {
        Ok(self
            .working
            .stock
            .get(&(store_id, product_id))
            .map(|row| row.quantity))
    }

    async fn add_stock(&mut self, store_id: Uuid, product_id: Uuid, quantity: i32) -> AppResult<i32> {
        let row = self
            .working
            .stock
            .entry((store_id, product_id))
            .or_insert_with(|| StoreStock {
                id: Uuid::new_v4(),
                store_id,
                product_id,
                quantity: 0,
            });
        row.quantity = row
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| AppError::validation("quantity", "Stock quantity out of range"))?;
        Ok(row.quantity)
    }

    async fn take_stock(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<Option<i32>> {
        match self.working.stock.get_mut(&(store_id, product_id)) {
            Some(row) if row.quantity >= quantity => {
                row.quantity -= quantity;
                Ok(Some(row.quantity))
            }
            _ => Ok(None),
        }
    }

    async fn stock_below(&mut self, threshold: i32) -> AppResult<Vec<StoreStock>> {
        let mut rows: Vec<StoreStock> = self
            .working
            .stock
            .values()
            .filter(|row| row.quantity < threshold)
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.quantity, r.store_id, r.product_id));
        Ok(rows)
    }

    async fn stock_for_store(&mut self, store_id: Uuid) -> AppResult<Vec<StoreStock>> {
        let mut rows: Vec<StoreStock> = self
            .working
            .stock
            .values()
            .filter(|row| row.store_id == store_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.product_id);
        Ok(rows)
    }

    async fn warehouse_stock(&mut self, page: Option<PageRequest>) -> AppResult<WarehouseStock> {
        let warehouses: HashSet<Uuid> = self
            .working
            .stores
            .values()
            .filter(|s| s.store_type == StoreType::Logistics)
            .map(|s| s.id)
            .collect();

        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for row in self.working.stock.values() {
            if warehouses.contains(&row.store_id) {
                *totals.entry(row.product_id).or_default() += i64::from(row.quantity);
            }
        }

        let mut entries: Vec<CentralStockEntry> = totals
            .into_iter()
            .filter_map(|(product_id, stock)| {
                self.working
                    .products
                    .get(&product_id)
                    .map(|p| CentralStockEntry {
                        product_id,
                        stock,
                        name: p.name.clone(),
                    })
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then(a.product_id.cmp(&b.product_id)));

        let total = entries.len() as i64;
        let items = match page {
            Some(p) => entries
                .into_iter()
                .skip(p.offset() as usize)
                .take(p.limit as usize)
                .collect(),
            None => entries,
        };

        Ok(WarehouseStock { items, total })
    }

    async fn find_store(&mut self, store_id: Uuid) -> AppResult<Option<Store>> {
        Ok(self.working.stores.get(&store_id).cloned())
    }

    async fn stores_by_type(&mut self, store_type: StoreType) -> AppResult<Vec<Store>> {
        Ok(self
            .working
            .stores
            .values()
            .filter(|s| s.store_type == store_type)
            .cloned()
            .collect())
    }

    async fn find_product(&mut self, product_id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.working.products.get(&product_id).cloned())
    }

    async fn insert_request(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<ReplenishmentRequest> {
        let request = ReplenishmentRequest {
            id: Uuid::new_v4(),
            store_id,
            product_id,
            quantity,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            approved_at: None,
            source_store_id: None,
        };
        self.working.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_request(&mut self, request_id: Uuid) -> AppResult<Option<ReplenishmentRequest>> {
        Ok(self.working.requests.get(&request_id).cloned())
    }

    async fn lock_request(&mut self, request_id: Uuid) -> AppResult<Option<ReplenishmentRequest>> {
        // the transaction already holds every table exclusively
        self.find_request(request_id).await
    }

    async fn approve_request(
        &mut self,
        request_id: Uuid,
        source_store_id: Uuid,
    ) -> AppResult<Option<ReplenishmentRequest>> {
        match self.working.requests.get_mut(&request_id) {
            Some(request) if request.status == RequestStatus::Pending => {
                request.status = RequestStatus::Approved;
                request.approved_at = Some(Utc::now());
                request.source_store_id = Some(source_store_id);
                Ok(Some(request.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_requests(
        &mut self,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<ReplenishmentRequest>> {
        let mut requests: Vec<ReplenishmentRequest> = self
            .working
            .requests
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(requests)
    }

    async fn insert_sale(&mut self, sale: &NewSale) -> AppResult<Sale> {
        let sale_id = Uuid::new_v4();
        let record = Sale {
            id: sale_id,
            date: sale.date,
            store_id: sale.store_id,
            sale_items: sale
                .items
                .iter()
                .map(|item| SaleItem {
                    id: Uuid::new_v4(),
                    sale_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
        };
        self.working.sales.insert(sale_id, record.clone());
        Ok(record)
    }

    async fn find_sale(&mut self, sale_id: Uuid) -> AppResult<Option<Sale>> {
        Ok(self.working.sales.get(&sale_id).cloned())
    }

    async fn list_sales(
        &mut self,
        store_ids: Option<&[Uuid]>,
        window: &DateWindow,
    ) -> AppResult<Vec<Sale>> {
        let mut sales: Vec<Sale> = self.scoped_sales(store_ids, window).cloned().collect();
        sales.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Ok(sales)
    }

    async fn delete_sale(&mut self, sale_id: Uuid) -> AppResult<bool> {
        Ok(self.working.sales.remove(&sale_id).is_some())
    }

    async fn sales_by_store(
        &mut self,
        store_ids: Option<&[Uuid]>,
        window: &DateWindow,
    ) -> AppResult<Vec<StoreSalesTotal>> {
        let mut totals: BTreeMap<Uuid, i64> = BTreeMap::new();
        for sale in self.scoped_sales(store_ids, window) {
            *totals.entry(sale.store_id).or_default() += sale.total_quantity();
        }
        Ok(totals
            .into_iter()
            .map(|(store_id, total_quantity)| StoreSalesTotal {
                store_id,
                total_quantity,
            })
            .collect())
    }

    async fn top_products(
        &mut self,
        store_ids: Option<&[Uuid]>,
        window: &DateWindow,
        limit: u32,
    ) -> AppResult<Vec<ProductSalesTotal>> {
        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for item in self
            .scoped_sales(store_ids, window)
            .flat_map(|s| s.sale_items.iter())
        {
            *totals.entry(item.product_id).or_default() += i64::from(item.quantity);
        }

        let mut rows: Vec<ProductSalesTotal> = totals
            .into_iter()
            .map(|(product_id, total_quantity)| ProductSalesTotal {
                product_id,
                total_quantity,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_quantity
                .cmp(&a.total_quantity)
                .then(a.product_id.cmp(&b.product_id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn commit(self) -> AppResult<()> {
        let MemoryTx { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}
