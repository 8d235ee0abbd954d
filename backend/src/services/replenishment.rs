//! Replenishment workflow: moves stock from logistics stores to sales stores
//!
//! A request is created PENDING without touching stock. Approval re-checks
//! the target store, draws the quantity from one logistics store, credits
//! the target store and marks the request APPROVED, all in one transaction.

use shared::{validate_quantity, ReplenishmentRequest, RequestStatus, Store, StoreStock, StoreType};
use uuid::Uuid;

use super::ledger;
use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, StoreTx};

/// Threshold used by `check_critical_stock` unless configured otherwise
pub const DEFAULT_CRITICAL_THRESHOLD: i32 = 5;

/// Replenishment service
#[derive(Clone)]
pub struct ReplenishmentService<S> {
    store: S,
    critical_threshold: i32,
}

/// Resolve a store and require it to be a sales store
async fn require_sales_store<T: StoreTx>(tx: &mut T, store_id: Uuid) -> AppResult<Store> {
    let store = tx
        .find_store(store_id)
        .await?
        .ok_or(AppError::StoreNotFound(store_id))?;

    if store.store_type != StoreType::Sales {
        return Err(AppError::InvalidStoreType {
            store_id,
            expected: StoreType::Sales,
            actual: store.store_type,
        });
    }

    Ok(store)
}

/// Pick the logistics store holding the most of `product_id`, provided it
/// covers `quantity`. Ties go to the lowest store id.
async fn pick_warehouse<T: StoreTx>(
    tx: &mut T,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<Option<Uuid>> {
    let warehouses = tx.stores_by_type(StoreType::Logistics).await?;

    let mut best: Option<(i32, Uuid)> = None;
    for warehouse in warehouses {
        let available = ledger::get_stock(&mut *tx, warehouse.id, product_id)
            .await?
            .unwrap_or(0);
        if available < quantity {
            continue;
        }
        let better = match best {
            None => true,
            Some((held, id)) => available > held || (available == held && warehouse.id < id),
        };
        if better {
            best = Some((available, warehouse.id));
        }
    }

    Ok(best.map(|(_, id)| id))
}

impl<S: InventoryStore> ReplenishmentService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
        }
    }

    pub fn with_critical_threshold(mut self, threshold: i32) -> Self {
        self.critical_threshold = threshold;
        self
    }

    /// Create a PENDING request for a sales store
    pub async fn request(
        &self,
        store_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<ReplenishmentRequest> {
        validate_quantity(quantity).map_err(|msg| AppError::validation("quantity", msg))?;

        let mut tx = self.store.begin().await?;
        require_sales_store(&mut tx, store_id).await?;
        if tx.find_product(product_id).await?.is_none() {
            return Err(AppError::ProductNotFound(product_id));
        }
        let request = tx.insert_request(store_id, product_id, quantity).await?;
        tx.commit().await?;

        tracing::info!(
            "Replenishment {} requested: {} x product {} for store {}",
            request.id,
            quantity,
            product_id,
            store_id
        );
        Ok(request)
    }

    /// Approve a PENDING request and transfer the stock
    pub async fn approve(&self, request_id: Uuid) -> AppResult<ReplenishmentRequest> {
        let mut tx = self.store.begin().await?;

        let request = tx
            .lock_request(request_id)
            .await?
            .ok_or(AppError::RequestNotFound(request_id))?;

        if !request.status.can_transition_to(RequestStatus::Approved) {
            return Err(AppError::InvalidStateTransition(format!(
                "Replenishment request {} is {} and cannot be approved",
                request_id, request.status
            )));
        }

        // store eligibility may have changed since the request was made
        require_sales_store(&mut tx, request.store_id).await?;

        let shortfall =
            || AppError::insufficient_warehouse_stock(request.product_id, request.quantity);

        let Some(source_id) = pick_warehouse(&mut tx, request.product_id, request.quantity).await?
        else {
            tracing::warn!(
                "Replenishment {} blocked: no logistics store holds {} of product {}",
                request_id,
                request.quantity,
                request.product_id
            );
            return Err(shortfall());
        };

        ledger::try_decrement(&mut tx, source_id, request.product_id, request.quantity)
            .await?
            .ok_or_else(shortfall)?;
        ledger::increment(&mut tx, request.store_id, request.product_id, request.quantity).await?;

        let approved = tx
            .approve_request(request_id, source_id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidStateTransition(format!(
                    "Replenishment request {} is no longer pending",
                    request_id
                ))
            })?;

        tx.commit().await?;

        tracing::info!(
            "Replenishment {} approved: {} x product {} moved from {} to {}",
            request_id,
            approved.quantity,
            approved.product_id,
            source_id,
            approved.store_id
        );
        Ok(approved)
    }

    /// Stock rows below `threshold`, or below the configured critical level
    pub async fn check_critical_stock(&self, threshold: Option<i32>) -> AppResult<Vec<StoreStock>> {
        let mut tx = self.store.begin().await?;
        ledger::find_below_threshold(&mut tx, threshold.unwrap_or(self.critical_threshold)).await
    }

    pub async fn get_request(&self, request_id: Uuid) -> AppResult<ReplenishmentRequest> {
        let mut tx = self.store.begin().await?;
        tx.find_request(request_id)
            .await?
            .ok_or(AppError::RequestNotFound(request_id))
    }

    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<ReplenishmentRequest>> {
        let mut tx = self.store.begin().await?;
        tx.list_requests(status).await
    }
}
