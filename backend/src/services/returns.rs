//! Return processing: reverses a sale

use shared::Sale;
use uuid::Uuid;

use super::ledger;
use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, StoreTx};

/// Return service
#[derive(Clone)]
pub struct ReturnService<S> {
    store: S,
}

impl<S: InventoryStore> ReturnService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Restore the stock consumed by a sale and delete the sale.
    ///
    /// Runs in one transaction: on error neither stock nor the sale change.
    pub async fn process_return(&self, sale_id: Uuid) -> AppResult<Sale> {
        let mut tx = self.store.begin().await?;

        let sale = tx
            .find_sale(sale_id)
            .await?
            .ok_or(AppError::SaleNotFound(sale_id))?;

        for item in &sale.sale_items {
            ledger::increment(&mut tx, sale.store_id, item.product_id, item.quantity).await?;
        }

        if !tx.delete_sale(sale_id).await? {
            return Err(AppError::SaleNotFound(sale_id));
        }

        tx.commit().await?;

        tracing::info!(
            "Sale {} returned: {} unit(s) restored to store {}",
            sale_id,
            sale.total_quantity(),
            sale.store_id
        );
        Ok(sale)
    }
}
