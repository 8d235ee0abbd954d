//! Business logic services for the retail inventory platform

use shared::DateWindow;

use crate::error::{AppError, AppResult};

pub mod ledger;
pub mod replenishment;
pub mod returns;
pub mod sale;
pub mod stock;

pub use ledger::LedgerService;
pub use replenishment::ReplenishmentService;
pub use returns::ReturnService;
pub use sale::SaleService;
pub use stock::{ConsolidatedReport, StockAggregator};

/// Reject windows whose start lies after their end
pub(crate) fn check_window(window: &DateWindow) -> AppResult<()> {
    if !window.is_ordered() {
        return Err(AppError::validation(
            "startDate",
            "Start date must not be after end date",
        ));
    }
    Ok(())
}
