//! HTTP handlers for returns

use axum::{
    extract::{Path, State},
    Json,
};
use shared::Sale;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::{ReturnService, SaleService};
use crate::AppState;

/// Process the return of a whole sale
pub async fn process_return(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Sale>> {
    let sale = SaleService::new(state.store.clone())
        .get_by_id(sale_id)
        .await?
        .ok_or(AppError::SaleNotFound(sale_id))?;
    current_user.require_store(sale.store_id)?;

    let returned = ReturnService::new(state.store).process_return(sale_id).await?;
    Ok(Json(returned))
}
