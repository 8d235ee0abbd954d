//! HTTP handlers for sales

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::{DateWindow, RecordSaleInput, Sale};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::SaleService;
use crate::AppState;

/// Record a sale
pub async fn record_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordSaleInput>,
) -> AppResult<Json<Sale>> {
    input.validate()?;
    current_user.require_store(input.store_id)?;
    let sale = SaleService::new(state.store)
        .record(input.store_id, &input.items)
        .await?;
    Ok(Json(sale))
}

/// Get a sale by ID
pub async fn get_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Sale>> {
    let sale = SaleService::new(state.store)
        .get_by_id(sale_id)
        .await?
        .ok_or(AppError::SaleNotFound(sale_id))?;
    current_user.require_store(sale.store_id)?;
    Ok(Json(sale))
}

/// List sales of the caller's stores
pub async fn list_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(window): Query<DateWindow>,
) -> AppResult<Json<Vec<Sale>>> {
    let sales = SaleService::new(state.store)
        .list(&current_user.scope, &window)
        .await?;
    Ok(Json(sales))
}
