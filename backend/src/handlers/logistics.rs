//! HTTP handlers for replenishment and stock alerts

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{CreateReplenishmentInput, ReplenishmentRequest, RequestStatus, StoreStock};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ReplenishmentService;
use crate::AppState;

fn service(state: &AppState) -> ReplenishmentService<crate::store::PgInventoryStore> {
    ReplenishmentService::new(state.store.clone())
        .with_critical_threshold(state.config.inventory.low_stock_threshold)
}

/// Create a replenishment request for a sales store
pub async fn create_replenishment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateReplenishmentInput>,
) -> AppResult<Json<ReplenishmentRequest>> {
    input.validate()?;
    current_user.require_store(input.store_id)?;
    let request = service(&state)
        .request(input.store_id, input.product_id, input.quantity)
        .await?;
    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
pub struct ReplenishmentFilter {
    pub status: Option<RequestStatus>,
}

/// List replenishment requests
pub async fn list_replenishments(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<ReplenishmentFilter>,
) -> AppResult<Json<Vec<ReplenishmentRequest>>> {
    let requests = service(&state).list_requests(filter.status).await?;
    Ok(Json(requests))
}

/// Get a replenishment request
pub async fn get_replenishment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<ReplenishmentRequest>> {
    let request = service(&state).get_request(request_id).await?;
    Ok(Json(request))
}

/// Approve a replenishment request and transfer the stock
pub async fn approve_replenishment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<ReplenishmentRequest>> {
    let request = service(&state).approve(request_id).await?;
    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub threshold: Option<i32>,
}

/// Stock rows below the critical threshold
pub async fn get_stock_alerts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<AlertQuery>,
) -> AppResult<Json<Vec<StoreStock>>> {
    let rows = service(&state).check_critical_stock(query.threshold).await?;
    Ok(Json(rows))
}
