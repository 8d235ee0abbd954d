//! HTTP handlers for stock views

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{CentralStock, StoreStock};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::StockAggregator;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Central (logistics) stock per product
pub async fn get_central_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<CentralStock>> {
    let stock = StockAggregator::new(state.store)
        .with_default_page_size(state.config.inventory.default_page_size)
        .central_stock(query.page, query.limit)
        .await?;
    Ok(Json(stock))
}

/// Stock rows of one store
pub async fn get_store_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<StoreStock>>> {
    let rows = StockAggregator::new(state.store)
        .store_stock(&current_user.scope, store_id)
        .await?;
    Ok(Json(rows))
}
