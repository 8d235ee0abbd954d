//! HTTP handlers for sales reports

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::DateWindow;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::{ConsolidatedReport, StockAggregator};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub limit: Option<u32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Sales per store and best selling products for the caller's stores
pub async fn get_consolidated_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ConsolidatedReport>> {
    let limit = query
        .limit
        .unwrap_or(state.config.inventory.top_products_limit);
    let window = DateWindow::new(query.start_date, query.end_date);
    let report = StockAggregator::new(state.store)
        .consolidated(&current_user.scope, limit, &window)
        .await?;
    Ok(Json(report))
}
