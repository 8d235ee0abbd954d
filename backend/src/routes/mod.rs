//! Route definitions for the retail inventory platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/logistics", logistics_routes())
        .nest("/sales", sales_routes())
        .route("/returns/:sale_id", post(handlers::process_return))
        .nest("/stock", stock_routes())
        .route("/reports/consolidated", get(handlers::get_consolidated_report))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        .merge(protected)
}

/// Replenishment and alert routes (protected)
fn logistics_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/replenishment",
            get(handlers::list_replenishments).post(handlers::create_replenishment),
        )
        .route("/replenishment/:request_id", get(handlers::get_replenishment))
        .route(
            "/replenishment/:request_id/approve",
            post(handlers::approve_replenishment),
        )
        .route("/alerts", get(handlers::get_stock_alerts))
}

/// Sale routes (protected)
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::record_sale))
        .route("/:sale_id", get(handlers::get_sale))
}

/// Stock view routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/central", get(handlers::get_central_stock))
        .route("/store/:store_id", get(handlers::get_store_stock))
}
