//! HTTP surface tests
//!
//! Requests rejected before any database access: authentication,
//! input validation and store access checks.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use retail_inventory_backend::config::{
    Config, DatabaseConfig, InventoryConfig, JwtConfig, ServerConfig,
};
use retail_inventory_backend::middleware::auth::Claims;
use retail_inventory_backend::store::PgInventoryStore;
use retail_inventory_backend::{create_app, AppState};
use serde_json::{json, Value};
use shared::UserRole;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test-secret";

fn app() -> Router {
    let config = Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://localhost/unused".to_string(),
            max_connections: 1,
            min_connections: 0,
        },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
        },
        inventory: InventoryConfig::default(),
    };
    // never connects: every request below is answered before a query runs
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .unwrap();

    create_app(AppState {
        store: PgInventoryStore::new(pool),
        config: Arc::new(config),
    })
}

fn token(role: UserRole, store_ids: Vec<Uuid>) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4(),
        role,
        store_ids,
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn post_sale(bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/sales")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn error_code(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    body["error"]["code"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let body = json!({ "storeId": Uuid::new_v4(), "items": [] });
    let response = app().oneshot(post_sale(None, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_forged_token_is_unauthorized() {
    let body = json!({ "storeId": Uuid::new_v4(), "items": [] });
    let response = app()
        .oneshot(post_sale(Some("not-a-jwt"), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_sale_is_bad_request() {
    let store_id = Uuid::new_v4();
    let bearer = token(UserRole::Seller, vec![store_id]);
    let body = json!({ "storeId": store_id, "items": [] });

    let response = app()
        .oneshot(post_sale(Some(&bearer), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_non_positive_line_is_bad_request() {
    let store_id = Uuid::new_v4();
    let bearer = token(UserRole::Admin, vec![]);
    let body = json!({
        "storeId": store_id,
        "items": [{ "productId": Uuid::new_v4(), "quantity": 0 }]
    });

    let response = app()
        .oneshot(post_sale(Some(&bearer), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_seller_cannot_sell_for_foreign_store() {
    let bearer = token(UserRole::Seller, vec![Uuid::new_v4()]);
    let body = json!({
        "storeId": Uuid::new_v4(),
        "items": [{ "productId": Uuid::new_v4(), "quantity": 1 }]
    });

    let response = app()
        .oneshot(post_sale(Some(&bearer), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(response).await, "INSUFFICIENT_PERMISSIONS");
}
