//! Error handling for the retail inventory platform
//!
//! Every service returns `AppResult`; handlers turn errors into a JSON body
//! with a stable error code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::StoreType;
use thiserror::Error;
use uuid::Uuid;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // Missing resources
    #[error("Store not found: {0}")]
    StoreNotFound(Uuid),

    #[error("Replenishment request not found: {0}")]
    RequestNotFound(Uuid),

    #[error("Sale not found: {0}")]
    SaleNotFound(Uuid),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    // Business logic errors
    #[error("Store {store_id} is {actual}, expected {expected}")]
    InvalidStoreType {
        store_id: Uuid,
        expected: StoreType,
        actual: StoreType,
    },

    #[error("{0}")]
    InsufficientStock(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shortfall of a single store's stock
    pub fn insufficient_stock(product_id: Uuid) -> Self {
        AppError::InsufficientStock(format!("Insufficient stock for product {}", product_id))
    }

    /// No logistics store can cover a replenishment
    pub fn insufficient_warehouse_stock(product_id: Uuid, required: i32) -> Self {
        AppError::InsufficientStock(format!(
            "Insufficient stock in logistics stores for product {}. Required: {}",
            product_id, required
        ))
    }

    fn is_server_error(&self) -> bool {
        matches!(
            self,
            AppError::Configuration(_) | AppError::DatabaseError(_) | AppError::Internal(_)
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string());
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("input".to_string(), "Invalid input".to_string()));
        AppError::Validation { field, message }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone()),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INSUFFICIENT_PERMISSIONS",
                    "You do not have access to this store",
                ),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::StoreNotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("STORE_NOT_FOUND", self.to_string()),
            ),
            AppError::RequestNotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("REQUEST_NOT_FOUND", self.to_string()),
            ),
            AppError::SaleNotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("SALE_NOT_FOUND", self.to_string()),
            ),
            AppError::ProductNotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("PRODUCT_NOT_FOUND", self.to_string()),
            ),
            AppError::InvalidStoreType { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new("INVALID_STORE_TYPE", self.to_string()),
            ),
            AppError::InsufficientStock(msg) => (
                StatusCode::CONFLICT,
                ErrorDetail::new("INSUFFICIENT_STOCK", msg.clone()),
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::CONFLICT,
                ErrorDetail::new("INVALID_STATE_TRANSITION", msg.clone()),
            ),
            AppError::Configuration(_) | AppError::DatabaseError(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        if self.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request failed: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for services and handlers
pub type AppResult<T> = Result<T, AppError>;
