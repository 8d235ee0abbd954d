//! Shared types and models for the retail inventory platform
//!
//! This crate contains the domain types exchanged between the backend
//! services, the storage layer and API clients.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
