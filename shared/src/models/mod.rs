//! Domain models for the retail inventory platform

mod access;
mod product;
mod replenishment;
mod sale;
mod stock;
mod store;

pub use access::*;
pub use product::*;
pub use replenishment::*;
pub use sale::*;
pub use stock::*;
pub use store::*;

/// Error returned when a persisted enum label cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
