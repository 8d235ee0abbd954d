//! Caller identity and store access scoping

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;

/// Role of an authenticated caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Sees every store
    Admin,
    Manager,
    Seller,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Manager => "MANAGER",
            UserRole::Seller => "SELLER",
        }
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "MANAGER" => Ok(UserRole::Manager),
            "SELLER" => Ok(UserRole::Seller),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

/// Authenticated caller as provided by the identity layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallerContext {
    pub user_id: Uuid,
    pub role: UserRole,
    pub accessible_store_ids: Vec<Uuid>,
}

/// Set of stores a caller may read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreScope {
    All,
    Stores(Vec<Uuid>),
}

/// Access scope computed once per request and passed to every
/// store-filtered query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessScope {
    pub user_id: Uuid,
    pub stores: StoreScope,
}

impl AccessScope {
    /// Scope with access to every store
    pub fn unrestricted(user_id: Uuid) -> Self {
        Self {
            user_id,
            stores: StoreScope::All,
        }
    }

    /// Scope limited to the given stores
    pub fn for_stores(user_id: Uuid, store_ids: impl IntoIterator<Item = Uuid>) -> Self {
        let mut ids: Vec<Uuid> = store_ids.into_iter().collect();
        ids.sort();
        ids.dedup();
        Self {
            user_id,
            stores: StoreScope::Stores(ids),
        }
    }

    pub fn allows(&self, store_id: Uuid) -> bool {
        match &self.stores {
            StoreScope::All => true,
            StoreScope::Stores(ids) => ids.binary_search(&store_id).is_ok(),
        }
    }

    /// Explicit store ids, or `None` when unrestricted
    pub fn store_ids(&self) -> Option<&[Uuid]> {
        match &self.stores {
            StoreScope::All => None,
            StoreScope::Stores(ids) => Some(ids),
        }
    }
}

impl From<&CallerContext> for AccessScope {
    fn from(caller: &CallerContext) -> Self {
        match caller.role {
            UserRole::Admin => AccessScope::unrestricted(caller.user_id),
            UserRole::Manager | UserRole::Seller => {
                AccessScope::for_stores(caller.user_id, caller.accessible_store_ids.iter().copied())
            }
        }
    }
}
