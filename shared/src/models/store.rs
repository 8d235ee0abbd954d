//! Store models

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;

/// A physical location holding stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub store_type: StoreType,
}

/// Category of a store. Fixed for the lifetime of the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreType {
    /// Point of sale, consumes stock and receives replenishment
    Sales,
    /// Warehouse holding central stock
    Logistics,
    Headquarter,
}

impl StoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreType::Sales => "SALES",
            StoreType::Logistics => "LOGISTICS",
            StoreType::Headquarter => "HEADQUARTER",
        }
    }
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SALES" => Ok(StoreType::Sales),
            "LOGISTICS" => Ok(StoreType::Logistics),
            "HEADQUARTER" => Ok(StoreType::Headquarter),
            other => Err(UnknownVariant::new("store type", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_type_labels_round_trip() {
        for t in [StoreType::Sales, StoreType::Logistics, StoreType::Headquarter] {
            assert_eq!(t.as_str().parse::<StoreType>().unwrap(), t);
        }
        assert!("WAREHOUSE".parse::<StoreType>().is_err());
    }

    #[test]
    fn test_store_type_serializes_as_type_field() {
        let store = Store {
            id: Uuid::nil(),
            name: "Downtown".to_string(),
            address: "1 Main St".to_string(),
            store_type: StoreType::Sales,
        };
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["type"], "SALES");
    }
}
