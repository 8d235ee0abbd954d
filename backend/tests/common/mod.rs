//! Test fixtures shared by the integration tests

#![allow(dead_code)]

use retail_inventory_backend::services::LedgerService;
use retail_inventory_backend::store::MemoryInventoryStore;
use rust_decimal::Decimal;
use shared::{Product, Store, StoreType};
use uuid::Uuid;

pub fn store(name: &str, store_type: StoreType) -> Store {
    Store {
        id: Uuid::new_v4(),
        name: name.to_string(),
        address: format!("{} street", name),
        store_type,
    }
}

pub fn product(name: &str, cents: i64) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price: Decimal::new(cents, 2),
        description: None,
        category: Some("general".to_string()),
    }
}

/// Backend with one sales store, one warehouse and three products
pub struct Fixture {
    pub backend: MemoryInventoryStore,
    pub shop: Store,
    pub warehouse: Store,
    pub p1: Product,
    pub p2: Product,
    pub p3: Product,
}

impl Fixture {
    pub async fn new() -> Self {
        let backend = MemoryInventoryStore::new();
        let shop = store("s1", StoreType::Sales);
        let warehouse = store("w1", StoreType::Logistics);
        let p1 = product("Apple", 150);
        let p2 = product("Bread", 325);
        let p3 = product("Coffee", 999);

        for s in [&shop, &warehouse] {
            backend.add_store(s.clone()).await;
        }
        for p in [&p1, &p2, &p3] {
            backend.add_product(p.clone()).await;
        }

        Self {
            backend,
            shop,
            warehouse,
            p1,
            p2,
            p3,
        }
    }

    pub fn ledger(&self) -> LedgerService<MemoryInventoryStore> {
        LedgerService::new(self.backend.clone())
    }

    pub async fn add_store(&self, name: &str, store_type: StoreType) -> Store {
        let s = store(name, store_type);
        self.backend.add_store(s.clone()).await;
        s
    }

    /// Re-register an existing store under another type
    pub async fn retype_store(&self, store: &Store, store_type: StoreType) {
        self.backend
            .add_store(Store {
                store_type,
                ..store.clone()
            })
            .await;
    }

    pub async fn add_product(&self, name: &str, cents: i64) -> Product {
        let p = product(name, cents);
        self.backend.add_product(p.clone()).await;
        p
    }

    pub async fn stock(&self, store_id: Uuid, product_id: Uuid) -> Option<i32> {
        self.ledger().get_stock(store_id, product_id).await.unwrap()
    }

    pub async fn seed(&self, store_id: Uuid, product_id: Uuid, quantity: i32) {
        self.ledger()
            .increment(store_id, product_id, quantity)
            .await
            .unwrap();
    }
}
