//! Stock ledger tests
//!
//! Tests for the stock ledger including:
//! - Non-negativity under arbitrary increment/decrement sequences
//! - Low-stock threshold boundary
//! - Central stock aggregation and pagination

mod common;

use common::Fixture;
use proptest::prelude::*;
use retail_inventory_backend::AppError;
use shared::StoreType;

// ============================================================================
// Unit Tests
// ============================================================================

#[tokio::test]
async fn test_increment_creates_then_adds() {
    let f = Fixture::new().await;
    let ledger = f.ledger();

    assert_eq!(f.stock(f.shop.id, f.p1.id).await, None);
    assert_eq!(ledger.increment(f.shop.id, f.p1.id, 7).await.unwrap(), 7);
    assert_eq!(ledger.increment(f.shop.id, f.p1.id, 3).await.unwrap(), 10);
    assert_eq!(f.stock(f.shop.id, f.p1.id).await, Some(10));
}

#[tokio::test]
async fn test_decrement_beyond_stock_fails_and_leaves_quantity() {
    let f = Fixture::new().await;
    let ledger = f.ledger();
    f.seed(f.shop.id, f.p1.id, 4).await;

    let err = ledger.decrement(f.shop.id, f.p1.id, 5).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(f.stock(f.shop.id, f.p1.id).await, Some(4));

    assert_eq!(ledger.decrement(f.shop.id, f.p1.id, 4).await.unwrap(), 0);
    assert_eq!(f.stock(f.shop.id, f.p1.id).await, Some(0));
}

#[tokio::test]
async fn test_decrement_of_absent_row_fails() {
    let f = Fixture::new().await;
    let err = f.ledger().decrement(f.shop.id, f.p2.id, 1).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(f.stock(f.shop.id, f.p2.id).await, None);
}

#[tokio::test]
async fn test_non_positive_quantities_are_rejected() {
    let f = Fixture::new().await;
    let ledger = f.ledger();

    for qty in [0, -1] {
        assert!(matches!(
            ledger.increment(f.shop.id, f.p1.id, qty).await,
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            ledger.decrement(f.shop.id, f.p1.id, qty).await,
            Err(AppError::Validation { .. })
        ));
    }
    assert_eq!(f.stock(f.shop.id, f.p1.id).await, None);
}

#[tokio::test]
async fn test_below_threshold_is_strict() {
    let f = Fixture::new().await;
    f.seed(f.shop.id, f.p1.id, 5).await;
    f.seed(f.shop.id, f.p2.id, 4).await;
    f.seed(f.warehouse.id, f.p3.id, 100).await;

    let low = f.ledger().find_below_threshold(5).await.unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].product_id, f.p2.id);
    assert_eq!(low[0].quantity, 4);
}

#[tokio::test]
async fn test_find_all_for_store() {
    let f = Fixture::new().await;
    f.seed(f.shop.id, f.p1.id, 1).await;
    f.seed(f.shop.id, f.p2.id, 2).await;
    f.seed(f.warehouse.id, f.p1.id, 50).await;

    let rows = f.ledger().find_all_for_store(f.shop.id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.store_id == f.shop.id));
}

#[tokio::test]
async fn test_warehouse_stock_sums_logistics_only() {
    let f = Fixture::new().await;
    let w2 = f.add_store("w2", StoreType::Logistics).await;
    let hq = f.add_store("hq", StoreType::Headquarter).await;

    f.seed(f.warehouse.id, f.p1.id, 100).await;
    f.seed(w2.id, f.p1.id, 20).await;
    f.seed(f.warehouse.id, f.p2.id, 5).await;
    f.seed(f.shop.id, f.p1.id, 999).await;
    f.seed(hq.id, f.p3.id, 999).await;

    let stock = f.ledger().find_warehouse_stock(None, None).await.unwrap();
    assert_eq!(stock.total, 2);
    assert_eq!(stock.items.len(), 2);
    // ordered by product name
    assert_eq!(stock.items[0].name, "Apple");
    assert_eq!(stock.items[0].stock, 120);
    assert_eq!(stock.items[1].name, "Bread");
    assert_eq!(stock.items[1].stock, 5);
}

#[tokio::test]
async fn test_warehouse_stock_pagination() {
    let f = Fixture::new().await;
    for p in [&f.p1, &f.p2, &f.p3] {
        f.seed(f.warehouse.id, p.id, 10).await;
    }
    let ledger = f.ledger();

    let first = ledger.find_warehouse_stock(Some(1), Some(2)).await.unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(
        first.items.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
        vec!["Apple", "Bread"]
    );

    let second = ledger.find_warehouse_stock(Some(2), Some(2)).await.unwrap();
    assert_eq!(second.total, 3);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].name, "Coffee");

    assert!(matches!(
        ledger.find_warehouse_stock(Some(0), Some(2)).await,
        Err(AppError::Validation { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_decrements_never_oversell() {
    let f = Fixture::new().await;
    f.seed(f.shop.id, f.p1.id, 10).await;

    let mut handles = Vec::new();
    for _ in 0..25 {
        let ledger = f.ledger();
        let (store_id, product_id) = (f.shop.id, f.p1.id);
        handles.push(tokio::spawn(async move {
            ledger.decrement(store_id, product_id, 1).await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(q) => {
                assert!(q >= 0);
                succeeded += 1;
            }
            Err(AppError::InsufficientStock(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 10);
    assert_eq!(f.stock(f.shop.id, f.p1.id).await, Some(0));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Inc(i32),
    Dec(i32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![(1i32..50).prop_map(Op::Inc), (1i32..50).prop_map(Op::Dec)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Quantity is never negative and always matches a saturating model
    #[test]
    fn prop_quantity_never_negative(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let f = Fixture::new().await;
            let ledger = f.ledger();
            let mut model: i32 = 0;

            for op in &ops {
                match op {
                    Op::Inc(n) => {
                        model += n;
                        assert_eq!(ledger.increment(f.shop.id, f.p1.id, *n).await.unwrap(), model);
                    }
                    Op::Dec(n) => {
                        let result = ledger.decrement(f.shop.id, f.p1.id, *n).await;
                        if *n <= model {
                            model -= n;
                            assert_eq!(result.unwrap(), model);
                        } else {
                            assert!(matches!(result, Err(AppError::InsufficientStock(_))));
                        }
                    }
                }
                let observed = f.stock(f.shop.id, f.p1.id).await.unwrap_or(0);
                assert!(observed >= 0);
                assert_eq!(observed, model);
            }
        });
    }
}
