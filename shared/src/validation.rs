//! Validation utilities for the retail inventory platform

use std::collections::HashMap;

use uuid::Uuid;
use validator::ValidationError;

use crate::models::SaleLineInput;

/// Validate that a stock quantity is strictly positive
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a low-stock threshold
pub fn validate_threshold(threshold: i32) -> Result<(), &'static str> {
    if threshold < 0 {
        return Err("Threshold cannot be negative");
    }
    Ok(())
}

/// Validator hook for sale line items
pub fn validate_sale_lines(lines: &Vec<SaleLineInput>) -> Result<(), ValidationError> {
    if lines.iter().any(|l| validate_quantity(l.quantity).is_err()) {
        let mut err = ValidationError::new("quantity");
        err.message = Some("Quantity must be positive".into());
        return Err(err);
    }
    Ok(())
}

/// Sum requested quantities per product, keeping first-seen order.
///
/// Fails on overflow of the per-product total.
pub fn aggregate_lines(lines: &[SaleLineInput]) -> Result<Vec<(Uuid, i32)>, &'static str> {
    let mut order = Vec::new();
    let mut totals: HashMap<Uuid, i32> = HashMap::new();
    for line in lines {
        let entry = totals.entry(line.product_id).or_insert_with(|| {
            order.push(line.product_id);
            0
        });
        *entry = entry
            .checked_add(line.quantity)
            .ok_or("Quantity out of range")?;
    }
    Ok(order.into_iter().map(|p| (p, totals[&p])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line(product_id: Uuid, quantity: i32) -> SaleLineInput {
        SaleLineInput {
            product_id,
            quantity,
        }
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_aggregate_lines_merges_duplicates_in_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let merged = aggregate_lines(&[line(a, 2), line(b, 1), line(a, 3)]).unwrap();
        assert_eq!(merged, vec![(a, 5), (b, 1)]);
    }

    #[test]
    fn test_aggregate_lines_detects_overflow() {
        let a = Uuid::new_v4();
        assert!(aggregate_lines(&[line(a, i32::MAX), line(a, 1)]).is_err());
    }

    proptest! {
        #[test]
        fn prop_aggregate_preserves_total(quantities in prop::collection::vec(1i32..1000, 1..20)) {
            let products = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
            let lines: Vec<_> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| line(products[i % 3], *q))
                .collect();
            let merged = aggregate_lines(&lines).unwrap();
            let before: i64 = quantities.iter().map(|q| i64::from(*q)).sum();
            let after: i64 = merged.iter().map(|(_, q)| i64::from(*q)).sum();
            prop_assert_eq!(before, after);
            prop_assert!(merged.len() <= 3);
        }
    }
}
