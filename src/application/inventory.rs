use serde::Serialize;
use uuid::Uuid;

use crate::domain::catalog::Product;
use crate::domain::collection::Collection;
use crate::domain::order::OrderItem;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockAdjustment {
    pub product_id: Uuid,
    pub before: u32,
    pub after: u32,
}

/// What a fulfillment did to stock.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FulfillmentReport {
    pub adjusted: Vec<StockAdjustment>,
    /// Items whose product no longer exists.
    pub skipped: Vec<Uuid>,
}

/// Take every item's quantity out of stock, never going below zero.
///
/// Items referencing an unknown product are skipped and reported; the rest
/// are still applied.
pub fn apply_fulfillment(products: &mut Collection<Product>, items: &[OrderItem]) -> FulfillmentReport {
    let mut report = FulfillmentReport::default();
    for item in items {
        match products.get_mut(item.product_id) {
            Some(product) => {
                let before = product.stock;
                product.stock = before.saturating_sub(item.quantity);
                if item.quantity > before {
                    log::warn!(
                        "Stock for {} ({}) clamped at zero: had {}, fulfilled {}",
                        product.name,
                        product.id,
                        before,
                        item.quantity
                    );
                }
                report.adjusted.push(StockAdjustment {
                    product_id: item.product_id,
                    before,
                    after: product.stock,
                });
            }
            None => {
                log::warn!(
                    "Skipping fulfillment of '{}': product {} not found",
                    item.product_name,
                    item.product_id
                );
                report.skipped.push(item.product_id);
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;
    use crate::domain::catalog::ProductInput;

    fn stocked(stock: u32) -> Product {
        Product::new(
            ProductInput {
                name: "Widget".into(),
                sku: "W-1".into(),
                category: "parts".into(),
                stock,
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn item(product_id: Uuid, quantity: u32) -> OrderItem {
        OrderItem::new(product_id, "Widget", quantity, BigDecimal::from_str("1.00").unwrap())
            .unwrap()
    }

    #[test]
    fn decrements_stock_by_ordered_quantity() {
        let mut products = Collection::default();
        let widget = stocked(5);
        let id = widget.id;
        products.insert(widget);

        let report = apply_fulfillment(&mut products, &[item(id, 2)]);

        assert_eq!(products.get(id).unwrap().stock, 3);
        assert_eq!(
            report.adjusted,
            vec![StockAdjustment {
                product_id: id,
                before: 5,
                after: 3
            }]
        );
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn stock_is_clamped_at_zero() {
        for (stock, quantity) in [(0, 1), (3, 3), (3, 4), (1, u32::MAX)] {
            let mut products = Collection::default();
            let widget = stocked(stock);
            let id = widget.id;
            products.insert(widget);

            apply_fulfillment(&mut products, &[item(id, quantity)]);

            assert_eq!(
                products.get(id).unwrap().stock,
                stock.saturating_sub(quantity)
            );
        }
    }

    #[test]
    fn unknown_product_is_skipped_and_others_still_applied() {
        let mut products = Collection::default();
        let widget = stocked(10);
        let id = widget.id;
        products.insert(widget);
        let ghost = Uuid::new_v4();

        let report = apply_fulfillment(&mut products, &[item(ghost, 4), item(id, 4)]);

        assert_eq!(report.skipped, vec![ghost]);
        assert_eq!(report.adjusted.len(), 1);
        assert_eq!(products.get(id).unwrap().stock, 6);
    }

    #[test]
    fn repeated_product_lines_accumulate() {
        let mut products = Collection::default();
        let widget = stocked(10);
        let id = widget.id;
        products.insert(widget);

        apply_fulfillment(&mut products, &[item(id, 3), item(id, 4)]);

        assert_eq!(products.get(id).unwrap().stock, 3);
    }
}
