use std::collections::HashMap;

use uuid::Uuid;

use super::order::Order;

/// Canonical form used to compare vendor identifiers coming from different
/// sources (catalog rows, path parameters, actor ids).
pub fn normalize_vendor_id(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Project `order` onto the line items sold by `vendor_id`.
///
/// `vendors` maps product ids to their vendor as reported by the catalog.
/// Items whose product is missing from the map are dropped. Every other field
/// of the order is copied unchanged; an empty `items` list means the order
/// is not relevant to this vendor.
pub fn filter_items_by_vendor(
    order: &Order,
    vendor_id: &str,
    vendors: &HashMap<Uuid, String>,
) -> Order {
    let wanted = normalize_vendor_id(vendor_id);
    let items = order
        .items
        .iter()
        .filter(|item| {
            vendors
                .get(&item.product_id)
                .is_some_and(|v| normalize_vendor_id(v) == wanted)
        })
        .cloned()
        .collect();

    Order {
        items,
        ..order.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;
    use crate::domain::order::{NewOrder, OrderItem, PaymentType};

    fn item(quantity: i32, price: &str) -> OrderItem {
        OrderItem {
            product_id: Uuid::new_v4(),
            quantity,
            price_at_purchase: BigDecimal::from_str(price).unwrap(),
        }
    }

    fn mixed_order() -> (Order, HashMap<Uuid, String>) {
        let a1 = item(2, "5.00");
        let b1 = item(1, "7.25");
        let a2 = item(3, "1.10");
        let orphan = item(1, "9.00");

        let mut vendors = HashMap::new();
        vendors.insert(a1.product_id, "Vendor-A".to_string());
        vendors.insert(a2.product_id, "vendor-a ".to_string());
        vendors.insert(b1.product_id, "vendor-b".to_string());

        let order = Order::place(
            NewOrder {
                customer_id: Uuid::new_v4(),
                items: vec![a1, b1, a2, orphan],
                delivery_information_id: Uuid::new_v4(),
                payment_type: PaymentType::Cash,
                shipping_fee: BigDecimal::from(2),
                distribution_hub_id: None,
                declared_total: None,
            },
            Utc::now(),
        )
        .unwrap();
        (order, vendors)
    }

    #[test]
    fn keeps_only_the_vendors_items_in_order() {
        let (order, vendors) = mixed_order();
        let view = filter_items_by_vendor(&order, "vendor-a", &vendors);

        assert_eq!(view.items, vec![order.items[0].clone(), order.items[2].clone()]);
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.items[1].price_at_purchase, BigDecimal::from_str("1.10").unwrap());
        assert_eq!(view.id, order.id);
        assert_eq!(view.pricing, order.pricing);
        assert_eq!(view.status, order.status);
    }

    #[test]
    fn is_idempotent_and_leaves_order_untouched() {
        let (order, vendors) = mixed_order();
        let before = order.clone();

        let first = filter_items_by_vendor(&order, "VENDOR-B", &vendors);
        let second = filter_items_by_vendor(&order, "VENDOR-B", &vendors);
        let again = filter_items_by_vendor(&first, "VENDOR-B", &vendors);

        assert_eq!(first, second);
        assert_eq!(first, again);
        assert_eq!(order, before);
        assert_eq!(first.items.len(), 1);
    }

    #[test]
    fn unknown_vendor_gets_no_items() {
        let (order, vendors) = mixed_order();
        assert!(filter_items_by_vendor(&order, "vendor-c", &vendors).items.is_empty());
        assert!(filter_items_by_vendor(&order, "vendor-a", &HashMap::new())
            .items
            .is_empty());
    }
}
