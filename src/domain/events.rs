use serde_json::{json, Value};
use uuid::Uuid;

use super::order::{Order, OrderStatus};

/// State changes published through the transactional outbox.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    Placed,
    StatusChanged {
        from: OrderStatus,
        to: OrderStatus,
        actor_id: Uuid,
    },
    HubAssigned {
        actor_id: Uuid,
    },
}

impl OrderEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Placed => "OrderPlaced",
            OrderEvent::StatusChanged { .. } => "OrderStatusChanged",
            OrderEvent::HubAssigned { .. } => "OrderHubAssigned",
        }
    }

    /// JSON body stored in the outbox row for `order` after the change.
    pub fn payload(&self, order: &Order) -> Value {
        match self {
            OrderEvent::Placed => {
                let items: Vec<Value> = order
                    .items
                    .iter()
                    .map(|i| {
                        json!({
                            "product_id": i.product_id,
                            "quantity": i.quantity,
                            "price_at_purchase": i.price_at_purchase.to_string()
                        })
                    })
                    .collect();
                json!({
                    "order_id": order.id,
                    "customer_id": order.customer_id,
                    "status": order.status,
                    "payment_type": order.payment_type,
                    "distribution_hub_id": order.distribution_hub_id,
                    "total": order.pricing.total.to_string(),
                    "items": items
                })
            }
            OrderEvent::StatusChanged { from, to, actor_id } => json!({
                "order_id": order.id,
                "customer_id": order.customer_id,
                "from": from,
                "status": to,
                "actor_id": actor_id,
                "distribution_hub_id": order.distribution_hub_id,
                "at": order.updated_at
            }),
            OrderEvent::HubAssigned { actor_id } => json!({
                "order_id": order.id,
                "distribution_hub_id": order.distribution_hub_id,
                "actor_id": actor_id,
                "at": order.updated_at
            }),
        }
    }
}
