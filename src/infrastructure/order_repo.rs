use std::str::FromStr;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::events::OrderEvent;
use crate::domain::order::{
    page_offset, ListResult, Order, OrderItem, OrderStatus, PaymentType, Pricing,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{commerce_order_outbox, order_items, orders};

use super::models::{NewOrderItemRow, NewOutboxEventRow, OrderItemRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Row mapping ──────────────────────────────────────────────────────────────

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        OrderRow {
            id: order.id,
            customer_id: order.customer_id,
            distribution_hub_id: order.distribution_hub_id,
            hub_assigned_at: order.hub_assigned_at,
            hub_assigned_by: order.hub_assigned_by,
            status: order.status.as_str().to_string(),
            payment_type: order.payment_type.as_str().to_string(),
            delivery_information_id: order.delivery_information_id,
            subtotal: order.pricing.subtotal.clone(),
            shipping_fee: order.pricing.shipping_fee.clone(),
            total: order.pricing.total.clone(),
            placed_at: order.placed_at,
            delivered_at: order.delivered_at,
            updated_at: order.updated_at,
            version: order.version,
        }
    }
}

fn to_domain(row: OrderRow, mut items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
    let corrupt = |e: DomainError| DomainError::Internal(format!("order {}: {e}", row.id));
    let status = OrderStatus::from_str(&row.status).map_err(corrupt)?;
    let payment_type = PaymentType::from_str(&row.payment_type).map_err(corrupt)?;

    items.sort_by_key(|i| i.position);

    Ok(Order {
        id: row.id,
        customer_id: row.customer_id,
        items: items
            .into_iter()
            .map(|i| OrderItem {
                product_id: i.product_id,
                quantity: i.quantity,
                price_at_purchase: i.price_at_purchase,
            })
            .collect(),
        distribution_hub_id: row.distribution_hub_id,
        hub_assigned_at: row.hub_assigned_at,
        hub_assigned_by: row.hub_assigned_by,
        status,
        payment_type,
        delivery_information_id: row.delivery_information_id,
        pricing: Pricing {
            subtotal: row.subtotal,
            shipping_fee: row.shipping_fee,
            total: row.total,
        },
        placed_at: row.placed_at,
        delivered_at: row.delivered_at,
        updated_at: row.updated_at,
        version: row.version,
    })
}

/// Attach their items to `rows`, preserving the order of `rows`.
fn with_items(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .load::<OrderItemRow>(conn)?
        .grouped_by(&rows);

    rows.into_iter()
        .zip(items)
        .map(|(row, items)| to_domain(row, items))
        .collect()
}

fn write_outbox(
    conn: &mut PgConnection,
    order: &Order,
    event: &OrderEvent,
) -> Result<(), DomainError> {
    // Debezium's EventRouter SMT derives the Kafka topic from `aggregate_type`.
    diesel::insert_into(commerce_order_outbox::table)
        .values(&NewOutboxEventRow {
            id: Uuid::new_v4(),
            aggregate_type: "Order".to_string(),
            aggregate_id: order.id.to_string(),
            event_type: event.event_type().to_string(),
            payload: event.payload(order),
        })
        .execute(conn)?;
    Ok(())
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: &Order, event: &OrderEvent) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::insert_into(orders::table)
                .values(&OrderRow::from(order))
                .execute(conn)?;

            let new_items: Vec<NewOrderItemRow> = order
                .items
                .iter()
                .enumerate()
                .map(|(position, item)| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    position: position as i32,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price_at_purchase: item.price_at_purchase.clone(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            write_outbox(conn, order, event)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(with_items(&mut conn, vec![row])?.pop())
    }

    fn save_if_version(
        &self,
        order: &Order,
        expected_version: i32,
        event: &OrderEvent,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Items are immutable after placement; only the order row changes.
            let updated = diesel::update(
                orders::table
                    .filter(orders::id.eq(order.id))
                    .filter(orders::version.eq(expected_version)),
            )
            .set(&OrderRow::from(order))
            .execute(conn)?;

            if updated == 0 {
                let exists: bool = diesel::select(diesel::dsl::exists(
                    orders::table.filter(orders::id.eq(order.id)),
                ))
                .get_result(conn)?;
                return Err(if exists {
                    DomainError::Conflict
                } else {
                    DomainError::NotFound
                });
            }

            write_outbox(conn, order, event)
        })
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;
            let Some(offset) = page_offset(page, limit) else {
                return Ok(ListResult {
                    items: vec![],
                    total,
                });
            };

            let rows = orders::table
                .select(OrderRow::as_select())
                .order(orders::placed_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: with_items(conn, rows)?,
                total,
            })
        })
    }

    fn find_by_hub(
        &self,
        hub_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = orders::table
            .filter(orders::distribution_hub_id.eq(hub_id))
            .select(OrderRow::as_select())
            .order(orders::placed_at.desc())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(orders::status.eq(status.as_str()));
        }

        let rows = query.load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn find_by_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::customer_id.eq(customer_id))
            .select(OrderRow::as_select())
            .order(orders::placed_at.desc())
            .load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn find_containing_products(&self, product_ids: &[Uuid]) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(
                orders::id.eq_any(
                    order_items::table
                        .filter(order_items::product_id.eq_any(product_ids))
                        .select(order_items::order_id),
                ),
            )
            .select(OrderRow::as_select())
            .order(orders::placed_at.desc())
            .load(&mut conn)?;
        with_items(&mut conn, rows)
    }
}
