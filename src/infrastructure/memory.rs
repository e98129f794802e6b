//! Process-local adapters backed by mutex-guarded maps.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::events::OrderEvent;
use crate::domain::order::{page_offset, ListResult, Order, OrderStatus};
use crate::domain::ports::{OrderRepository, ProductCatalog};
use crate::domain::vendor::normalize_vendor_id;

#[derive(Default)]
struct Tables {
    orders: HashMap<Uuid, Order>,
    outbox: Vec<(Uuid, String)>,
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    tables: Mutex<Tables>,
}

impl InMemoryOrderRepository {
    /// Event types written to the outbox for `order_id`, oldest first.
    pub fn events_for(&self, order_id: Uuid) -> Vec<String> {
        self.lock()
            .map(|t| {
                t.outbox
                    .iter()
                    .filter(|(id, _)| *id == order_id)
                    .map(|(_, event)| event.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, DomainError> {
        self.tables
            .lock()
            .map_err(|e| DomainError::Internal(format!("order store poisoned: {e}")))
    }

    fn select(&self, keep: impl Fn(&Order) -> bool) -> Result<Vec<Order>, DomainError> {
        let tables = self.lock()?;
        let mut orders: Vec<Order> = tables.orders.values().filter(|o| keep(o)).cloned().collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(orders)
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: &Order, event: &OrderEvent) -> Result<(), DomainError> {
        let mut tables = self.lock()?;
        if tables.orders.contains_key(&order.id) {
            return Err(DomainError::Internal(format!(
                "order {} already exists",
                order.id
            )));
        }
        tables.orders.insert(order.id, order.clone());
        tables.outbox.push((order.id, event.event_type().to_string()));
        Ok(())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.lock()?.orders.get(&id).cloned())
    }

    fn save_if_version(
        &self,
        order: &Order,
        expected_version: i32,
        event: &OrderEvent,
    ) -> Result<(), DomainError> {
        let mut tables = self.lock()?;
        let stored = tables.orders.get_mut(&order.id).ok_or(DomainError::NotFound)?;
        if stored.version != expected_version {
            return Err(DomainError::Conflict);
        }
        *stored = order.clone();
        tables.outbox.push((order.id, event.event_type().to_string()));
        Ok(())
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let all = self.select(|_| true)?;
        let total = all.len() as i64;
        let Some(offset) = page_offset(page, limit).and_then(|o| usize::try_from(o).ok()) else {
            return Ok(ListResult { items: vec![], total });
        };
        let items = all
            .into_iter()
            .skip(offset)
            .take(usize::try_from(limit).unwrap_or(0))
            .collect();
        Ok(ListResult { items, total })
    }

    fn find_by_hub(
        &self,
        hub_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        self.select(|o| {
            o.distribution_hub_id == Some(hub_id) && status.map_or(true, |s| o.status == s)
        })
    }

    fn find_by_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        self.select(|o| o.customer_id == customer_id)
    }

    fn find_containing_products(&self, product_ids: &[Uuid]) -> Result<Vec<Order>, DomainError> {
        self.select(|o| o.items.iter().any(|i| product_ids.contains(&i.product_id)))
    }
}

#[derive(Default)]
pub struct InMemoryProductCatalog {
    vendors: Mutex<HashMap<Uuid, String>>,
}

impl InMemoryProductCatalog {
    pub fn insert(&self, product_id: Uuid, vendor_id: &str) {
        if let Ok(mut vendors) = self.vendors.lock() {
            vendors.insert(product_id, vendor_id.to_string());
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, String>>, DomainError> {
        self.vendors
            .lock()
            .map_err(|e| DomainError::Internal(format!("catalog poisoned: {e}")))
    }
}

impl ProductCatalog for InMemoryProductCatalog {
    fn vendors_of(&self, product_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError> {
        let vendors = self.lock()?;
        Ok(product_ids
            .iter()
            .filter_map(|id| vendors.get(id).map(|v| (*id, v.clone())))
            .collect())
    }

    fn products_of_vendor(&self, vendor_id: &str) -> Result<Vec<Uuid>, DomainError> {
        let wanted = normalize_vendor_id(vendor_id);
        Ok(self
            .lock()?
            .iter()
            .filter(|(_, v)| normalize_vendor_id(v) == wanted)
            .map(|(id, _)| *id)
            .collect())
    }
}
