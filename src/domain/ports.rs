use std::collections::HashMap;

use uuid::Uuid;

use super::errors::DomainError;
use super::events::OrderEvent;
use super::order::{ListResult, Order, OrderStatus};

pub trait OrderRepository: Send + Sync + 'static {
    /// Insert a freshly placed order together with its outbox event.
    fn create(&self, order: &Order, event: &OrderEvent) -> Result<(), DomainError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;

    /// Persist `order` only if the stored version still equals
    /// `expected_version`, i.e. nothing was written since it was read.
    ///
    /// Returns `Conflict` when another writer got there first and `NotFound`
    /// when the order does not exist.
    fn save_if_version(
        &self,
        order: &Order,
        expected_version: i32,
        event: &OrderEvent,
    ) -> Result<(), DomainError>;

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;

    fn find_by_hub(
        &self,
        hub_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError>;

    fn find_by_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, DomainError>;

    /// Orders with at least one item referencing one of `product_ids`.
    fn find_containing_products(&self, product_ids: &[Uuid]) -> Result<Vec<Order>, DomainError>;
}

/// Read access to the product catalog owned by another subsystem.
pub trait ProductCatalog: Send + Sync + 'static {
    /// Vendor of each known product in `product_ids`. Unknown ids are absent.
    fn vendors_of(&self, product_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError>;

    fn products_of_vendor(&self, vendor_id: &str) -> Result<Vec<Uuid>, DomainError>;
}
