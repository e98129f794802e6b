use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::actor::{Actor, Role};
use crate::domain::errors::DomainError;
use crate::domain::events::OrderEvent;
use crate::domain::fulfillment::{self, order_owner};
use crate::domain::order::{ListResult, NewOrder, Order, OrderStatus};
use crate::domain::ownership::OwnershipGate;
use crate::domain::ports::{OrderRepository, ProductCatalog};
use crate::domain::vendor::{filter_items_by_vendor, normalize_vendor_id};

pub const MAX_PAGE_SIZE: i64 = 100;

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    catalog: Arc<dyn ProductCatalog>,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { repo, catalog }
    }

    /// Place an order on behalf of `input.customer_id`. Admins may place
    /// orders for any customer.
    pub fn create_order(&self, actor: Option<&Actor>, input: NewOrder) -> Result<Order, DomainError> {
        OwnershipGate::new(|n: &NewOrder| Ok::<_, DomainError>(n.customer_id)).check_unless(
            actor,
            &input,
            Actor::is_admin,
        )?;

        let order = Order::place(input, Utc::now())?;
        self.repo.create(&order, &OrderEvent::Placed)?;
        Ok(order)
    }

    pub fn get_order(&self, id: Uuid, actor: Option<&Actor>) -> Result<Order, DomainError> {
        let actor = actor.ok_or(DomainError::Unauthorized)?;
        let order = self.load(id)?;
        OwnershipGate::new(order_owner).check_unless(Some(actor), &order, |a| {
            a.is_admin() || a.works_at(order.distribution_hub_id)
        })?;
        Ok(order)
    }

    /// Move an order to `target`, guarded by the fulfillment rules and a
    /// compare-and-set on the status that was read.
    pub fn transition_order(
        &self,
        id: Uuid,
        target: OrderStatus,
        actor: Option<&Actor>,
    ) -> Result<Order, DomainError> {
        let actor = actor.ok_or(DomainError::Unauthorized)?;
        let current = self.load(id)?;
        let next = fulfillment::transition(&current, target, Some(actor), Utc::now())?;

        let event = OrderEvent::StatusChanged {
            from: current.status,
            to: target,
            actor_id: actor.id,
        };
        self.repo.save_if_version(&next, current.version, &event)?;
        Ok(next)
    }

    pub fn assign_hub(
        &self,
        id: Uuid,
        hub_id: Uuid,
        actor: Option<&Actor>,
    ) -> Result<Order, DomainError> {
        let actor = actor.ok_or(DomainError::Unauthorized)?;
        let current = self.load(id)?;
        let next = fulfillment::assign_hub(&current, hub_id, Some(actor), Utc::now())?;

        let event = OrderEvent::HubAssigned { actor_id: actor.id };
        self.repo.save_if_version(&next, current.version, &event)?;
        Ok(next)
    }

    /// Newest orders first, for the admin dashboard.
    pub fn list_orders(
        &self,
        page: i64,
        limit: i64,
        actor: Option<&Actor>,
    ) -> Result<ListResult, DomainError> {
        let actor = actor.ok_or(DomainError::Unauthorized)?;
        if !actor.is_admin() {
            return Err(DomainError::Forbidden(
                "only admins may list all orders".to_string(),
            ));
        }
        self.repo.list(page.max(1), limit.clamp(1, MAX_PAGE_SIZE))
    }

    pub fn get_orders_for_hub(
        &self,
        hub_id: Uuid,
        status: Option<OrderStatus>,
        actor: Option<&Actor>,
    ) -> Result<Vec<Order>, DomainError> {
        let actor = actor.ok_or(DomainError::Unauthorized)?;
        if !(actor.is_admin() || actor.works_at(Some(hub_id))) {
            return Err(DomainError::Forbidden(format!(
                "actor {} is not staff at hub {hub_id}",
                actor.id
            )));
        }
        self.repo.find_by_hub(hub_id, status)
    }

    pub fn get_orders_for_customer(
        &self,
        customer_id: Uuid,
        actor: Option<&Actor>,
    ) -> Result<Vec<Order>, DomainError> {
        OwnershipGate::new(|id: &Uuid| Ok::<_, DomainError>(*id)).check_unless(
            actor,
            &customer_id,
            Actor::is_admin,
        )?;
        self.repo.find_by_customer(customer_id)
    }

    /// Orders containing products sold by `vendor_id`, each reduced to that
    /// vendor's items.
    pub fn get_orders_for_vendor(
        &self,
        vendor_id: &str,
        actor: Option<&Actor>,
    ) -> Result<Vec<Order>, DomainError> {
        let actor = actor.ok_or(DomainError::Unauthorized)?;
        let is_self = actor.role == Role::Vendor
            && normalize_vendor_id(&actor.id.to_string()) == normalize_vendor_id(vendor_id);
        if !(is_self || actor.is_admin()) {
            return Err(DomainError::Forbidden(format!(
                "actor {} may not view orders of vendor {vendor_id}",
                actor.id
            )));
        }

        let products = self.catalog.products_of_vendor(vendor_id)?;
        if products.is_empty() {
            return Ok(vec![]);
        }
        let orders = self.repo.find_containing_products(&products)?;

        let referenced: Vec<Uuid> = orders
            .iter()
            .flat_map(|o| o.items.iter().map(|i| i.product_id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let vendors = self.catalog.vendors_of(&referenced)?;

        Ok(orders
            .iter()
            .map(|order| filter_items_by_vendor(order, vendor_id, &vendors))
            .filter(|view| !view.items.is_empty())
            .collect())
    }

    fn load(&self, id: Uuid) -> Result<Order, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }
}
