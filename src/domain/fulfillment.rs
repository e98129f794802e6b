//! Order fulfillment state machine.
//!
//! ```text
//! placed ──► paid ──► at_hub ──► out_for_delivery ──► delivered
//!   │  └──────────────►  │              │
//!   └──────┴─────────────┴──────────────┴──────────► cancelled
//! ```
//!
//! `delivered` and `cancelled` are terminal. [`transition`] only computes the
//! next state; persisting it with a compare-and-set on the previous status is
//! the caller's job.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::actor::{Actor, Role};
use super::errors::DomainError;
use super::order::{Order, OrderStatus};
use super::ownership::OwnershipGate;

/// Statuses reachable in one step from `from`.
pub fn allowed_targets(from: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match from {
        Placed => &[Paid, AtHub, Cancelled],
        Paid => &[AtHub, Cancelled],
        AtHub => &[OutForDelivery, Cancelled],
        OutForDelivery => &[Delivered, Cancelled],
        Delivered | Cancelled => &[],
    }
}

pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_targets(from).contains(&to)
}

pub fn is_terminal(status: OrderStatus) -> bool {
    allowed_targets(status).is_empty()
}

/// Owner resolver for orders, usable with [`OwnershipGate`].
pub fn order_owner(order: &Order) -> Result<Uuid, DomainError> {
    Ok(order.customer_id)
}

/// Check whether `actor` may move `order` to `target`. The edge itself is
/// assumed to be legal.
pub fn authorize(order: &Order, target: OrderStatus, actor: &Actor) -> Result<(), DomainError> {
    let hub_staff = actor.works_at(order.distribution_hub_id);

    match target {
        OrderStatus::Paid => {
            if actor.is_admin() || actor.role == Role::System {
                Ok(())
            } else {
                Err(forbidden(actor, target))
            }
        }
        OrderStatus::AtHub | OrderStatus::OutForDelivery | OrderStatus::Delivered => {
            if hub_staff || actor.is_admin() {
                Ok(())
            } else {
                Err(forbidden(actor, target))
            }
        }
        OrderStatus::Cancelled => match order.status {
            OrderStatus::Placed | OrderStatus::Paid | OrderStatus::AtHub => {
                OwnershipGate::new(order_owner)
                    .check_unless(Some(actor), order, |a| a.is_admin() || hub_staff)
            }
            // Failed delivery: only the hub or an admin can call it off.
            _ if hub_staff || actor.is_admin() => Ok(()),
            _ => Err(forbidden(actor, target)),
        },
        OrderStatus::Placed => Err(forbidden(actor, target)),
    }
}

/// Compute the order that results from moving `order` to `target`.
///
/// Fails with `Unauthorized` without an actor, `InvalidTransition` for an
/// edge not in the graph and `Forbidden` when the actor may not take it.
pub fn transition(
    order: &Order,
    target: OrderStatus,
    actor: Option<&Actor>,
    now: DateTime<Utc>,
) -> Result<Order, DomainError> {
    let actor = actor.ok_or(DomainError::Unauthorized)?;

    if !can_transition(order.status, target) {
        return Err(DomainError::InvalidTransition {
            from: order.status,
            to: target,
        });
    }
    authorize(order, target, actor)?;

    let mut next = order.clone();
    next.status = target;
    next.updated_at = now;
    next.version = order.version + 1;

    match target {
        OrderStatus::Delivered => next.delivered_at = Some(now),
        OrderStatus::AtHub if next.hub_assigned_at.is_none() => {
            next.hub_assigned_at = Some(now);
            next.hub_assigned_by = Some(actor.id);
        }
        _ => {}
    }

    Ok(next)
}

/// Point `order` at another distribution hub. Admin only, and only before
/// the parcel has reached a hub.
pub fn assign_hub(
    order: &Order,
    hub_id: Uuid,
    actor: Option<&Actor>,
    now: DateTime<Utc>,
) -> Result<Order, DomainError> {
    let actor = actor.ok_or(DomainError::Unauthorized)?;

    if !matches!(order.status, OrderStatus::Placed | OrderStatus::Paid) {
        return Err(DomainError::InvalidTransition {
            from: order.status,
            to: order.status,
        });
    }
    if !actor.is_admin() {
        return Err(DomainError::Forbidden(format!(
            "{} {} may not assign hubs",
            actor.role.as_str(),
            actor.id
        )));
    }

    let mut next = order.clone();
    next.distribution_hub_id = Some(hub_id);
    next.updated_at = now;
    next.version = order.version + 1;
    Ok(next)
}

fn forbidden(actor: &Actor, target: OrderStatus) -> DomainError {
    DomainError::Forbidden(format!(
        "{} {} may not move this order to {target}",
        actor.role.as_str(),
        actor.id
    ))
}
