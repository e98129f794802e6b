//! Ownership guard shared by every operation that touches a customer's data.
//!
//! The gate knows nothing about orders. Callers hand it a resolver that maps
//! a resource to the id of its owner; the gate compares that id with the
//! acting identity. Role exceptions (admins, hub staff) are layered on top
//! through [`OwnershipGate::check_unless`] and never skip the identity check.

use uuid::Uuid;

use super::actor::Actor;
use super::errors::DomainError;

pub struct OwnershipGate<F> {
    resolve_owner: F,
}

impl<F> OwnershipGate<F> {
    pub fn new(resolve_owner: F) -> Self {
        Self { resolve_owner }
    }

    /// Pass if `actor` owns `resource`.
    ///
    /// * `Unauthorized` when there is no verified actor.
    /// * Resolver errors are returned unchanged.
    /// * `Forbidden` when the owner differs from the actor.
    pub fn check<R: ?Sized>(&self, actor: Option<&Actor>, resource: &R) -> Result<(), DomainError>
    where
        F: Fn(&R) -> Result<Uuid, DomainError>,
    {
        let actor = actor.ok_or(DomainError::Unauthorized)?;
        let owner = (self.resolve_owner)(resource)?;
        if owner != actor.id {
            return Err(DomainError::Forbidden(format!(
                "actor {} does not own this resource",
                actor.id
            )));
        }
        Ok(())
    }

    /// Like [`check`](Self::check), but actors for which `privileged` holds
    /// are let through without resolving the owner.
    pub fn check_unless<R: ?Sized>(
        &self,
        actor: Option<&Actor>,
        resource: &R,
        privileged: impl Fn(&Actor) -> bool,
    ) -> Result<(), DomainError>
    where
        F: Fn(&R) -> Result<Uuid, DomainError>,
    {
        match actor {
            None => Err(DomainError::Unauthorized),
            Some(actor) if privileged(actor) => Ok(()),
            Some(actor) => self.check(Some(actor), resource),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::domain::actor::Role;

    struct Doc {
        owner: Uuid,
    }

    fn gate() -> OwnershipGate<impl Fn(&Doc) -> Result<Uuid, DomainError>> {
        OwnershipGate::new(|doc: &Doc| Ok(doc.owner))
    }

    #[test]
    fn missing_actor_is_unauthorized() {
        let doc = Doc { owner: Uuid::new_v4() };
        assert_eq!(gate().check(None, &doc), Err(DomainError::Unauthorized));
    }

    #[test]
    fn owner_passes() {
        let actor = Actor::new(Uuid::new_v4(), Role::Customer);
        let doc = Doc { owner: actor.id };
        assert_eq!(gate().check(Some(&actor), &doc), Ok(()));
    }

    #[test]
    fn stranger_is_forbidden() {
        let actor = Actor::new(Uuid::new_v4(), Role::Customer);
        let doc = Doc { owner: Uuid::new_v4() };
        assert!(matches!(
            gate().check(Some(&actor), &doc),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn resolver_error_propagates() {
        let gate = OwnershipGate::new(|_: &Doc| Err::<Uuid, _>(DomainError::NotFound));
        let actor = Actor::new(Uuid::new_v4(), Role::Customer);
        let doc = Doc { owner: actor.id };
        assert_eq!(gate.check(Some(&actor), &doc), Err(DomainError::NotFound));
    }

    #[test]
    fn resolver_not_called_without_actor() {
        let calls = Cell::new(0);
        let gate = OwnershipGate::new(|doc: &Doc| {
            calls.set(calls.get() + 1);
            Ok::<_, DomainError>(doc.owner)
        });
        let _ = gate.check(None, &Doc { owner: Uuid::new_v4() });
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn privileged_actor_skips_ownership_but_not_identity() {
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let doc = Doc { owner: Uuid::new_v4() };

        assert_eq!(
            gate().check_unless(Some(&admin), &doc, Actor::is_admin),
            Ok(())
        );
        assert_eq!(
            gate().check_unless(None, &doc, |_| true),
            Err(DomainError::Unauthorized)
        );
    }
}
