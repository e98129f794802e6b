use std::str::FromStr;

use uuid::Uuid;

use super::errors::DomainError;

/// Role of an authenticated actor, as asserted by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Vendor,
    /// Shipper or clerk working at one distribution hub.
    HubStaff { hub_id: Uuid },
    Admin,
    /// Internal callers such as the payment processor.
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Vendor => "vendor",
            Role::HubStaff { .. } => "hub_staff",
            Role::Admin => "admin",
            Role::System => "system",
        }
    }

    /// Parse the wire name of a role. `hub_staff` needs the hub the actor
    /// works at.
    pub fn parse(name: &str, hub_id: Option<Uuid>) -> Result<Self, DomainError> {
        match name {
            "customer" => Ok(Role::Customer),
            "vendor" => Ok(Role::Vendor),
            "admin" => Ok(Role::Admin),
            "system" => Ok(Role::System),
            "hub_staff" => hub_id.map(|hub_id| Role::HubStaff { hub_id }).ok_or_else(|| {
                DomainError::Validation("hub_staff actor requires a hub id".to_string())
            }),
            other => Err(DomainError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when the actor is staff at `hub_id`. An order without a hub has
    /// no staff.
    pub fn works_at(&self, hub_id: Option<Uuid>) -> bool {
        match (self.role, hub_id) {
            (Role::HubStaff { hub_id: own }, Some(hub)) => own == hub,
            _ => false,
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s, None)
    }
}
