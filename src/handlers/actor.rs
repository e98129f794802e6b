use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::actor::{Actor, Role};
use crate::errors::AppError;

/// Headers set by the authentication middleware in front of this service.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_HUB_HEADER: &str = "x-actor-hub-id";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, AppError> {
    let id = header(headers, ACTOR_ID_HEADER)
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or(AppError::Unauthorized)?;
    let role_name = header(headers, ACTOR_ROLE_HEADER).ok_or(AppError::Unauthorized)?;
    let hub_id = header(headers, ACTOR_HUB_HEADER).and_then(|v| Uuid::parse_str(v).ok());

    let role = Role::parse(role_name, hub_id).map_err(|e| {
        log::debug!("Rejecting actor {}: {}", id, e);
        AppError::Unauthorized
    })?;
    Ok(Actor::new(id, role))
}

/// Extract the verified actor. Handlers take `Option<Actor>` so that a
/// missing identity reaches the domain, which answers `Unauthorized`.
impl FromRequest for Actor {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(actor_from_headers(req.headers()))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn parses_hub_staff() {
        let id = Uuid::new_v4();
        let hub = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((ACTOR_ID_HEADER, id.to_string()))
            .insert_header((ACTOR_ROLE_HEADER, "hub_staff"))
            .insert_header((ACTOR_HUB_HEADER, hub.to_string()))
            .to_http_request();

        let actor = actor_from_headers(req.headers()).expect("valid actor");
        assert_eq!(actor, Actor::new(id, Role::HubStaff { hub_id: hub }));
    }

    #[test]
    fn missing_or_malformed_headers_are_unauthorized() {
        let no_headers = TestRequest::default().to_http_request();
        assert!(matches!(
            actor_from_headers(no_headers.headers()),
            Err(AppError::Unauthorized)
        ));

        let bad_id = TestRequest::default()
            .insert_header((ACTOR_ID_HEADER, "not-a-uuid"))
            .insert_header((ACTOR_ROLE_HEADER, "customer"))
            .to_http_request();
        assert!(matches!(
            actor_from_headers(bad_id.headers()),
            Err(AppError::Unauthorized)
        ));

        let staff_without_hub = TestRequest::default()
            .insert_header((ACTOR_ID_HEADER, Uuid::new_v4().to_string()))
            .insert_header((ACTOR_ROLE_HEADER, "hub_staff"))
            .to_http_request();
        assert!(matches!(
            actor_from_headers(staff_without_hub.headers()),
            Err(AppError::Unauthorized)
        ));
    }
}
