pub mod actor;
pub mod orders;

use actix_web::web;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::get_order,
        orders::list_orders,
        orders::transition_order,
        orders::assign_hub,
        orders::hub_orders,
        orders::vendor_orders,
        orders::customer_orders,
    ),
    components(schemas(
        orders::CreateOrderItemRequest,
        orders::CreateOrderRequest,
        orders::TransitionRequest,
        orders::AssignHubRequest,
        orders::OrderItemResponse,
        orders::PricingResponse,
        orders::OrderResponse,
        orders::ListOrdersResponse,
    )),
    tags(
        (name = "orders", description = "Order placement and fulfillment lifecycle"),
        (name = "views", description = "Per-hub, per-vendor and per-customer order views"),
    )
)]
pub struct ApiDoc;

/// Register every order route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(orders::create_order))
            .route("", web::get().to(orders::list_orders))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}/transitions", web::post().to(orders::transition_order))
            .route("/{id}/hub", web::put().to(orders::assign_hub)),
    )
    .route("/hubs/{hub_id}/orders", web::get().to(orders::hub_orders))
    .route("/vendors/{vendor_id}/orders", web::get().to(orders::vendor_orders))
    .route(
        "/customers/{customer_id}/orders",
        web::get().to(orders::customer_orders),
    );
}
