use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::actor::Actor;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderItem, OrderStatus, PaymentType};
use crate::errors::AppError;

/// Shared handler state.
pub struct AppState {
    pub service: Arc<OrderService>,
    pub request_timeout: Duration,
}

/// Run a blocking service call on the blocking pool, bounded by the
/// configured request timeout.
///
/// A timed-out call is not cancelled: the blocking job keeps running and may
/// still commit. Clients that get a 504 should re-read the order before
/// retrying a write.
async fn call<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&OrderService) -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    let work = web::block(move || f(&service));

    match tokio::time::timeout(state.request_timeout, work).await {
        Err(_) => {
            log::warn!("Service call exceeded {:?}", state.request_timeout);
            Err(AppError::Timeout)
        }
        Ok(joined) => {
            let result = joined.map_err(|e| AppError::Internal(e.to_string()))?;
            result.map_err(|e| {
                if let DomainError::Internal(msg) = &e {
                    log::error!("Order service failure: {}", msg);
                }
                AppError::from(e)
            })
        }
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|e| AppError::Validation(format!("Invalid {field} '{raw}': {e}")))
}

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    OrderStatus::from_str(raw).map_err(AppError::from)
}

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price_at_purchase: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub items: Vec<CreateOrderItemRequest>,
    pub delivery_information_id: Uuid,
    /// `cash` or `credit_card`
    pub payment_type: String,
    /// Decimal string, defaults to "0"
    #[serde(default)]
    pub shipping_fee: Option<String>,
    #[serde(default)]
    pub distribution_hub_id: Option<Uuid>,
    /// Total shown to the customer; rejected unless it equals subtotal plus
    /// shipping fee.
    #[serde(default)]
    pub total: Option<String>,
}

impl CreateOrderRequest {
    fn into_new_order(self) -> Result<NewOrder, AppError> {
        let items = self
            .items
            .iter()
            .map(|i| {
                Ok(OrderItem {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price_at_purchase: parse_decimal("price_at_purchase", &i.price_at_purchase)?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(NewOrder {
            customer_id: self.customer_id,
            items,
            delivery_information_id: self.delivery_information_id,
            payment_type: PaymentType::from_str(&self.payment_type)?,
            shipping_fee: match &self.shipping_fee {
                Some(fee) => parse_decimal("shipping_fee", fee)?,
                None => BigDecimal::from(0),
            },
            distribution_hub_id: self.distribution_hub_id,
            declared_total: self
                .total
                .as_deref()
                .map(|t| parse_decimal("total", t))
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Target status, e.g. "at_hub"
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignHubRequest {
    pub hub_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_purchase: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PricingResponse {
    pub subtotal: String,
    pub shipping_fee: String,
    pub total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: String,
    pub payment_type: String,
    pub distribution_hub_id: Option<Uuid>,
    pub hub_assigned_at: Option<String>,
    pub hub_assigned_by: Option<Uuid>,
    pub delivery_information_id: Uuid,
    pub pricing: PricingResponse,
    pub items: Vec<OrderItemResponse>,
    pub placed_at: String,
    pub delivered_at: Option<String>,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            customer_id: o.customer_id,
            status: o.status.to_string(),
            payment_type: o.payment_type.as_str().to_string(),
            distribution_hub_id: o.distribution_hub_id,
            hub_assigned_at: o.hub_assigned_at.map(|t| t.to_rfc3339()),
            hub_assigned_by: o.hub_assigned_by,
            delivery_information_id: o.delivery_information_id,
            pricing: PricingResponse {
                subtotal: o.pricing.subtotal.to_string(),
                shipping_fee: o.pricing.shipping_fee.to_string(),
                total: o.pricing.total.to_string(),
            },
            items: o
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price_at_purchase: i.price_at_purchase.to_string(),
                })
                .collect(),
            placed_at: o.placed_at.to_rfc3339(),
            delivered_at: o.delivered_at.map(|t| t.to_rfc3339()),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

fn to_responses(orders: Vec<Order>) -> Vec<OrderResponse> {
    orders.into_iter().map(OrderResponse::from).collect()
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HubOrdersParams {
    /// Only return orders in this status.
    pub status: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places a new order in status `placed`. The order row, its items and an
/// `OrderPlaced` outbox event are written in one transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 401, description = "No verified actor"),
        (status = 403, description = "Actor may not order for this customer"),
        (status = 422, description = "Malformed items or pricing"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    actor: Option<Actor>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner().into_new_order()?;

    let order = call(&state, move |s| s.create_order(actor.as_ref(), input)).await?;
    log::info!("Order {} placed by customer {}", order.id, order.customer_id);

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Not the owner, the hub or an admin"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    actor: Option<Actor>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let order = call(&state, move |s| s.get_order(id, actor.as_ref())).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Returns a paginated list of orders, newest first. Admin only.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 403, description = "Not an admin"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    actor: Option<Actor>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = call(&state, move |s| s.list_orders(page, limit, actor.as_ref())).await?;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: to_responses(result.items),
        total: result.total,
        page,
        limit,
    }))
}

/// POST /orders/{id}/transitions
///
/// Moves the order to the requested status. A `409` either means the edge
/// is not in the fulfillment graph or that another request changed the
/// order first; re-read and retry in the latter case. A `504` does not mean
/// the transition was dropped, it may still have been applied.
#[utoipa::path(
    post,
    path = "/orders/{id}/transitions",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition applied", body = OrderResponse),
        (status = 401, description = "No verified actor"),
        (status = 403, description = "Actor may not perform this transition"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Invalid transition or concurrent modification"),
        (status = 504, description = "Timed out; the transition may still have been applied"),
    ),
    tag = "orders"
)]
pub async fn transition_order(
    state: web::Data<AppState>,
    actor: Option<Actor>,
    path: web::Path<Uuid>,
    body: web::Json<TransitionRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let target = parse_status(&body.status)?;

    let order = call(&state, move |s| s.transition_order(id, target, actor.as_ref())).await?;
    log::info!("Order {} moved to {}", order.id, order.status);

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /orders/{id}/hub
#[utoipa::path(
    put,
    path = "/orders/{id}/hub",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = AssignHubRequest,
    responses(
        (status = 200, description = "Hub assigned", body = OrderResponse),
        (status = 403, description = "Not an admin"),
        (status = 409, description = "Order already reached a hub, or concurrent modification"),
    ),
    tag = "orders"
)]
pub async fn assign_hub(
    state: web::Data<AppState>,
    actor: Option<Actor>,
    path: web::Path<Uuid>,
    body: web::Json<AssignHubRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let hub_id = body.hub_id;

    let order = call(&state, move |s| s.assign_hub(id, hub_id, actor.as_ref())).await?;
    log::info!("Order {} assigned to hub {}", order.id, hub_id);

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /hubs/{hub_id}/orders
#[utoipa::path(
    get,
    path = "/hubs/{hub_id}/orders",
    params(
        ("hub_id" = Uuid, Path, description = "Distribution hub UUID"),
        ("status" = Option<String>, Query, description = "Status filter"),
    ),
    responses(
        (status = 200, description = "Orders handled by the hub", body = [OrderResponse]),
        (status = 403, description = "Not staff at this hub"),
    ),
    tag = "views"
)]
pub async fn hub_orders(
    state: web::Data<AppState>,
    actor: Option<Actor>,
    path: web::Path<Uuid>,
    query: web::Query<HubOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let hub_id = path.into_inner();
    let status = query.status.as_deref().map(parse_status).transpose()?;

    let orders = call(&state, move |s| {
        s.get_orders_for_hub(hub_id, status, actor.as_ref())
    })
    .await?;
    Ok(HttpResponse::Ok().json(to_responses(orders)))
}

/// GET /vendors/{vendor_id}/orders
///
/// Each order only lists the items sold by the vendor.
#[utoipa::path(
    get,
    path = "/vendors/{vendor_id}/orders",
    params(
        ("vendor_id" = String, Path, description = "Vendor identifier"),
    ),
    responses(
        (status = 200, description = "Vendor's share of each order", body = [OrderResponse]),
        (status = 403, description = "Not this vendor or an admin"),
    ),
    tag = "views"
)]
pub async fn vendor_orders(
    state: web::Data<AppState>,
    actor: Option<Actor>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let vendor_id = path.into_inner();
    let orders = call(&state, move |s| {
        s.get_orders_for_vendor(&vendor_id, actor.as_ref())
    })
    .await?;
    Ok(HttpResponse::Ok().json(to_responses(orders)))
}

/// GET /customers/{customer_id}/orders
#[utoipa::path(
    get,
    path = "/customers/{customer_id}/orders",
    params(
        ("customer_id" = Uuid, Path, description = "Customer UUID"),
    ),
    responses(
        (status = 200, description = "Orders placed by the customer", body = [OrderResponse]),
        (status = 403, description = "Not this customer or an admin"),
    ),
    tag = "views"
)]
pub async fn customer_orders(
    state: web::Data<AppState>,
    actor: Option<Actor>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();
    let orders = call(&state, move |s| {
        s.get_orders_for_customer(customer_id, actor.as_ref())
    })
    .await?;
    Ok(HttpResponse::Ok().json(to_responses(orders)))
}
