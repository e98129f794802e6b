use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    Paid,
    AtHub,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Placed,
        OrderStatus::Paid,
        OrderStatus::AtHub,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Paid => "paid",
            OrderStatus::AtHub => "at_hub",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown order status '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    CreditCard,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::CreditCard => "credit_card",
        }
    }
}

impl FromStr for PaymentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentType::Cash),
            "credit_card" => Ok(PaymentType::CreditCard),
            other => Err(DomainError::Validation(format!(
                "unknown payment type '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_purchase: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pricing {
    pub subtotal: BigDecimal,
    pub shipping_fee: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub distribution_hub_id: Option<Uuid>,
    pub hub_assigned_at: Option<DateTime<Utc>>,
    pub hub_assigned_by: Option<Uuid>,
    pub status: OrderStatus,
    pub payment_type: PaymentType,
    pub delivery_information_id: Uuid,
    pub pricing: Pricing,
    pub placed_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every write; stores accept a write only against the
    /// version it was computed from.
    pub version: i32,
}

/// Everything a customer supplies when placing an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub delivery_information_id: Uuid,
    pub payment_type: PaymentType,
    pub shipping_fee: BigDecimal,
    pub distribution_hub_id: Option<Uuid>,
    /// Total as shown to the customer, if the client sent one. It must match
    /// the computed `subtotal + shipping_fee`.
    pub declared_total: Option<BigDecimal>,
}

impl Order {
    /// Validate `input` and build a fresh order in status `placed`.
    pub fn place(input: NewOrder, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate_items(&input.items)?;

        let zero = BigDecimal::from(0);
        if input.shipping_fee < zero {
            return Err(DomainError::Validation(
                "shipping fee must not be negative".to_string(),
            ));
        }
        check_money("shipping fee", &input.shipping_fee)?;

        let subtotal = input
            .items
            .iter()
            .map(|item| &item.price_at_purchase * BigDecimal::from(item.quantity))
            .fold(BigDecimal::from(0), |acc, line| acc + line);
        let total = &subtotal + &input.shipping_fee;
        check_money("total", &total)?;

        if let Some(declared) = &input.declared_total {
            if *declared != total {
                return Err(DomainError::Validation(format!(
                    "total {declared} does not equal subtotal {subtotal} plus shipping fee {}",
                    input.shipping_fee
                )));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            customer_id: input.customer_id,
            items: input.items,
            distribution_hub_id: input.distribution_hub_id,
            hub_assigned_at: None,
            hub_assigned_by: None,
            status: OrderStatus::Placed,
            payment_type: input.payment_type,
            delivery_information_id: input.delivery_information_id,
            pricing: Pricing {
                subtotal,
                shipping_fee: input.shipping_fee,
                total,
            },
            placed_at: now,
            delivered_at: None,
            updated_at: now,
            version: 1,
        })
    }
}

fn validate_items(items: &[OrderItem]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::Validation(
            "order must contain at least one item".to_string(),
        ));
    }

    let zero = BigDecimal::from(0);
    for item in items {
        if item.quantity < 1 {
            return Err(DomainError::Validation(format!(
                "quantity for product {} must be at least 1, got {}",
                item.product_id, item.quantity
            )));
        }
        if item.price_at_purchase < zero {
            return Err(DomainError::Validation(format!(
                "price for product {} must not be negative",
                item.product_id
            )));
        }
        check_money(
            &format!("price for product {}", item.product_id),
            &item.price_at_purchase,
        )?;
    }

    Ok(())
}

/// Amounts are stored as NUMERIC(12, 2): at most two decimal places and
/// strictly below 10^10.
const MONEY_SCALE: i64 = 2;
const MONEY_LIMIT: i64 = 10_000_000_000;

fn check_money(label: &str, amount: &BigDecimal) -> Result<(), DomainError> {
    if amount.with_scale(MONEY_SCALE) != *amount {
        return Err(DomainError::Validation(format!(
            "{label} {amount} has more than {MONEY_SCALE} decimal places"
        )));
    }
    if amount.abs() >= BigDecimal::from(MONEY_LIMIT) {
        return Err(DomainError::Validation(format!(
            "{label} {amount} exceeds the maximum amount"
        )));
    }
    Ok(())
}

/// Rows to skip for the 1-based `page`, or `None` when the page lies
/// beyond any addressable offset.
pub fn page_offset(page: i64, limit: i64) -> Option<i64> {
    page.checked_sub(1)?.max(0).checked_mul(limit.max(0))
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<Order>,
    pub total: i64,
}
