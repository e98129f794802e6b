use thiserror::Error;

use super::order::OrderStatus;

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("No verified actor identity")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order was modified concurrently")]
    Conflict,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
