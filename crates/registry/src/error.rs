//! Registry error types.

use common::OrderId;
use domain::OrderStatus;
use thiserror::Error;

/// Errors raised by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No record exists for the given order id.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The requested status transition is not allowed.
    #[error("order {order_id}: invalid transition {from} -> {to}")]
    InvalidTransition {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
}
