//! Orchestration error types.

use common::{ChatId, CustomerId, MessageId, OrderId};
use domain::SessionError;
use registry::RegistryError;
use thiserror::Error;

use crate::services::transport::TransportError;

/// Errors that can occur during orchestration operations.
///
/// None of these are fatal to the process; every entry point logs and
/// returns control to the event loop.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// A transport call failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The inventory collaborator failed or timed out.
    #[error("inventory error: {0}")]
    Inventory(String),

    /// The repricing assistant failed.
    #[error("assistant error: {0}")]
    Assistant(String),

    /// The cart collaborator failed.
    #[error("cart error: {0}")]
    Cart(String),

    /// No session exists for the customer.
    #[error("no active session for customer {0}")]
    SessionNotFound(CustomerId),

    /// A decision arrived with no resolvable source (all three fallback
    /// tiers empty).
    #[error("nothing to decide for customer {0}")]
    NothingToDecide(CustomerId),

    /// An admin reply could not be correlated to a customer or order.
    #[error("no correlation for replied-to message {message}")]
    CorrelationMiss { message: MessageId },

    /// A reply arrived outside the chat/thread it was expected in.
    #[error("stray reply in chat {chat}")]
    StrayReply { chat: ChatId },

    /// An order id referenced by a callback is unknown.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// A session state machine rule was violated.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Convenience type alias for orchestration results.
pub type Result<T> = std::result::Result<T, OrchestrationError>;
