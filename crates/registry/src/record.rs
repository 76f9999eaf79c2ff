//! Submitted-order record.

use chrono::{DateTime, Utc};
use common::{ChatId, CustomerId, MessageRef, OrderId};
use domain::{DeliveryMethod, Money, OrderStatus, PhoneNumber};
use serde::{Deserialize, Serialize};

/// Input for registering a newly submitted order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub customer_chat: ChatId,
    pub customer_name: String,
    pub phone: PhoneNumber,
    pub location: String,
    pub summary: String,
    pub total: Option<Money>,
    pub delivery: DeliveryMethod,
}

/// The registry's record of a submitted order.
///
/// Tracks, besides the order data itself, the identifiers of every
/// status message previously sent (active-orders board entry, ETA
/// prompt, confirmation echo) so transitions edit or delete them instead
/// of sending duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub customer_chat: ChatId,
    pub customer_name: String,
    pub phone: PhoneNumber,
    pub location: String,
    pub summary: String,
    pub total: Option<Money>,
    pub delivery: DeliveryMethod,
    pub status: OrderStatus,

    /// Estimated arrival supplied by an admin for delivery orders.
    pub eta: Option<String>,

    /// Active-orders board message in the fulfillment channel.
    pub board_message: Option<MessageRef>,

    /// The "on the way?" ETA prompt sent to the fulfillment channel.
    pub eta_prompt_message: Option<MessageRef>,

    /// Confirmation echo sent to the customer on submission.
    pub confirm_message: Option<MessageRef>,

    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Creates a record in the initial `processing` status.
    pub fn new(order_id: OrderId, new: NewOrder) -> Self {
        Self {
            order_id,
            customer_id: new.customer_id,
            customer_chat: new.customer_chat,
            customer_name: new.customer_name,
            phone: new.phone,
            location: new.location,
            summary: new.summary,
            total: new.total,
            delivery: new.delivery,
            status: OrderStatus::Processing,
            eta: None,
            board_message: None,
            eta_prompt_message: None,
            confirm_message: None,
            created_at: Utc::now(),
        }
    }

    /// Clears and returns every tracked status message, for cleanup
    /// after the confirmed-orders forward.
    pub fn take_tracked_messages(&mut self) -> Vec<MessageRef> {
        [
            self.board_message.take(),
            self.eta_prompt_message.take(),
            self.confirm_message.take(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
