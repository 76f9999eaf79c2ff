//! Fulfillment lifecycle state machine for submitted orders.

use serde::{Deserialize, Serialize};

/// The status of a submitted order.
///
/// Status transitions:
/// ```text
/// Processing ──┬──► ReadyPickup ────────────────► Delivered
///              │
///              └──► ReadyDelivery ──► OnWay ────► Delivered
///
/// Canceled is reachable from any non-terminal status.
/// ```
///
/// `Delivered` and `Canceled` are terminal. Re-entering a non-terminal
/// status is treated as idempotent by the registry: the transition is
/// reported as already applied and no customer notification is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order accepted and being prepared.
    #[default]
    Processing,

    /// Ready for the customer to pick up.
    ReadyPickup,

    /// Ready and waiting for a courier dispatch.
    ReadyDelivery,

    /// Courier is on the way (delivery orders only).
    OnWay,

    /// Order handed over (terminal).
    Delivered,

    /// Order canceled (terminal).
    Canceled,
}

impl OrderStatus {
    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
    }

    /// Returns true if the transition to `next` is allowed.
    ///
    /// Re-entering the current status is not a valid transition here;
    /// the registry handles that case separately as an idempotent no-op.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if next == *self {
            return false;
        }
        match (self, next) {
            (OrderStatus::Processing, OrderStatus::ReadyPickup) => true,
            (OrderStatus::Processing, OrderStatus::ReadyDelivery) => true,
            (OrderStatus::ReadyPickup, OrderStatus::Delivered) => true,
            (OrderStatus::ReadyDelivery, OrderStatus::OnWay) => true,
            (OrderStatus::OnWay, OrderStatus::Delivered) => true,
            (from, OrderStatus::Canceled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::ReadyPickup => "ready_pickup",
            OrderStatus::ReadyDelivery => "ready_delivery",
            OrderStatus::OnWay => "onway",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 6] = [
        OrderStatus::Processing,
        OrderStatus::ReadyPickup,
        OrderStatus::ReadyDelivery,
        OrderStatus::OnWay,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    #[test]
    fn test_default_is_processing() {
        assert_eq!(OrderStatus::default(), OrderStatus::Processing);
    }

    #[test]
    fn test_forward_transitions() {
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::ReadyPickup));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::ReadyDelivery));
        assert!(OrderStatus::ReadyPickup.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::ReadyDelivery.can_transition_to(OrderStatus::OnWay));
        assert!(OrderStatus::OnWay.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::OnWay));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::ReadyPickup.can_transition_to(OrderStatus::OnWay));
        assert!(!OrderStatus::ReadyDelivery.can_transition_to(OrderStatus::Delivered));
        // Self-transition is never valid here.
        for status in ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_cancel_reachable_from_non_terminal_only() {
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Canceled));
        assert!(OrderStatus::ReadyPickup.can_transition_to(OrderStatus::Canceled));
        assert!(OrderStatus::ReadyDelivery.can_transition_to(OrderStatus::Canceled));
        assert!(OrderStatus::OnWay.can_transition_to(OrderStatus::Canceled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Canceled));
        assert!(!OrderStatus::Canceled.can_transition_to(OrderStatus::Canceled));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for status in ALL {
            assert!(!OrderStatus::Delivered.can_transition_to(status));
            assert!(!OrderStatus::Canceled.can_transition_to(status));
        }
    }

    #[test]
    fn test_display_and_serde_names_agree() {
        for status in ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }
}
