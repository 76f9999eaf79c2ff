//! Concurrent registry of submitted orders.

use common::{MessageRef, OrderId};
use domain::OrderStatus;
use store::Table;

use crate::error::RegistryError;
use crate::order_id::OrderIdGenerator;
use crate::record::{NewOrder, OrderRecord};

/// Outcome of applying a status transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The status changed; the returned record reflects the new status.
    Applied(OrderRecord),

    /// The order was already in the requested status; idempotent no-op.
    AlreadyThere(OrderRecord),
}

impl TransitionOutcome {
    /// Returns the record regardless of outcome.
    pub fn record(&self) -> &OrderRecord {
        match self {
            TransitionOutcome::Applied(rec) | TransitionOutcome::AlreadyThere(rec) => rec,
        }
    }

    /// Returns true if the transition actually changed the status.
    pub fn changed(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }
}

/// Registry of submitted orders, keyed by generated order id.
///
/// Records survive for the lifetime of the process, including terminal
/// orders. Transition application is a single atomic table update so a
/// concurrent re-application resolves to `AlreadyThere` instead of a
/// duplicated notification.
#[derive(Debug, Clone, Default)]
pub struct StatusRegistry {
    orders: Table<OrderId, OrderRecord>,
    ids: OrderIdGenerator,
}

impl StatusRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            orders: Table::new(),
            ids: OrderIdGenerator::new(),
        }
    }

    /// Registers a submitted order: generates its id and stores the
    /// record in `processing` status.
    pub async fn submit(&self, new: NewOrder) -> OrderRecord {
        let order_id = self.ids.next();
        let record = OrderRecord::new(order_id.clone(), new);
        self.orders.insert(order_id, record.clone()).await;
        tracing::info!(order_id = %record.order_id, "order registered");
        record
    }

    /// Returns a clone of the record for the given order id.
    pub async fn get(&self, order_id: &OrderId) -> Option<OrderRecord> {
        self.orders.get(order_id).await
    }

    /// Returns every non-terminal order.
    pub async fn active_orders(&self) -> Vec<OrderRecord> {
        self.orders
            .values()
            .await
            .into_iter()
            .filter(|rec| !rec.status.is_terminal())
            .collect()
    }

    /// Returns the number of registered orders.
    pub async fn len(&self) -> usize {
        self.orders.len().await
    }

    /// Returns true if no orders are registered.
    pub async fn is_empty(&self) -> bool {
        self.orders.is_empty().await
    }

    /// Applies a status transition atomically.
    ///
    /// Requesting the status the order already has yields
    /// [`TransitionOutcome::AlreadyThere`]; an illegal transition yields
    /// [`RegistryError::InvalidTransition`] and leaves the record
    /// untouched.
    pub async fn apply_status(
        &self,
        order_id: &OrderId,
        next: OrderStatus,
    ) -> Result<TransitionOutcome, RegistryError> {
        let outcome = self
            .orders
            .update(order_id, |rec| {
                if rec.status == next {
                    return Ok(TransitionOutcome::AlreadyThere(rec.clone()));
                }
                if !rec.status.can_transition_to(next) {
                    return Err(RegistryError::InvalidTransition {
                        order_id: rec.order_id.clone(),
                        from: rec.status,
                        to: next,
                    });
                }
                rec.status = next;
                Ok(TransitionOutcome::Applied(rec.clone()))
            })
            .await
            .ok_or_else(|| RegistryError::OrderNotFound(order_id.clone()))??;

        if outcome.changed() {
            tracing::info!(%order_id, status = %next, "order status changed");
        }
        Ok(outcome)
    }

    /// Records the estimated arrival for a delivery order.
    pub async fn set_eta(
        &self,
        order_id: &OrderId,
        eta: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let eta = eta.into();
        self.orders
            .update(order_id, |rec| rec.eta = Some(eta))
            .await
            .ok_or_else(|| RegistryError::OrderNotFound(order_id.clone()))
    }

    /// Records the active-orders board message for later edits.
    pub async fn set_board_message(
        &self,
        order_id: &OrderId,
        message: MessageRef,
    ) -> Result<(), RegistryError> {
        self.orders
            .update(order_id, |rec| rec.board_message = Some(message))
            .await
            .ok_or_else(|| RegistryError::OrderNotFound(order_id.clone()))
    }

    /// Records the ETA prompt message for later cleanup.
    pub async fn set_eta_prompt_message(
        &self,
        order_id: &OrderId,
        message: MessageRef,
    ) -> Result<(), RegistryError> {
        self.orders
            .update(order_id, |rec| rec.eta_prompt_message = Some(message))
            .await
            .ok_or_else(|| RegistryError::OrderNotFound(order_id.clone()))
    }

    /// Records the customer confirmation message for later cleanup.
    pub async fn set_confirm_message(
        &self,
        order_id: &OrderId,
        message: MessageRef,
    ) -> Result<(), RegistryError> {
        self.orders
            .update(order_id, |rec| rec.confirm_message = Some(message))
            .await
            .ok_or_else(|| RegistryError::OrderNotFound(order_id.clone()))
    }

    /// Clears and returns every tracked status message of an order.
    pub async fn take_tracked_messages(&self, order_id: &OrderId) -> Vec<MessageRef> {
        self.orders
            .update(order_id, |rec| rec.take_tracked_messages())
            .await
            .unwrap_or_default()
    }

    /// Scans for an order whose id appears verbatim in the given text.
    ///
    /// This is the documented best-effort fallback for correlation
    /// recovery: if a relayed reply loses the original message
    /// reference, the order id embedded in the replied-to text can still
    /// resolve it. A reformatted id simply misses; the result is never
    /// guessed.
    pub async fn find_in_text(&self, text: &str) -> Option<OrderRecord> {
        self.orders
            .find(|order_id, _| text.contains(order_id.as_str()))
            .await
            .map(|(_, rec)| rec)
    }
}
