//! Fulfillment status flow: ready, ETA capture, delivered, canceled.

use common::{MessageRef, OrderId};
use domain::{DeliveryMethod, OrderStatus};

use crate::coordinator::{AdminReply, Orchestrator};
use crate::error::{OrchestrationError, Result};
use crate::messages;
use crate::relay::ThreadMapping;
use crate::services::assistant::PricingAssistant;
use crate::services::cart::CartService;
use crate::services::directory::AdminDirectory;
use crate::services::inventory::InventoryService;
use crate::services::transport::ChatTransport;

impl<T, I, D, P, C> Orchestrator<T, I, D, P, C>
where
    T: ChatTransport + 'static,
    I: InventoryService + 'static,
    D: AdminDirectory + 'static,
    P: PricingAssistant + 'static,
    C: CartService + 'static,
{
    /// Marks an order ready.
    ///
    /// Idempotent for the customer: a re-applied "ready" does not
    /// re-notify, but still normalizes the board message. Pickup orders
    /// forward to the confirmed-orders channel immediately; delivery
    /// orders defer the forward until an admin supplies an ETA in reply
    /// to the prompt sent here.
    #[tracing::instrument(skip(self), fields(%order_id))]
    pub async fn mark_ready(&self, order_id: &OrderId) -> Result<()> {
        let record = self
            .inner
            .registry
            .get(order_id)
            .await
            .ok_or_else(|| OrchestrationError::OrderNotFound(order_id.clone()))?;

        let target = match record.delivery {
            DeliveryMethod::Pickup => OrderStatus::ReadyPickup,
            DeliveryMethod::Courier => OrderStatus::ReadyDelivery,
        };
        let outcome = self.inner.registry.apply_status(order_id, target).await?;
        let record = outcome.record().clone();
        metrics::counter!("status_transitions_total").increment(1);

        if outcome.changed() {
            if let Err(e) = self
                .inner
                .transport
                .send(
                    record.customer_chat,
                    None,
                    &messages::ready_customer_text(&record),
                    None,
                )
                .await
            {
                tracing::warn!(error = %e, "ready notification failed");
            }
        }

        // Normalize the board entry in place, buttons replaced by
        // terminal text; runs on re-application too.
        if let Some(board) = record.board_message {
            if let Err(e) = self
                .inner
                .transport
                .edit(board, &messages::board_terminal_text(&record), None)
                .await
            {
                tracing::warn!(error = %e, "board normalize failed");
            }
        }

        match record.delivery {
            DeliveryMethod::Pickup => self.forward_confirmed(order_id).await,
            DeliveryMethod::Courier => {
                if outcome.changed() {
                    self.send_eta_prompt(&record.order_id).await?;
                }
                Ok(())
            }
        }
    }

    /// Marks an order delivered. Re-application is a no-op.
    #[tracing::instrument(skip(self), fields(%order_id))]
    pub async fn mark_delivered(&self, order_id: &OrderId) -> Result<()> {
        let outcome = self
            .inner
            .registry
            .apply_status(order_id, OrderStatus::Delivered)
            .await?;
        metrics::counter!("status_transitions_total").increment(1);

        if outcome.changed() {
            let record = outcome.record();
            if let Err(e) = self
                .inner
                .transport
                .send(
                    record.customer_chat,
                    None,
                    &messages::delivered_customer_text(record),
                    None,
                )
                .await
            {
                tracing::warn!(error = %e, "delivered notification failed");
            }
        }
        Ok(())
    }

    /// Cancels an order from any non-terminal status.
    #[tracing::instrument(skip(self), fields(%order_id))]
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<()> {
        let outcome = self
            .inner
            .registry
            .apply_status(order_id, OrderStatus::Canceled)
            .await?;
        metrics::counter!("status_transitions_total").increment(1);

        if outcome.changed() {
            let record = outcome.record().clone();
            if let Err(e) = self
                .inner
                .transport
                .send(
                    record.customer_chat,
                    None,
                    &messages::canceled_customer_text(&record),
                    None,
                )
                .await
            {
                tracing::warn!(error = %e, "cancel notification failed");
            }

            for target in self.inner.registry.take_tracked_messages(order_id).await {
                if let Err(e) = self.inner.transport.delete(target).await {
                    tracing::warn!(message_ref = %target, error = %e, "cleanup delete failed");
                }
            }
        }
        Ok(())
    }

    /// Captures an admin's ETA reply for a delivery order, scoped to the
    /// chat/thread the prompt was sent in; a stray reply gets a
    /// corrective notice and changes nothing.
    pub(crate) async fn handle_eta_reply(
        &self,
        mapping: &ThreadMapping,
        reply: &AdminReply,
    ) -> Result<()> {
        if reply.chat != mapping.chat || reply.thread != mapping.thread {
            tracing::warn!(chat = %reply.chat, "eta reply outside expected thread");
            let _ = self
                .inner
                .transport
                .send(reply.chat, reply.thread, &messages::stray_reply_notice(), None)
                .await;
            return Ok(());
        }

        let Some(order_id) = &mapping.order_id else {
            return Ok(());
        };
        let eta = reply.text.trim();
        if eta.is_empty() {
            tracing::debug!("empty eta reply ignored");
            return Ok(());
        }

        let outcome = match self
            .inner
            .registry
            .apply_status(order_id, OrderStatus::OnWay)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "eta reply ignored");
                return Ok(());
            }
        };
        if !outcome.changed() {
            tracing::debug!("duplicate eta reply ignored");
            return Ok(());
        }

        self.inner.registry.set_eta(order_id, eta).await?;
        let record = self
            .inner
            .registry
            .get(order_id)
            .await
            .ok_or_else(|| OrchestrationError::OrderNotFound(order_id.clone()))?;

        if let Err(e) = self
            .inner
            .transport
            .send(
                record.customer_chat,
                None,
                &messages::onway_customer_text(&record, eta),
                None,
            )
            .await
        {
            tracing::warn!(error = %e, "onway notification failed");
        }

        // The deferred delivery forward happens now that the ETA exists.
        self.forward_confirmed(order_id).await
    }

    /// Forwards a sanitized summary to the confirmed-orders channel and
    /// deletes the intermediate status messages. Deletion failures are
    /// logged, not retried.
    pub(crate) async fn forward_confirmed(&self, order_id: &OrderId) -> Result<()> {
        let record = self
            .inner
            .registry
            .get(order_id)
            .await
            .ok_or_else(|| OrchestrationError::OrderNotFound(order_id.clone()))?;

        let config = &self.inner.config;
        self.inner
            .transport
            .send(
                config.confirmed_chat,
                config.confirmed_thread,
                &messages::sanitized_summary(&record),
                Some(messages::confirmed_keyboard(order_id)),
            )
            .await?;

        for target in self.inner.registry.take_tracked_messages(order_id).await {
            if let Err(e) = self.inner.transport.delete(target).await {
                tracing::warn!(message_ref = %target, error = %e, "cleanup delete failed");
            }
        }

        metrics::counter!("confirmed_forwards_total").increment(1);
        Ok(())
    }

    /// Sends the ETA prompt for a ready delivery order and registers its
    /// correlation entry.
    async fn send_eta_prompt(&self, order_id: &OrderId) -> Result<()> {
        let record = self
            .inner
            .registry
            .get(order_id)
            .await
            .ok_or_else(|| OrchestrationError::OrderNotFound(order_id.clone()))?;
        let config = &self.inner.config;

        let prompt = self
            .inner
            .transport
            .send(
                config.admin_chat,
                config.admin_thread,
                &messages::eta_prompt_text(&record),
                None,
            )
            .await?;

        self.inner
            .mappings
            .insert(
                prompt,
                ThreadMapping {
                    customer_id: record.customer_id,
                    customer_chat: record.customer_chat,
                    summary: record.summary.clone(),
                    order_id: Some(record.order_id.clone()),
                    chat: config.admin_chat,
                    thread: config.admin_thread,
                    created_at: chrono::Utc::now(),
                },
            )
            .await;
        self.inner
            .registry
            .set_eta_prompt_message(order_id, MessageRef::new(config.admin_chat, prompt))
            .await?;
        Ok(())
    }
}
