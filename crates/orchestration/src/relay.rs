//! Approval relay: admin-channel review requests, reply correlation,
//! and decision resolution.

use chrono::{DateTime, Utc};
use common::{ChatId, CustomerId, MessageId, OrderId, ThreadId};
use domain::{ApprovalSnapshot, PendingApproval};
use serde::{Deserialize, Serialize};

use crate::coordinator::{AdminReply, Orchestrator};
use crate::error::Result;
use crate::messages;
use crate::services::assistant::{PricingAssistant, extract_trailing_amount};
use crate::services::cart::CartService;
use crate::services::directory::AdminDirectory;
use crate::services::inventory::InventoryService;
use crate::services::transport::ChatTransport;

/// Correlation record keyed by the admin-channel message id of a
/// request.
///
/// This table is what lets a later admin reply — which only references a
/// message id — be resolved back to a customer with no other shared key.
/// Entries are insert-only during the request phase and read, never
/// mutated, during the reply phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMapping {
    /// Customer the request concerns.
    pub customer_id: CustomerId,

    /// Chat to route the outcome back to.
    pub customer_chat: ChatId,

    /// Configuration summary at request time.
    pub summary: String,

    /// Set for ETA prompts: the order awaiting an arrival estimate.
    /// `None` marks a plain approval request.
    pub order_id: Option<OrderId>,

    /// Chat the reply is expected in.
    pub chat: ChatId,

    /// Thread the reply is expected in.
    pub thread: Option<ThreadId>,

    pub created_at: DateTime<Utc>,
}

impl<T, I, D, P, C> Orchestrator<T, I, D, P, C>
where
    T: ChatTransport + 'static,
    I: InventoryService + 'static,
    D: AdminDirectory + 'static,
    P: PricingAssistant + 'static,
    C: CartService + 'static,
{
    /// Sends an approval request to the admin channel and records the
    /// correlation entry under the sent message's id.
    #[tracing::instrument(skip(self, snapshot), fields(%customer))]
    pub async fn request_approval(
        &self,
        customer: CustomerId,
        customer_chat: ChatId,
        snapshot: ApprovalSnapshot,
    ) -> Result<MessageId> {
        let config = &self.inner.config;
        let text = messages::approval_request(customer, &snapshot.summary);
        let message = self
            .inner
            .transport
            .send(config.admin_chat, config.admin_thread, &text, None)
            .await?;

        self.inner
            .mappings
            .insert(
                message,
                ThreadMapping {
                    customer_id: customer,
                    customer_chat,
                    summary: snapshot.summary.clone(),
                    order_id: None,
                    chat: config.admin_chat,
                    thread: config.admin_thread,
                    created_at: Utc::now(),
                },
            )
            .await;
        self.inner.awaiting_review.insert(customer, ()).await;
        self.inner.snapshots.insert(customer, snapshot).await;

        metrics::counter!("approvals_requested_total").increment(1);
        tracing::info!(message_id = %message, "approval requested");
        Ok(message)
    }

    /// Entry point for an admin's reply in a channel.
    ///
    /// Resolves the correlation mapping, falling back to an order id
    /// embedded in the replied-to text; an unresolvable reply is dropped
    /// with a diagnostic, never guessed.
    #[tracing::instrument(skip(self, reply), fields(reply_to = %reply.reply_to))]
    pub async fn handle_admin_reply(&self, reply: AdminReply) -> Result<()> {
        if !self.inner.directory.is_admin(reply.sender).await {
            tracing::debug!(sender = %reply.sender, "reply from non-admin ignored");
            return Ok(());
        }

        if let Some(mapping) = self.inner.mappings.get(&reply.reply_to).await {
            if mapping.order_id.is_some() {
                return self.handle_eta_reply(&mapping, &reply).await;
            }
            return self.relay_review(&mapping, &reply).await;
        }

        // Best-effort fallback: an order id embedded in the replied-to
        // text. A reformatted id simply misses.
        if let Some(text) = &reply.replied_text {
            if let Some(record) = self.inner.registry.find_in_text(text).await {
                let config = &self.inner.config;
                let mapping = ThreadMapping {
                    customer_id: record.customer_id,
                    customer_chat: record.customer_chat,
                    summary: record.summary.clone(),
                    order_id: Some(record.order_id.clone()),
                    chat: config.admin_chat,
                    thread: config.admin_thread,
                    created_at: Utc::now(),
                };
                tracing::info!(order_id = %record.order_id, "reply resolved via embedded order id");
                return self.handle_eta_reply(&mapping, &reply).await;
            }
        }

        tracing::warn!("admin reply dropped: no correlation");
        Ok(())
    }

    /// Relays an admin's review back to the customer as an
    /// approve/reject prompt, with the admin text forwarded verbatim.
    async fn relay_review(&self, mapping: &ThreadMapping, reply: &AdminReply) -> Result<()> {
        if reply.chat != mapping.chat {
            let _ = self
                .inner
                .transport
                .send(reply.chat, reply.thread, &messages::stray_reply_notice(), None)
                .await;
            return Ok(());
        }

        let customer = mapping.customer_id;
        self.inner.awaiting_review.remove(&customer).await;

        let repriced = match self
            .inner
            .assistant
            .reprice(customer, &customer.to_string(), &reply.text)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "reprice failed; review not relayed");
                let _ = self
                    .inner
                    .transport
                    .send(mapping.customer_chat, None, &messages::apology_text(), None)
                    .await;
                return Ok(());
            }
        };

        let carried = self
            .inner
            .snapshots
            .get(&customer)
            .await
            .unwrap_or_default();
        let snapshot = ApprovalSnapshot {
            summary: repriced.clone(),
            config_text: reply.text.clone(),
            items: carried.items,
            total: extract_trailing_amount(&repriced).or(carried.total),
            from_cart: carried.from_cart,
        };
        self.inner
            .pending
            .insert(
                customer,
                PendingApproval::new(mapping.customer_chat, snapshot),
            )
            .await;

        match self
            .inner
            .transport
            .send(
                mapping.customer_chat,
                None,
                &messages::decision_prompt(&reply.text, &repriced),
                Some(messages::decision_keyboard()),
            )
            .await
        {
            Ok(_) => {
                metrics::counter!("approvals_relayed_total").increment(1);
            }
            Err(e) => {
                tracing::error!(error = %e, "decision prompt send failed");
                let config = &self.inner.config;
                let _ = self
                    .inner
                    .transport
                    .send(
                        config.admin_chat,
                        config.admin_thread,
                        &format!("⚠ Could not deliver the review to customer {customer}."),
                        None,
                    )
                    .await;
            }
        }
        Ok(())
    }

    /// Resolves the customer's approve/reject decision.
    ///
    /// The source is looked up through an ordered three-tier fallback —
    /// pending approval, then the latest negotiation snapshot, then the
    /// last suggested text — a deliberate degrade path for decisions
    /// that arrive after the pending entry was superseded. With no
    /// source at all, the customer is told nothing was found and no
    /// order is confirmed.
    #[tracing::instrument(skip(self), fields(%customer, approved))]
    pub async fn resolve_decision(
        &self,
        customer: CustomerId,
        chat: ChatId,
        approved: bool,
    ) -> Result<()> {
        let source = if let Some(pending) = self.inner.pending.remove(&customer).await {
            Some(pending.snapshot)
        } else if let Some(snapshot) = self.inner.snapshots.get(&customer).await {
            tracing::debug!("decision resolved from negotiation snapshot");
            Some(snapshot)
        } else {
            self.inner
                .suggestions
                .get(&customer)
                .await
                .map(|text| {
                    tracing::debug!("decision resolved from last suggestion");
                    ApprovalSnapshot::from_text(text)
                })
        };

        let Some(snapshot) = source else {
            tracing::warn!("decision with no resolvable source");
            let _ = self
                .inner
                .transport
                .send(chat, None, &messages::nothing_to_decide_text(), None)
                .await;
            return Ok(());
        };

        if approved {
            self.start_session(customer, chat, snapshot).await
        } else {
            let content = if snapshot.config_text.is_empty() {
                None
            } else {
                Some(snapshot.config_text.clone())
            };
            self.schedule_reminder(customer, chat, content);
            let _ = self
                .inner
                .transport
                .send(chat, None, "Alright — we'll keep it for you.", None)
                .await;
            Ok(())
        }
    }
}
