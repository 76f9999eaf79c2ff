//! Order session flow: start, advance, back, finalize, close.

use std::collections::BTreeSet;

use common::{ChatId, CustomerId, MessageRef};
use domain::session::validate::{
    is_purchase_intent, normalize_phone, parse_location, validate_name,
};
use domain::{ApprovalSnapshot, CustomerProfile, DeliveryMethod, OrderSession, SessionStage};
use registry::{NewOrder, OrderRecord};
use tokio::time::timeout;

use crate::coordinator::Orchestrator;
use crate::error::{OrchestrationError, Result};
use crate::messages;
use crate::services::assistant::{PricingAssistant, extract_trailing_amount};
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
    /// Starts a purchase-finalization session for the customer.
    ///
    /// Cancels any pending reminder, supersedes (and compensates) a
    /// previous session, pre-fills contact fields from the saved
    /// profile, and makes a best-effort inventory reservation — a failed
    /// reservation never blocks the session.
    #[tracing::instrument(skip(self, snapshot), fields(%customer))]
    pub async fn start_session(
        &self,
        customer: CustomerId,
        chat: ChatId,
        snapshot: ApprovalSnapshot,
    ) -> Result<()> {
        self.cancel_reminder(customer);

        // A new session supersedes the old one, but its reservation must
        // be released first.
        if let Some(mut old) = self.inner.sessions.remove(&customer).await {
            if let Some(items) = old.take_reservation() {
                self.release_items(&items).await;
            }
            if let Some(target) = old.clear_form_message() {
                if let Err(e) = self.inner.transport.delete(target).await {
                    tracing::warn!(error = %e, "stale form delete failed");
                }
            }
            tracing::info!("superseded previous session");
        }

        let mut session = OrderSession::new(customer, chat, snapshot.clone());
        if let Some(profile) = self.inner.profiles.get(&customer).await {
            session.prefill(&profile);
        }

        if !snapshot.items.is_empty() {
            let call = self.inner.inventory.adjust(&snapshot.items, -1);
            match timeout(self.inner.config.inventory_timeout, call).await {
                Ok(Ok(adjustment)) if !adjustment.applied.is_empty() => {
                    let items: BTreeSet<String> = adjustment.applied.into_iter().collect();
                    tracing::info!(reserved = items.len(), "inventory reserved");
                    let _ = session.mark_reserved(items);
                }
                Ok(Ok(_)) => {
                    tracing::info!("no reservable items; session proceeds unreserved");
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "reservation failed; session proceeds unreserved");
                }
                Err(_) => {
                    tracing::warn!("reservation timed out; session proceeds unreserved");
                }
            }
        }

        self.inner.sessions.insert(customer, session).await;
        metrics::counter!("sessions_started_total").increment(1);

        self.render_form(customer, None).await
    }

    /// Feeds a text input into the customer's session.
    ///
    /// On validation failure the current stage is re-prompted with an
    /// error note and the stage does not advance. A purchase-intent
    /// utterance re-prompts instead of being treated as input.
    pub(crate) async fn advance_session(
        &self,
        customer: CustomerId,
        _chat: ChatId,
        text: &str,
    ) -> Result<()> {
        let Some(session) = self.inner.sessions.get(&customer).await else {
            tracing::debug!(%customer, "input for a session that no longer exists");
            return Ok(());
        };

        // The state machine never infers intent across stage boundaries.
        if is_purchase_intent(text) {
            return self.render_form(customer, None).await;
        }

        let observed = session.stage();
        let error_note = match observed {
            SessionStage::NeedName => match validate_name(text) {
                Ok(name) => {
                    if !self.apply_at_stage(customer, observed, |s| s.set_name(name.clone())).await {
                        return Ok(());
                    }
                    self.save_profile(customer, |p| p.name = Some(name)).await;
                    None
                }
                Err(e) => Some(e.to_string()),
            },
            SessionStage::NeedPhone => match normalize_phone(text) {
                Ok(phone) => {
                    if !self
                        .apply_at_stage(customer, observed, |s| s.set_phone(phone.clone()))
                        .await
                    {
                        return Ok(());
                    }
                    self.save_profile(customer, |p| p.phone = Some(phone)).await;
                    None
                }
                Err(e) => Some(e.to_string()),
            },
            SessionStage::NeedLocation => match parse_location(text) {
                Ok(location) => {
                    if !self
                        .apply_at_stage(customer, observed, |s| s.set_location(location.clone()))
                        .await
                    {
                        return Ok(());
                    }
                    None
                }
                Err(e) => Some(e.to_string()),
            },
            SessionStage::NeedDeliveryChoice | SessionStage::NeedDeliveryConfirm => {
                Some("Please use the buttons below.".to_string())
            }
        };

        self.render_form(customer, error_note.as_deref()).await
    }

    /// Records the chosen delivery method and advances to confirmation.
    pub async fn choose_delivery(
        &self,
        customer: CustomerId,
        method: DeliveryMethod,
    ) -> Result<()> {
        let applied = self
            .inner
            .sessions
            .update(&customer, |s| s.choose_delivery(method).is_ok())
            .await;
        match applied {
            None => Err(OrchestrationError::SessionNotFound(customer)),
            Some(false) => self.render_form(customer, None).await,
            Some(true) => self.render_form(customer, None).await,
        }
    }

    /// Moves the session exactly one stage backward. No-op at the first
    /// stage.
    pub async fn session_back(&self, customer: CustomerId) -> Result<()> {
        match self.inner.sessions.update(&customer, |s| s.back()).await {
            None => Err(OrchestrationError::SessionNotFound(customer)),
            Some(_) => self.render_form(customer, None).await,
        }
    }

    /// Finalizes using the delivery method already collected by the
    /// session; re-prompts if none was chosen yet.
    pub(crate) async fn confirm_current(&self, customer: CustomerId) -> Result<()> {
        let Some(session) = self.inner.sessions.get(&customer).await else {
            return Err(OrchestrationError::SessionNotFound(customer));
        };
        let Some(delivery) = session.delivery() else {
            return self
                .render_form(customer, Some("Choose a delivery method first."))
                .await;
        };
        self.finalize_session(customer, delivery, None).await.map(|_| ())
    }

    /// Submits the session as an order.
    ///
    /// Only valid from the last two stages. The session is removed from
    /// the table before the first transport call, so a second submit
    /// attempt finds nothing to finalize.
    #[tracing::instrument(skip(self, note), fields(%customer))]
    pub async fn finalize_session(
        &self,
        customer: CustomerId,
        delivery: DeliveryMethod,
        note: Option<&str>,
    ) -> Result<OrderRecord> {
        let Some(mut session) = self.inner.sessions.remove(&customer).await else {
            return Err(OrchestrationError::SessionNotFound(customer));
        };

        if !session.stage().can_finalize() {
            let stage = session.stage();
            self.inner.sessions.insert(customer, session).await;
            return Err(domain::SessionError::NotFinalizable { stage }.into());
        }

        let (Some(name), Some(phone), Some(location)) =
            (session.name(), session.phone(), session.location())
        else {
            let stage = session.stage();
            self.inner.sessions.insert(customer, session).await;
            return Err(domain::SessionError::NotFinalizable { stage }.into());
        };
        let name = name.to_string();
        let phone = phone.clone();
        let location = location.display_text();

        let mut summary = session.snapshot().summary.clone();
        if let Some(note) = note {
            summary.push_str("\nNote: ");
            summary.push_str(note);
        }
        let total = session
            .total()
            .or_else(|| extract_trailing_amount(&session.snapshot().config_text));

        // Consumption on submit is release-free: the decrement already
        // happened at reservation time.
        session.take_reservation();
        let form_message = session.clear_form_message();
        let from_cart = session.from_cart();
        let customer_chat = session.chat();

        let record = self
            .inner
            .registry
            .submit(NewOrder {
                customer_id: customer,
                customer_chat,
                customer_name: name,
                phone,
                location,
                summary,
                total,
                delivery,
            })
            .await;

        self.dispatch_board_entry(&record).await;

        if let Some(target) = form_message {
            if let Err(e) = self.inner.transport.delete(target).await {
                tracing::warn!(error = %e, "form cleanup delete failed");
            }
        }

        match self
            .inner
            .transport
            .send(
                customer_chat,
                None,
                &messages::confirmation_text(&record),
                None,
            )
            .await
        {
            Ok(id) => {
                let _ = self
                    .inner
                    .registry
                    .set_confirm_message(&record.order_id, MessageRef::new(customer_chat, id))
                    .await;
            }
            Err(e) => tracing::warn!(error = %e, "confirmation send failed"),
        }

        if from_cart {
            if let Err(e) = self.inner.cart.clear(customer).await {
                tracing::warn!(error = %e, "cart clear failed");
            }
        }

        // The negotiation context is spent.
        self.inner.pending.remove(&customer).await;
        self.inner.snapshots.remove(&customer).await;
        self.inner.suggestions.remove(&customer).await;
        self.inner.awaiting_review.remove(&customer).await;

        metrics::counter!("orders_submitted_total").increment(1);
        tracing::info!(order_id = %record.order_id, "order submitted");

        Ok(record)
    }

    /// Closes the session without submitting: releases any reservation,
    /// deletes the tracked form message, destroys the session.
    #[tracing::instrument(skip(self), fields(%customer))]
    pub async fn close_session(&self, customer: CustomerId) -> Result<()> {
        let Some(mut session) = self.inner.sessions.remove(&customer).await else {
            return Err(OrchestrationError::SessionNotFound(customer));
        };

        if let Some(items) = session.take_reservation() {
            self.release_items(&items).await;
        }

        if let Some(target) = session.clear_form_message() {
            if let Err(e) = self.inner.transport.delete(target).await {
                tracing::warn!(error = %e, "form delete failed");
            }
        }

        tracing::info!("session closed without submission");
        Ok(())
    }

    /// Sends the active-orders board entry to the fulfillment channel.
    async fn dispatch_board_entry(&self, record: &OrderRecord) {
        let config = &self.inner.config;
        match self
            .inner
            .transport
            .send(
                config.admin_chat,
                config.admin_thread,
                &messages::board_text(record),
                messages::board_keyboard(record),
            )
            .await
        {
            Ok(id) => {
                let _ = self
                    .inner
                    .registry
                    .set_board_message(&record.order_id, MessageRef::new(config.admin_chat, id))
                    .await;
            }
            Err(e) => tracing::warn!(error = %e, "board entry send failed"),
        }
    }

    /// Renders the form for the session's current stage, editing the
    /// previous form message in place when one exists. A failed edit
    /// falls back to a fresh send — the only flow with that fallback.
    pub(crate) async fn render_form(
        &self,
        customer: CustomerId,
        error_note: Option<&str>,
    ) -> Result<()> {
        let Some(session) = self.inner.sessions.get(&customer).await else {
            return Ok(());
        };

        let text = messages::form_prompt(&session, error_note);
        let keyboard = messages::form_keyboard(session.stage());

        if let Some(target) = session.form_message() {
            match self
                .inner
                .transport
                .edit(target, &text, Some(keyboard.clone()))
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(error = %e, "form edit failed; sending fresh form");
                }
            }
        }

        let chat = session.chat();
        let id = self
            .inner
            .transport
            .send(chat, None, &text, Some(keyboard))
            .await?;
        self.inner
            .sessions
            .update(&customer, |s| s.set_form_message(MessageRef::new(chat, id)))
            .await;
        Ok(())
    }

    /// Applies a session mutation only if the stage is still the one the
    /// handler observed; a concurrent change drops the input.
    async fn apply_at_stage(
        &self,
        customer: CustomerId,
        observed: SessionStage,
        mutate: impl FnOnce(&mut OrderSession) -> std::result::Result<(), domain::SessionError>,
    ) -> bool {
        let applied = self
            .inner
            .sessions
            .update(&customer, |s| {
                if s.stage() != observed {
                    return false;
                }
                mutate(s).is_ok()
            })
            .await
            .unwrap_or(false);
        if !applied {
            tracing::debug!(%customer, stage = %observed, "session changed underneath handler; input dropped");
        }
        applied
    }

    /// Merges a fragment into the customer's saved profile.
    async fn save_profile(&self, customer: CustomerId, f: impl FnOnce(&mut CustomerProfile)) {
        let mut profile = self
            .inner
            .profiles
            .get(&customer)
            .await
            .unwrap_or_default();
        f(&mut profile);
        self.inner.profiles.insert(customer, profile).await;
    }

    /// Compensating increment for a released reservation. Failures are
    /// logged; the session bookkeeping is already cleared by the caller.
    pub(crate) async fn release_items(&self, items: &BTreeSet<String>) {
        let list: Vec<String> = items.iter().cloned().collect();
        let call = self.inner.inventory.adjust(&list, 1);
        match timeout(self.inner.config.inventory_timeout, call).await {
            Ok(Ok(adjustment)) => {
                tracing::info!(released = adjustment.adjusted, "inventory released");
            }
            Ok(Err(e)) => tracing::error!(error = %e, "inventory release failed"),
            Err(_) => tracing::error!("inventory release timed out"),
        }
    }
}
