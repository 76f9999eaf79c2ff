//! Orchestration facade.
//!
//! The [`Orchestrator`] owns every state table and collaborator handle
//! and exposes the entry points invoked by the transport layer: button
//! presses, plain text, and admin replies. Handlers never hold a table
//! lock across a transport call.

use std::sync::Arc;

use common::{ChatId, CustomerId, MessageId, ThreadId};
use domain::{ApprovalSnapshot, CustomerProfile, OrderSession, PendingApproval, SessionStage};
use registry::StatusRegistry;
use store::Table;

use crate::config::Config;
use crate::error::Result;
use crate::messages::CallbackAction;
use crate::relay::ThreadMapping;
use crate::reminders::ReminderRegistry;
use crate::services::assistant::PricingAssistant;
use crate::services::cart::CartService;
use crate::services::directory::AdminDirectory;
use crate::services::inventory::InventoryService;
use crate::services::transport::ChatTransport;

/// An admin's reply to a previously sent channel message, as delivered
/// by the transport layer.
#[derive(Debug, Clone)]
pub struct AdminReply {
    /// Who wrote the reply.
    pub sender: CustomerId,

    /// Chat the reply arrived in.
    pub chat: ChatId,

    /// Thread the reply arrived in, if any.
    pub thread: Option<ThreadId>,

    /// The message being replied to; the correlation key.
    pub reply_to: MessageId,

    /// Text of the replied-to message, when the transport provides it.
    /// Used only for the order-id fallback lookup.
    pub replied_text: Option<String>,

    /// The reply text itself.
    pub text: String,
}

pub(crate) struct Inner<T, I, D, P, C> {
    pub(crate) transport: T,
    pub(crate) inventory: I,
    pub(crate) directory: D,
    pub(crate) assistant: P,
    pub(crate) cart: C,
    pub(crate) config: Config,
    pub(crate) registry: StatusRegistry,
    pub(crate) sessions: Table<CustomerId, OrderSession>,
    pub(crate) pending: Table<CustomerId, PendingApproval>,
    pub(crate) snapshots: Table<CustomerId, ApprovalSnapshot>,
    pub(crate) suggestions: Table<CustomerId, String>,
    pub(crate) mappings: Table<MessageId, ThreadMapping>,
    pub(crate) awaiting_review: Table<CustomerId, ()>,
    pub(crate) profiles: Table<CustomerId, CustomerProfile>,
    pub(crate) reminders: ReminderRegistry,
}

/// Drives sessions, the approval relay, the fulfillment status flow,
/// and reminders through its collaborator services.
pub struct Orchestrator<T, I, D, P, C>
where
    T: ChatTransport,
    I: InventoryService,
    D: AdminDirectory,
    P: PricingAssistant,
    C: CartService,
{
    pub(crate) inner: Arc<Inner<T, I, D, P, C>>,
}

impl<T, I, D, P, C> Clone for Orchestrator<T, I, D, P, C>
where
    T: ChatTransport,
    I: InventoryService,
    D: AdminDirectory,
    P: PricingAssistant,
    C: CartService,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, I, D, P, C> Orchestrator<T, I, D, P, C>
where
    T: ChatTransport + 'static,
    I: InventoryService + 'static,
    D: AdminDirectory + 'static,
    P: PricingAssistant + 'static,
    C: CartService + 'static,
{
    /// Creates a new orchestrator over the given collaborators.
    pub fn new(
        transport: T,
        inventory: I,
        directory: D,
        assistant: P,
        cart: C,
        config: Config,
    ) -> Self {
        let reminders = ReminderRegistry::new(config.reminders_enabled);
        Self {
            inner: Arc::new(Inner {
                transport,
                inventory,
                directory,
                assistant,
                cart,
                config,
                registry: StatusRegistry::new(),
                sessions: Table::new(),
                pending: Table::new(),
                snapshots: Table::new(),
                suggestions: Table::new(),
                mappings: Table::new(),
                awaiting_review: Table::new(),
                profiles: Table::new(),
                reminders,
            }),
        }
    }

    /// Returns the order status registry.
    pub fn registry(&self) -> &StatusRegistry {
        &self.inner.registry
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Returns the current stage of the customer's session, if one exists.
    pub async fn session_stage(&self, customer: CustomerId) -> Option<SessionStage> {
        self.inner
            .sessions
            .get(&customer)
            .await
            .map(|s| s.stage())
    }

    /// Returns true if the customer has an active session.
    pub async fn has_session(&self, customer: CustomerId) -> bool {
        self.inner.sessions.contains(&customer).await
    }

    /// Returns the customer's pending approval, if any.
    pub async fn pending_approval(&self, customer: CustomerId) -> Option<PendingApproval> {
        self.inner.pending.get(&customer).await
    }

    /// Returns how many approval requests are awaiting an admin reply.
    pub async fn awaiting_review_count(&self) -> usize {
        self.inner.awaiting_review.len().await
    }

    /// Returns the customer's saved contact profile, if any.
    pub async fn profile(&self, customer: CustomerId) -> Option<CustomerProfile> {
        self.inner.profiles.get(&customer).await
    }

    /// Records the latest negotiation snapshot for the customer.
    ///
    /// Serves as the second fallback tier when a decision arrives after
    /// the pending entry was superseded. Like every customer
    /// interaction, it replaces any outstanding reminder.
    pub async fn record_snapshot(&self, customer: CustomerId, snapshot: ApprovalSnapshot) {
        self.cancel_reminder(customer);
        self.inner.snapshots.insert(customer, snapshot).await;
    }

    /// Records the last suggested configuration text for the customer —
    /// the third and final decision fallback tier.
    pub async fn record_suggestion(&self, customer: CustomerId, text: impl Into<String>) {
        self.inner.suggestions.insert(customer, text.into()).await;
    }

    /// Entry point for an inline-keyboard button press.
    #[tracing::instrument(skip(self, callback_id, payload), fields(%customer))]
    pub async fn handle_callback(
        &self,
        customer: CustomerId,
        chat: ChatId,
        callback_id: &str,
        payload: &str,
    ) -> Result<()> {
        if let Err(e) = self.inner.transport.ack_callback(callback_id).await {
            tracing::warn!(error = %e, "callback ack failed");
        }

        let Some(action) = CallbackAction::parse(payload) else {
            tracing::warn!(payload, "unknown callback payload dropped");
            return Ok(());
        };

        let result = match action {
            CallbackAction::Approve => self.resolve_decision(customer, chat, true).await,
            CallbackAction::Decline => self.resolve_decision(customer, chat, false).await,
            CallbackAction::Delivery(method) => self.choose_delivery(customer, method).await,
            CallbackAction::Back => self.session_back(customer).await,
            CallbackAction::ConfirmOrder => self.confirm_current(customer).await,
            CallbackAction::CancelSession => self.close_session(customer).await,
            CallbackAction::Ready(order_id) => {
                if !self.require_admin(customer).await {
                    return Ok(());
                }
                self.mark_ready(&order_id).await
            }
            CallbackAction::Delivered(order_id) => {
                if !self.require_admin(customer).await {
                    return Ok(());
                }
                self.mark_delivered(&order_id).await
            }
            CallbackAction::CancelOrder(order_id) => {
                if !self.require_admin(customer).await {
                    return Ok(());
                }
                self.cancel_order(&order_id).await
            }
        };

        // Nothing here is fatal: operational misses are logged and the
        // event loop moves on to the next event.
        if let Err(e) = result {
            tracing::warn!(error = %e, "callback handling failed");
        }
        Ok(())
    }

    /// Entry point for a plain text message from a customer.
    #[tracing::instrument(skip(self, text), fields(%customer))]
    pub async fn handle_text(&self, customer: CustomerId, chat: ChatId, text: &str) -> Result<()> {
        if self.inner.sessions.contains(&customer).await {
            self.advance_session(customer, chat, text).await
        } else {
            tracing::debug!("text outside a session ignored");
            Ok(())
        }
    }

    async fn require_admin(&self, customer: CustomerId) -> bool {
        if self.inner.directory.is_admin(customer).await {
            true
        } else {
            tracing::warn!(%customer, "non-admin fulfillment action ignored");
            false
        }
    }
}
