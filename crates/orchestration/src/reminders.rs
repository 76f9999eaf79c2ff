//! Delayed re-engagement reminders.
//!
//! One cancellable one-shot timer per customer, replaced atomically on
//! reschedule. Cancellation is cooperative: a timer already inside its
//! callback re-checks the global enable flag before sending anything.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use common::{ChatId, CustomerId};
use domain::{ApprovalSnapshot, PendingApproval};
use rand::seq::SliceRandom;
use tokio::task::AbortHandle;

use crate::coordinator::Orchestrator;
use crate::messages;
use crate::services::assistant::PricingAssistant;
use crate::services::cart::CartService;
use crate::services::directory::AdminDirectory;
use crate::services::inventory::InventoryService;
use crate::services::transport::ChatTransport;

/// Registry of outstanding reminder timers and the global enable flag.
pub(crate) struct ReminderRegistry {
    timers: Mutex<HashMap<CustomerId, AbortHandle>>,
    enabled: AtomicBool,
}

impl ReminderRegistry {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            timers: Mutex::new(HashMap::new()),
            enabled: AtomicBool::new(enabled),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Stores a timer handle, aborting any timer it replaces.
    pub(crate) fn store(&self, customer: CustomerId, handle: AbortHandle) {
        let mut timers = self.timers.lock().unwrap();
        if let Some(old) = timers.insert(customer, handle) {
            old.abort();
        }
    }

    /// Aborts and removes the customer's timer, if any.
    pub(crate) fn cancel(&self, customer: CustomerId) -> bool {
        let mut timers = self.timers.lock().unwrap();
        match timers.remove(&customer) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Removes the customer's entry without aborting; called by the
    /// timer itself as it fires.
    pub(crate) fn forget(&self, customer: CustomerId) {
        self.timers.lock().unwrap().remove(&customer);
    }

    /// Aborts and removes every timer.
    pub(crate) fn clear(&self) {
        let mut timers = self.timers.lock().unwrap();
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.timers.lock().unwrap().len()
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
    /// Schedules a delayed re-engagement message for the customer,
    /// replacing any existing timer. Does nothing while reminders are
    /// globally disabled. The delay is the configured one clamped to the
    /// operator bounds.
    pub fn schedule_reminder(
        &self,
        customer: CustomerId,
        chat: ChatId,
        content: Option<String>,
    ) {
        self.inner.reminders.cancel(customer);

        if !self.inner.reminders.is_enabled() {
            tracing::debug!(%customer, "reminders disabled; not scheduling");
            return;
        }

        let delay = self.inner.config.clamped_reminder_delay();
        let this = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.fire_reminder(customer, chat, content).await;
        })
        .abort_handle();

        self.inner.reminders.store(customer, handle);
        tracing::info!(%customer, delay_secs = delay.as_secs(), "reminder scheduled");
    }

    /// Cancels the customer's outstanding reminder, if any.
    pub fn cancel_reminder(&self, customer: CustomerId) -> bool {
        self.inner.reminders.cancel(customer)
    }

    /// Global kill switch: stops and clears every outstanding timer and
    /// keeps new ones from being scheduled.
    pub fn disable_reminders(&self) {
        self.inner.reminders.set_enabled(false);
        self.inner.reminders.clear();
        tracing::info!("reminders disabled");
    }

    /// Returns true while reminders are globally enabled.
    pub fn reminders_enabled(&self) -> bool {
        self.inner.reminders.is_enabled()
    }

    /// Returns the number of outstanding reminder timers.
    pub fn outstanding_reminders(&self) -> usize {
        self.inner.reminders.len()
    }

    /// Timer body. Re-checks enablement (the switch may have flipped
    /// after scheduling), stores the content as a fresh pending approval
    /// so a subsequent "yes" resolves, and sends the prompt.
    async fn fire_reminder(&self, customer: CustomerId, chat: ChatId, content: Option<String>) {
        self.inner.reminders.forget(customer);

        if !self.inner.reminders.is_enabled() {
            tracing::debug!(%customer, "reminder suppressed: disabled after scheduling");
            return;
        }

        let body = content.unwrap_or_else(|| {
            messages::REMINDER_TEMPLATES
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(messages::REMINDER_TEMPLATES[0])
                .to_string()
        });

        self.inner
            .pending
            .insert(
                customer,
                PendingApproval::new(chat, ApprovalSnapshot::from_text(body.clone())),
            )
            .await;

        match self
            .inner
            .transport
            .send(
                chat,
                None,
                &messages::reminder_text(&body),
                Some(messages::decision_keyboard()),
            )
            .await
        {
            Ok(_) => {
                metrics::counter!("reminders_fired_total").increment(1);
                tracing::info!(%customer, "reminder sent");
            }
            Err(e) => tracing::warn!(%customer, error = %e, "reminder send failed"),
        }
    }
}
