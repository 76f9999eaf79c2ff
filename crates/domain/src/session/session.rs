//! Order session record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::{ChatId, CustomerId, MessageRef};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::value_objects::{
    ApprovalSnapshot, CustomerProfile, DeliveryMethod, Location, Money, PhoneNumber,
};

use super::SessionStage;

/// Per-customer finite-state record of an in-progress purchase.
///
/// Created when the customer approves a quoted configuration, destroyed
/// on submission, cancellation, or closure. At most one session exists
/// per customer at any time; the flow layer enforces that creating a new
/// one first releases any inventory the previous one reserved.
///
/// Stage transitions go through the typed setters below; fields are
/// never mutated directly, so the reservation bookkeeping invariant
/// (`reserved_items` non-empty only while `inventory_reserved`) holds by
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSession {
    customer_id: CustomerId,
    chat: ChatId,
    stage: SessionStage,
    name: Option<String>,
    phone: Option<PhoneNumber>,
    location: Option<Location>,
    delivery: Option<DeliveryMethod>,
    snapshot: ApprovalSnapshot,
    inventory_reserved: bool,
    reserved_items: BTreeSet<String>,
    form_message: Option<MessageRef>,
    created_at: DateTime<Utc>,
}

impl OrderSession {
    /// Creates a fresh session at the first stage.
    pub fn new(customer_id: CustomerId, chat: ChatId, snapshot: ApprovalSnapshot) -> Self {
        Self {
            customer_id,
            chat,
            stage: SessionStage::NeedName,
            name: None,
            phone: None,
            location: None,
            delivery: None,
            snapshot,
            inventory_reserved: false,
            reserved_items: BTreeSet::new(),
            form_message: None,
            created_at: Utc::now(),
        }
    }

    /// Pre-fills contact fields from a saved profile, advancing the
    /// initial stage past fields that are already known.
    ///
    /// Only meaningful immediately after construction.
    pub fn prefill(&mut self, profile: &CustomerProfile) {
        if self.stage != SessionStage::NeedName {
            return;
        }
        if let Some(name) = &profile.name {
            self.name = Some(name.clone());
            self.stage = SessionStage::NeedPhone;
        }
        if self.name.is_some()
            && let Some(phone) = &profile.phone
        {
            self.phone = Some(phone.clone());
            self.stage = SessionStage::NeedLocation;
        }
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn chat(&self) -> ChatId {
        self.chat
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn delivery(&self) -> Option<DeliveryMethod> {
        self.delivery
    }

    pub fn snapshot(&self) -> &ApprovalSnapshot {
        &self.snapshot
    }

    pub fn total(&self) -> Option<Money> {
        self.snapshot.total
    }

    pub fn from_cart(&self) -> bool {
        self.snapshot.from_cart
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Records a validated name and advances to the phone stage.
    pub fn set_name(&mut self, name: String) -> Result<(), SessionError> {
        if self.stage != SessionStage::NeedName {
            return Err(SessionError::WrongStage { stage: self.stage });
        }
        self.name = Some(name);
        self.stage = SessionStage::NeedPhone;
        Ok(())
    }

    /// Records a normalized phone number and advances to the location stage.
    pub fn set_phone(&mut self, phone: PhoneNumber) -> Result<(), SessionError> {
        if self.stage != SessionStage::NeedPhone {
            return Err(SessionError::WrongStage { stage: self.stage });
        }
        self.phone = Some(phone);
        self.stage = SessionStage::NeedLocation;
        Ok(())
    }

    /// Records a delivery location and advances to the delivery-choice stage.
    pub fn set_location(&mut self, location: Location) -> Result<(), SessionError> {
        if self.stage != SessionStage::NeedLocation {
            return Err(SessionError::WrongStage { stage: self.stage });
        }
        self.location = Some(location);
        self.stage = SessionStage::NeedDeliveryChoice;
        Ok(())
    }

    /// Records the chosen delivery method and advances to confirmation.
    pub fn choose_delivery(&mut self, method: DeliveryMethod) -> Result<(), SessionError> {
        if self.stage != SessionStage::NeedDeliveryChoice {
            return Err(SessionError::WrongStage { stage: self.stage });
        }
        self.delivery = Some(method);
        self.stage = SessionStage::NeedDeliveryConfirm;
        Ok(())
    }

    /// Moves exactly one stage backward, clearing the field that will be
    /// re-collected. No-op at the first stage; returns whether anything
    /// moved.
    pub fn back(&mut self) -> bool {
        let Some(previous) = self.stage.back() else {
            return false;
        };
        match previous {
            SessionStage::NeedName => self.name = None,
            SessionStage::NeedPhone => self.phone = None,
            SessionStage::NeedLocation => self.location = None,
            SessionStage::NeedDeliveryChoice => self.delivery = None,
            SessionStage::NeedDeliveryConfirm => {}
        }
        self.stage = previous;
        true
    }

    /// Returns true if the session holds an inventory reservation.
    pub fn is_reserved(&self) -> bool {
        self.inventory_reserved
    }

    /// Returns the item names recorded at reservation time.
    pub fn reserved_items(&self) -> &BTreeSet<String> {
        &self.reserved_items
    }

    /// Records a successful reservation for the given item names.
    ///
    /// Called only after the inventory call succeeded; an empty set
    /// leaves the session unreserved.
    pub fn mark_reserved(&mut self, items: BTreeSet<String>) -> Result<(), SessionError> {
        if self.inventory_reserved {
            return Err(SessionError::AlreadyReserved);
        }
        if items.is_empty() {
            return Ok(());
        }
        self.inventory_reserved = true;
        self.reserved_items = items;
        Ok(())
    }

    /// Clears the reservation bookkeeping and returns the exact item set
    /// recorded at reservation time, for release or submit-consumption.
    pub fn take_reservation(&mut self) -> Option<BTreeSet<String>> {
        if !self.inventory_reserved {
            return None;
        }
        self.inventory_reserved = false;
        Some(std::mem::take(&mut self.reserved_items))
    }

    pub fn form_message(&self) -> Option<MessageRef> {
        self.form_message
    }

    /// Records the identifier of the last rendered form message.
    pub fn set_form_message(&mut self, message: MessageRef) {
        self.form_message = Some(message);
    }

    /// Clears and returns the tracked form message.
    pub fn clear_form_message(&mut self) -> Option<MessageRef> {
        self.form_message.take()
    }
}
