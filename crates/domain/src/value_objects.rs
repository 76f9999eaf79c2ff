//! Value objects shared across the orchestration core.

use chrono::{DateTime, Utc};
use common::ChatId;
use serde::{Deserialize, Serialize};

/// Money amount in whole currency units.
///
/// Totals are carried through from repriced configuration text; no
/// fractional units are used anywhere in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
}

impl Money {
    /// Creates a money amount from whole units.
    pub fn new(amount: i64) -> Self {
        Self { amount }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { amount: 0 }
    }

    /// Returns the amount in whole units.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    /// Formats with a space as the thousands separator (`1 250 000`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let negative = self.amount < 0;
        let digits = self.amount.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(c);
        }
        if negative {
            write!(f, "-{grouped}")
        } else {
            write!(f, "{grouped}")
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            amount: self.amount + rhs.amount,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.amount += rhs.amount;
    }
}

/// A normalized phone number: optional leading `+`, digits only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Wraps an already-normalized phone string.
    ///
    /// Use [`crate::session::validate::normalize_phone`] to produce one
    /// from raw input.
    pub fn new_unchecked(normalized: impl Into<String>) -> Self {
        Self(normalized.into())
    }

    /// Returns the phone number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A delivery location: either free text or shared coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Location {
    /// Free-text address as typed by the customer.
    Text(String),

    /// Shared coordinates.
    Point { lat: f64, lon: f64 },
}

impl Location {
    /// Renders the location for outbound messages.
    ///
    /// Coordinates become a map link so fulfillment staff can open them
    /// directly.
    pub fn display_text(&self) -> String {
        match self {
            Location::Text(text) => text.clone(),
            Location::Point { lat, lon } => {
                format!("https://maps.google.com/?q={lat},{lon}")
            }
        }
    }
}

/// How a finalized order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Customer picks the order up.
    Pickup,

    /// Order is delivered by courier.
    Courier,
}

impl DeliveryMethod {
    /// Parses a delivery method from a callback payload token.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pickup" => Some(DeliveryMethod::Pickup),
            "courier" => Some(DeliveryMethod::Courier),
            _ => None,
        }
    }

    /// Returns the method name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Courier => "courier",
        }
    }
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Saved customer contact details, reused to pre-fill future sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub name: Option<String>,
    pub phone: Option<PhoneNumber>,
}

impl CustomerProfile {
    /// Returns true if no fields are filled.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none()
    }
}

/// A negotiated configuration carried into a session.
///
/// Produced by the pre-session negotiation (or by an admin edit relayed
/// back to the customer) and consumed when the customer approves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApprovalSnapshot {
    /// Customer-facing summary of the configuration.
    pub summary: String,

    /// Full configuration text (opaque to the core).
    pub config_text: String,

    /// Item names to reserve, when the configuration is structured.
    pub items: Vec<String>,

    /// Computed total, when one could be extracted.
    pub total: Option<Money>,

    /// Whether finalization should also clear the customer's cart.
    pub from_cart: bool,
}

impl ApprovalSnapshot {
    /// Builds a snapshot from plain text with no structured items.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            summary: text.clone(),
            config_text: text,
            ..Self::default()
        }
    }
}

/// A configuration awaiting (or resulting from) admin review.
///
/// At most one outstanding per customer; superseded entries are simply
/// overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingApproval {
    /// Chat to route the decision outcome to.
    pub chat: ChatId,

    /// The configuration under review.
    pub snapshot: ApprovalSnapshot,

    /// When the entry was stored.
    pub created_at: DateTime<Utc>,
}

impl PendingApproval {
    /// Creates a pending approval stamped with the current time.
    pub fn new(chat: ChatId, snapshot: ApprovalSnapshot) -> Self {
        Self {
            chat,
            snapshot,
            created_at: Utc::now(),
        }
    }
}
