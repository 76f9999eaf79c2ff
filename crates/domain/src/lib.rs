//! Domain layer for the order orchestration core.
//!
//! This crate provides the pure (I/O-free) model:
//! - `OrderSession` and its stage state machine for the per-customer
//!   purchase-finalization flow
//! - input validation for collected fields (name, phone, location)
//! - fulfillment lifecycle states for submitted orders
//! - value objects shared by the effectful crates

pub mod error;
pub mod session;
pub mod status;
pub mod value_objects;

pub use error::{SessionError, ValidationError};
pub use session::{OrderSession, SessionStage};
pub use session::validate::{is_purchase_intent, normalize_phone, parse_location, validate_name};
pub use status::OrderStatus;
pub use value_objects::{
    ApprovalSnapshot, CustomerProfile, DeliveryMethod, Location, Money, PendingApproval,
    PhoneNumber,
};
