//! Per-customer purchase-finalization session.

pub mod session;
pub mod stage;
pub mod validate;

pub use session::OrderSession;
pub use stage::SessionStage;
