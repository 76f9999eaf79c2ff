//! Order & fulfillment orchestration core.
//!
//! This crate drives the multi-party purchase negotiation conducted over
//! asynchronous chat: the per-customer finalization session, the approval
//! relay between customer and admin channels, the fulfillment status flow,
//! and delayed re-engagement reminders. The chat transport, inventory
//! backend, admin directory, repricing assistant, and cart storage are
//! collaborators behind the traits in [`services`]; the [`Orchestrator`]
//! is the entry point invoked by the transport layer for every inbound
//! event.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod messages;
pub mod relay;
pub mod reminders;
pub mod services;
pub mod sessions;
pub mod status;

pub use config::Config;
pub use coordinator::{AdminReply, Orchestrator};
pub use error::{OrchestrationError, Result};
pub use messages::CallbackAction;
pub use relay::ThreadMapping;
pub use services::assistant::{CannedAssistant, PricingAssistant, extract_trailing_amount};
pub use services::cart::{CartService, InMemoryCartService};
pub use services::directory::{AdminDirectory, StaticAdminDirectory};
pub use services::inventory::{InMemoryInventoryService, InventoryAdjustment, InventoryService};
pub use services::transport::{
    Button, ChatTransport, Keyboard, RecordingTransport, SentMessage, TransportError,
};
