//! Shared identifier types used across the orchestration workspace.

pub mod types;

pub use types::{ChatId, CustomerId, MessageId, MessageRef, OrderId, ThreadId};
