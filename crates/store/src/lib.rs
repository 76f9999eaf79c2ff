//! Concurrent in-memory state tables.
//!
//! Every piece of shared orchestration state (sessions, pending approvals,
//! correlation mappings, profiles) lives in a [`Table`]: a read/write-locked
//! map that exposes only atomic operations and never hands out the
//! underlying collection.

pub mod table;

pub use table::Table;
