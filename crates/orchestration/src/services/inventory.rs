//! Inventory boundary and an in-memory stock-backed implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::OrchestrationError;

/// Result of a stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InventoryAdjustment {
    /// Number of items the delta was applied to.
    pub adjusted: usize,

    /// Exactly the item names the delta was applied to. Reservation
    /// bookkeeping records these so release always compensates the same
    /// set.
    pub applied: Vec<String>,
}

/// Trait for stock adjustments.
///
/// Callers bound every invocation with a timeout and must leave their
/// own bookkeeping untouched when the call errors or times out: a failed
/// reservation never marks items as reserved.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Applies `delta` to each named item (`-1` per unit reserves,
    /// `+1` per unit releases). Items unknown to the backend or without
    /// enough stock are skipped, not errors; they are simply absent from
    /// the applied set.
    async fn adjust(
        &self,
        items: &[String],
        delta: i64,
    ) -> Result<InventoryAdjustment, OrchestrationError>;
}

#[derive(Debug, Default)]
struct InventoryState {
    stock: HashMap<String, i64>,
    fail_on_adjust: bool,
}

/// In-memory inventory service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryService {
    state: Arc<RwLock<InventoryState>>,
}

impl InMemoryInventoryService {
    /// Creates a service with no stock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service with the given initial stock levels.
    pub fn with_stock<N: Into<String>>(stock: impl IntoIterator<Item = (N, i64)>) -> Self {
        let service = Self::new();
        {
            let mut state = service.state.write().unwrap();
            for (name, level) in stock {
                state.stock.insert(name.into(), level);
            }
        }
        service
    }

    /// Configures the service to fail on the next adjust call.
    pub fn set_fail_on_adjust(&self, fail: bool) {
        self.state.write().unwrap().fail_on_adjust = fail;
    }

    /// Returns the current stock level for an item.
    pub fn stock_level(&self, name: &str) -> Option<i64> {
        self.state.read().unwrap().stock.get(name).copied()
    }
}

#[async_trait]
impl InventoryService for InMemoryInventoryService {
    async fn adjust(
        &self,
        items: &[String],
        delta: i64,
    ) -> Result<InventoryAdjustment, OrchestrationError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_adjust {
            return Err(OrchestrationError::Inventory(
                "adjustment unavailable".to_string(),
            ));
        }

        let mut applied = Vec::new();
        for name in items {
            let Some(level) = state.stock.get_mut(name) else {
                continue;
            };
            if *level + delta < 0 {
                continue;
            }
            *level += delta;
            applied.push(name.clone());
        }

        Ok(InventoryAdjustment {
            adjusted: applied.len(),
            applied,
        })
    }
}
