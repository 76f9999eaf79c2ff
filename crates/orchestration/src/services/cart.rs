//! Shopping-cart boundary.
//!
//! The cart itself lives outside the core; finalization only needs to
//! clear it when the session was started from cart contents.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::CustomerId;

use crate::error::OrchestrationError;

/// Trait for clearing a customer's cart.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Removes every item from the customer's cart.
    async fn clear(&self, customer: CustomerId) -> Result<(), OrchestrationError>;
}

#[derive(Debug, Default)]
struct CartState {
    carts: HashMap<CustomerId, Vec<String>>,
    cleared: Vec<CustomerId>,
}

/// In-memory cart service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartService {
    state: Arc<RwLock<CartState>>,
}

impl InMemoryCartService {
    /// Creates an empty cart service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts an item into a customer's cart.
    pub fn add_item(&self, customer: CustomerId, item: impl Into<String>) {
        self.state
            .write()
            .unwrap()
            .carts
            .entry(customer)
            .or_default()
            .push(item.into());
    }

    /// Returns the items currently in a customer's cart.
    pub fn items(&self, customer: CustomerId) -> Vec<String> {
        self.state
            .read()
            .unwrap()
            .carts
            .get(&customer)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the customers whose carts were cleared, in order.
    pub fn cleared(&self) -> Vec<CustomerId> {
        self.state.read().unwrap().cleared.clone()
    }
}

#[async_trait]
impl CartService for InMemoryCartService {
    async fn clear(&self, customer: CustomerId) -> Result<(), OrchestrationError> {
        let mut state = self.state.write().unwrap();
        state.carts.remove(&customer);
        state.cleared.push(customer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clear_removes_items_and_records_customer() {
        let cart = InMemoryCartService::new();
        let customer = CustomerId::new(1);

        cart.add_item(customer, "plov");
        cart.add_item(customer, "non");
        assert_eq!(cart.items(customer).len(), 2);

        cart.clear(customer).await.unwrap();
        assert!(cart.items(customer).is_empty());
        assert_eq!(cart.cleared(), vec![customer]);
    }
}
