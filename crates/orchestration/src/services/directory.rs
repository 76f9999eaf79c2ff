//! Admin directory boundary.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use common::CustomerId;

/// Trait for admin membership checks.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Returns true if the given user may drive fulfillment actions.
    async fn is_admin(&self, customer: CustomerId) -> bool;
}

/// Directory backed by a fixed set of admin ids.
#[derive(Debug, Clone, Default)]
pub struct StaticAdminDirectory {
    admins: Arc<HashSet<CustomerId>>,
}

impl StaticAdminDirectory {
    /// Creates a directory from the given admin ids.
    pub fn new(admins: impl IntoIterator<Item = CustomerId>) -> Self {
        Self {
            admins: Arc::new(admins.into_iter().collect()),
        }
    }
}

#[async_trait]
impl AdminDirectory for StaticAdminDirectory {
    async fn is_admin(&self, customer: CustomerId) -> bool {
        self.admins.contains(&customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_membership() {
        let directory = StaticAdminDirectory::new([CustomerId::new(1), CustomerId::new(2)]);
        assert!(directory.is_admin(CustomerId::new(1)).await);
        assert!(!directory.is_admin(CustomerId::new(3)).await);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let directory = StaticAdminDirectory::default();
        assert!(!directory.is_admin(CustomerId::new(1)).await);
    }
}
