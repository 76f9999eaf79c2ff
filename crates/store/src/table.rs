use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::RwLock;

/// A concurrent key-value table.
///
/// All operations acquire and release the lock internally; callers never
/// see the guard or the map, so iteration and read-modify-write cycles
/// cannot escape synchronization. Update closures run under the write
/// lock and must stay free of I/O.
#[derive(Debug, Clone)]
pub struct Table<K, V> {
    entries: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns a clone of the value for the given key, if present.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    /// Returns true if the key is present.
    pub async fn contains(&self, key: &K) -> bool {
        self.entries.read().await.contains_key(key)
    }

    /// Inserts a value, returning the previous value if any.
    pub async fn insert(&self, key: K, value: V) -> Option<V> {
        self.entries.write().await.insert(key, value)
    }

    /// Removes and returns the value for the given key.
    pub async fn remove(&self, key: &K) -> Option<V> {
        self.entries.write().await.remove(key)
    }

    /// Applies a mutation to the value under the write lock.
    ///
    /// Returns `None` if the key is absent, otherwise the closure's
    /// result. The closure's return value is how callers implement
    /// check-again-before-acting: re-validate the record inside the
    /// closure and report whether the mutation applied.
    pub async fn update<R>(&self, key: &K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        self.entries.write().await.get_mut(key).map(f)
    }

    /// Returns the first entry matching the predicate.
    pub async fn find(&self, pred: impl Fn(&K, &V) -> bool) -> Option<(K, V)> {
        self.entries
            .read()
            .await
            .iter()
            .find(|(k, v)| pred(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Returns a snapshot of all values.
    pub async fn values(&self) -> Vec<V> {
        self.entries.read().await.values().cloned().collect()
    }

    /// Returns a snapshot of all keys.
    pub async fn keys(&self) -> Vec<K> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// Returns the number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the table is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Removes every entry and returns them.
    pub async fn drain(&self) -> Vec<(K, V)> {
        self.entries.write().await.drain().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let table: Table<i64, String> = Table::new();

        assert!(table.insert(1, "a".to_string()).await.is_none());
        assert_eq!(table.get(&1).await.as_deref(), Some("a"));
        assert!(table.contains(&1).await);

        let prev = table.insert(1, "b".to_string()).await;
        assert_eq!(prev.as_deref(), Some("a"));

        assert_eq!(table.remove(&1).await.as_deref(), Some("b"));
        assert!(table.get(&1).await.is_none());
    }

    #[tokio::test]
    async fn test_update_returns_closure_result() {
        let table: Table<i64, Vec<u32>> = Table::new();
        table.insert(7, vec![1]).await;

        let applied = table
            .update(&7, |v| {
                v.push(2);
                v.len()
            })
            .await;
        assert_eq!(applied, Some(2));

        // Absent key: closure never runs.
        assert_eq!(table.update(&8, |_| unreachable!()).await, None::<()>);
    }

    #[tokio::test]
    async fn test_update_supports_conditional_mutation() {
        let table: Table<i64, u32> = Table::new();
        table.insert(1, 10).await;

        // Reject the mutation when the record changed underneath us.
        let applied = table
            .update(&1, |v| {
                if *v == 99 {
                    return false;
                }
                *v += 1;
                true
            })
            .await;
        assert_eq!(applied, Some(true));
        assert_eq!(table.get(&1).await, Some(11));
    }

    #[tokio::test]
    async fn test_find_and_snapshots() {
        let table: Table<String, u32> = Table::new();
        table.insert("a".to_string(), 1).await;
        table.insert("b".to_string(), 2).await;

        let found = table.find(|_, v| *v == 2).await;
        assert_eq!(found, Some(("b".to_string(), 2)));
        assert!(table.find(|_, v| *v == 3).await.is_none());

        assert_eq!(table.len().await, 2);
        let mut values = table.values().await;
        values.sort_unstable();
        assert_eq!(values, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_drain_and_clear() {
        let table: Table<i64, u32> = Table::new();
        table.insert(1, 1).await;
        table.insert(2, 2).await;

        let drained = table.drain().await;
        assert_eq!(drained.len(), 2);
        assert!(table.is_empty().await);

        table.insert(3, 3).await;
        table.clear().await;
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let table: Table<i64, u32> = Table::new();
        let clone = table.clone();

        table.insert(5, 50).await;
        assert_eq!(clone.get(&5).await, Some(50));
    }
}
