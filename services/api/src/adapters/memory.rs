//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `KeyValueStore` port.
//!
//! Used when no database is configured, and by the test suite. Like browser
//! storage it enforces a byte quota over the stored keys and values.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use vocab_reader_core::ports::{KeyValueStore, PortError, PortResult};

pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl InMemoryStore {
    /// A store without a capacity limit.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: None,
        }
    }

    /// A store that rejects writes once keys plus values would exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub async fn used_bytes(&self) -> usize {
        let entries = self.entries.read().await;
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut entries = self.entries.write().await;
        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(PortError::StorageFull(format!(
                    "writing '{}' needs {} bytes, quota is {}",
                    key, needed, quota
                )));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn quota_rejects_write_and_keeps_previous_value() {
        let store = InMemoryStore::with_quota(10);
        store.set("a", "12345").await.unwrap();
        let err = store.set("a", "1234567890").await.unwrap_err();
        assert!(matches!(err, PortError::StorageFull(_)));
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("12345"));
        assert_eq!(store.used_bytes().await, 6);
    }

    #[tokio::test]
    async fn replacing_a_value_does_not_count_it_twice() {
        let store = InMemoryStore::with_quota(8);
        store.set("a", "1234567").await.unwrap();
        store.set("a", "7654321").await.unwrap();
    }
}
