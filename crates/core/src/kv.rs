//! Key-value persistence contract.
//!
//! Cart lines, the buy-now slot, and the device id all persist through this
//! trait. The web layer backs it with the session store; tests use
//! [`MemoryStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Failure reading from or writing to the underlying store.
///
/// Load paths treat these as corrupt state and fall back to an empty value;
/// they are never surfaced to the shopper.
#[derive(Debug, Clone, thiserror::Error)]
#[error("key-value store error: {0}")]
pub struct KvError(pub String);

/// A durable string-keyed store.
///
/// Implementations must tolerate missing keys (`Ok(None)`, not an error) and
/// survive application restarts for cart and device-id data.
pub trait KvStore {
    /// Read a value. Missing keys resolve to `None`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, KvError>> + Send;

    /// Write a value, replacing any existing one.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), KvError>> + Send;

    /// Delete a value. Removing a missing key is a no-op.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), KvError>> + Send;
}

/// In-memory [`KvStore`] used by tests and tooling.
///
/// Cloning shares the underlying map, so a clone observes writes made
/// through the original - the same visibility a session store provides.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing any serialization (used to simulate
    /// corrupt persisted state).
    pub fn seed(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.map.lock() {
            map.insert(key.to_owned(), value.to_owned());
        }
    }
}

impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let map = self.map.lock().map_err(|e| KvError(e.to_string()))?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KvError> {
        let mut map = self.map.lock().map_err(|e| KvError(e.to_string()))?;
        map.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        let mut map = self.map.lock().map_err(|e| KvError(e.to_string()))?;
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set("k", "v".to_owned()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        // Removing again is a no-op, not an error.
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v".to_owned()).await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
