//! Per-device identity.
//!
//! Orders are associated with a browsing device instead of an account. The
//! identity is generated once, persisted durably, and threaded into every
//! order submission from that device - never read ad hoc at call sites.

use uuid::Uuid;

use crate::kv::{KvError, KvStore};
use crate::types::DeviceId;

impl DeviceId {
    /// Generate a fresh device identity.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(format!("device_{}", Uuid::new_v4().simple()))
    }
}

/// Resolve the device identity for this session: reuse the persisted value
/// when present, otherwise generate one and persist it before returning.
///
/// # Errors
///
/// Returns [`KvError`] if the store cannot be read or the fresh identity
/// cannot be persisted.
pub async fn resolve_device_id<S: KvStore>(store: &S, key: &str) -> Result<DeviceId, KvError> {
    if let Some(existing) = store.get(key).await?
        && !existing.is_empty()
    {
        return Ok(DeviceId::new(existing));
    }

    let fresh = DeviceId::generate();
    store.set(key, fresh.as_str().to_owned()).await?;
    Ok(fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[tokio::test]
    async fn test_resolve_is_stable_across_calls() {
        let kv = MemoryStore::new();
        let first = resolve_device_id(&kv, "device_id").await.unwrap();
        let second = resolve_device_id(&kv, "device_id").await.unwrap();
        assert_eq!(first, second);
        assert!(first.as_str().starts_with("device_"));
    }

    #[tokio::test]
    async fn test_distinct_stores_get_distinct_ids() {
        let a = resolve_device_id(&MemoryStore::new(), "device_id")
            .await
            .unwrap();
        let b = resolve_device_id(&MemoryStore::new(), "device_id")
            .await
            .unwrap();
        assert_ne!(a, b);
    }
}
