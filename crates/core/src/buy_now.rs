//! The buy-now slot.
//!
//! A single `{item, quantity}` record held under its own key, written when a
//! shopper buys directly from a product page. It never merges with or leaks
//! into the cart; the checkout orchestrator reads it in buy-now mode and
//! clears it after a successful submission.

use crate::cart::CartLine;
use crate::kv::{KvError, KvStore};
use crate::types::ProductSnapshot;

/// The ephemeral single-item override used by the buy-now flow.
#[derive(Debug)]
pub struct BuyNowStore<S> {
    store: S,
    key: String,
    slot: Option<CartLine>,
}

impl<S: KvStore> BuyNowStore<S> {
    /// Load the slot persisted under `key`; missing or corrupt values load
    /// as an empty slot.
    pub async fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let slot = match store.get(&key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) | Err(_) => None,
        };
        Self { store, key, slot }
    }

    /// Read the slot without side effects.
    #[must_use]
    pub fn peek(&self) -> Option<&CartLine> {
        self.slot.as_ref()
    }

    /// Overwrite the slot unconditionally - a second buy-now replaces the
    /// first, it never accumulates.
    ///
    /// # Errors
    ///
    /// Returns [`KvError`] if the write fails.
    pub async fn set(&mut self, item: ProductSnapshot, quantity: u32) -> Result<(), KvError> {
        let line = CartLine {
            item,
            quantity: quantity.max(1),
        };
        let raw = serde_json::to_string(&line).map_err(|e| KvError(e.to_string()))?;
        self.store.set(&self.key, raw).await?;
        self.slot = Some(line);
        Ok(())
    }

    /// Remove the slot's persisted value.
    ///
    /// # Errors
    ///
    /// Returns [`KvError`] if the removal fails; the in-memory slot is
    /// already cleared.
    pub async fn clear(&mut self) -> Result<(), KvError> {
        self.slot = None;
        self.store.remove(&self.key).await
    }
}
