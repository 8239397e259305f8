//! The persistent shopping cart.
//!
//! [`Cart`] is the pure line list with the merge/quantity rules;
//! [`CartStore`] wraps it with write-through persistence over a [`KvStore`].
//! Every mutation applies to in-memory state first, so a read immediately
//! after a mutation observes the update even if the durable write is still
//! in flight.

use serde::{Deserialize, Serialize};

use crate::kv::{KvError, KvStore};
use crate::types::{ProductSnapshot, Rupees};

/// One (item, quantity) pair in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: ProductSnapshot,
    pub quantity: u32,
}

impl CartLine {
    /// The line's extended price (`price * quantity`).
    #[must_use]
    pub fn line_price(&self) -> Rupees {
        self.item.price.times(self.quantity)
    }
}

/// The authoritative list of cart lines.
///
/// Invariant: at most one line per distinct item id. Adding an id that is
/// already present increments that line's quantity instead of appending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Parse a persisted cart.
    ///
    /// # Errors
    ///
    /// Returns the underlying parse error; load paths treat that as corrupt
    /// state and fall back to an empty cart.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Add `quantity` of an item, merging into an existing line for the same
    /// item id. Adding zero is a no-op.
    pub fn add(&mut self, item: ProductSnapshot, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine { item, quantity });
        }
    }

    /// Remove the line for `item_id` entirely, whatever its quantity.
    /// Unknown ids are a no-op.
    pub fn remove(&mut self, item_id: &str) {
        self.lines.retain(|l| l.item.id.as_str() != item_id);
    }

    /// Overwrite the quantity for `item_id`. Anything below one removes the
    /// line; unknown ids are a no-op (not a create).
    pub fn set_quantity(&mut self, item_id: &str, quantity: i64) {
        if quantity < 1 {
            self.remove(item_id);
            return;
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.item.id.as_str() == item_id)
        {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines, recomputed fresh.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().fold(0, |n, l| n.saturating_add(l.quantity))
    }

    /// Sum of `price * quantity` across all lines, recomputed fresh.
    #[must_use]
    pub fn total_price(&self) -> Rupees {
        self.lines.iter().map(CartLine::line_price).sum()
    }
}

/// A [`Cart`] bound to its persisted representation.
///
/// Mutations persist the whole line list after updating memory; `load` is
/// fail-soft, so a missing or unparseable persisted value yields an empty
/// cart rather than an error.
#[derive(Debug)]
pub struct CartStore<S> {
    store: S,
    key: String,
    cart: Cart,
}

impl<S: KvStore> CartStore<S> {
    /// Load the cart persisted under `key`, falling back to empty on any
    /// missing, unreadable, or corrupt value.
    pub async fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = match store.get(&key).await {
            Ok(Some(raw)) => Cart::from_json(&raw).unwrap_or_default(),
            Ok(None) | Err(_) => Cart::default(),
        };
        Self { store, key, cart }
    }

    /// The in-memory cart state.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add `quantity` of an item and persist.
    ///
    /// # Errors
    ///
    /// Returns [`KvError`] if the durable write fails; the in-memory state
    /// already reflects the addition.
    pub async fn add_item(&mut self, item: ProductSnapshot, quantity: u32) -> Result<(), KvError> {
        self.cart.add(item, quantity);
        self.persist().await
    }

    /// Remove a line entirely and persist.
    ///
    /// # Errors
    ///
    /// Returns [`KvError`] if the durable write fails.
    pub async fn remove_item(&mut self, item_id: &str) -> Result<(), KvError> {
        self.cart.remove(item_id);
        self.persist().await
    }

    /// Overwrite a line's quantity (below one removes it) and persist.
    ///
    /// # Errors
    ///
    /// Returns [`KvError`] if the durable write fails.
    pub async fn set_quantity(&mut self, item_id: &str, quantity: i64) -> Result<(), KvError> {
        self.cart.set_quantity(item_id, quantity);
        self.persist().await
    }

    /// Empty the cart and persist the empty state.
    ///
    /// # Errors
    ///
    /// Returns [`KvError`] if the durable write fails.
    pub async fn clear(&mut self) -> Result<(), KvError> {
        self.cart.clear();
        self.persist().await
    }

    async fn persist(&self) -> Result<(), KvError> {
        let raw = serde_json::to_string(&self.cart).map_err(|e| KvError(e.to_string()))?;
        self.store.set(&self.key, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use crate::types::{ProductId, ProductStatus};

    fn snapshot(id: &str, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            title: id.to_owned(),
            author: "Author".to_owned(),
            price: Rupees::new(price),
            original_price: Rupees::new(price),
            image: format!("/images/{id}.jpg"),
            genre: Vec::new(),
            rating: 4.5,
            volumes: 1,
            status: ProductStatus::Completed,
        }
    }

    #[test]
    fn test_add_merges_same_id() {
        let mut cart = Cart::default();
        cart.add(snapshot("a", 500), 2);
        cart.add(snapshot("a", 500), 3);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn test_remove_is_total() {
        let mut cart = Cart::default();
        cart.add(snapshot("a", 500), 5);
        cart.remove("a");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_floor_removes() {
        for quantity in [0, -3] {
            let mut cart = Cart::default();
            cart.add(snapshot("a", 500), 2);
            cart.set_quantity("a", quantity);
            assert!(cart.is_empty(), "quantity {quantity} should remove");
        }
    }

    #[test]
    fn test_set_quantity_unknown_id_is_noop() {
        let mut cart = Cart::default();
        cart.set_quantity("ghost", 4);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_are_additive() {
        let mut cart = Cart::default();
        cart.add(snapshot("a", 1200), 1);
        cart.add(snapshot("b", 900), 2);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Rupees::new(3000));
    }

    #[test]
    fn test_mutation_order_is_preserved() {
        let mut cart = Cart::default();
        cart.add(snapshot("a", 500), 1);
        cart.add(snapshot("a", 500), 1);
        cart.remove("a");
        assert_eq!(cart.total_items(), 0);
    }

    #[tokio::test]
    async fn test_store_round_trips_through_kv() {
        let kv = MemoryStore::new();
        let mut store = CartStore::load(kv.clone(), "cart").await;
        store.add_item(snapshot("a", 750), 2).await.unwrap();

        let reloaded = CartStore::load(kv, "cart").await;
        assert_eq!(reloaded.cart().total_items(), 2);
        assert_eq!(reloaded.cart().total_price(), Rupees::new(1500));
    }

    #[tokio::test]
    async fn test_corrupt_persisted_value_loads_empty() {
        let kv = MemoryStore::new();
        kv.seed("cart", "{not valid json");
        let store = CartStore::load(kv, "cart").await;
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_clear_persists_empty_state() {
        let kv = MemoryStore::new();
        let mut store = CartStore::load(kv.clone(), "cart").await;
        store.add_item(snapshot("a", 500), 1).await.unwrap();
        store.clear().await.unwrap();

        let reloaded = CartStore::load(kv, "cart").await;
        assert!(reloaded.cart().is_empty());
    }
}
