//! Cart durability across reloads and bad persisted state.

use kurohana_core::{BuyNowStore, CartStore, MemoryStore, Rupees};
use kurohana_integration_tests::fixtures::product;

const CART_KEY: &str = "cart";
const BUY_NOW_KEY: &str = "buy_now_item";

#[tokio::test]
async fn cart_survives_a_reload() {
    let kv = MemoryStore::new();

    let mut store = CartStore::load(kv.clone(), CART_KEY).await;
    store.add_item(product("a", 750), 1).await.expect("add");
    store.add_item(product("a", 750), 2).await.expect("add");
    store.add_item(product("b", 300), 1).await.expect("add");

    // A fresh load (new request, new tab) sees the merged state.
    let reloaded = CartStore::load(kv, CART_KEY).await;
    assert_eq!(reloaded.cart().lines().len(), 2);
    assert_eq!(reloaded.cart().total_items(), 4);
    assert_eq!(reloaded.cart().total_price(), Rupees::new(2550));
}

#[tokio::test]
async fn corrupt_cart_state_resets_to_empty() {
    let kv = MemoryStore::new();
    kv.seed(CART_KEY, "][ not json at all");

    let store = CartStore::load(kv.clone(), CART_KEY).await;
    assert!(store.cart().is_empty());

    // And the store is usable again immediately.
    let mut store = store;
    store.add_item(product("a", 500), 1).await.expect("add");
    let reloaded = CartStore::load(kv, CART_KEY).await;
    assert_eq!(reloaded.cart().total_items(), 1);
}

#[tokio::test]
async fn buy_now_slot_is_invisible_to_the_cart() {
    let kv = MemoryStore::new();

    let mut slot = BuyNowStore::load(kv.clone(), BUY_NOW_KEY).await;
    slot.set(product("d", 2000), 1).await.expect("set");

    let cart = CartStore::load(kv.clone(), CART_KEY).await;
    assert!(cart.cart().is_empty());
    assert_eq!(cart.cart().total_price(), Rupees::ZERO);

    // And cart writes never disturb the slot.
    let mut cart = cart;
    cart.add_item(product("a", 400), 2).await.expect("add");
    let slot = BuyNowStore::load(kv, BUY_NOW_KEY).await;
    assert_eq!(slot.peek().expect("slot intact").item.id.as_str(), "d");
}

#[tokio::test]
async fn clearing_one_store_leaves_the_other() {
    let kv = MemoryStore::new();

    let mut cart = CartStore::load(kv.clone(), CART_KEY).await;
    cart.add_item(product("a", 400), 1).await.expect("add");
    let mut slot = BuyNowStore::load(kv.clone(), BUY_NOW_KEY).await;
    slot.set(product("d", 2000), 1).await.expect("set");

    slot.clear().await.expect("clear slot");

    let cart = CartStore::load(kv, CART_KEY).await;
    assert_eq!(cart.cart().total_items(), 1);
}
