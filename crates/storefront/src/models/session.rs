//! Session-backed persistence for the cart engine.
//!
//! The core engine persists through its `KvStore` trait; here that trait is
//! implemented over `tower-sessions`, giving cart, buy-now slot, and device
//! id a per-device durable home in the Postgres-backed session. The buy-now
//! slot shares the store but is explicitly cleared after a successful
//! submission, so it never outlives the checkout attempt it belongs to.

use tower_sessions::Session;

use kurohana_core::{KvError, KvStore};

/// Session keys for cart and checkout state.
pub mod session_keys {
    /// Key for the persisted cart line list.
    pub const CART: &str = "cart";

    /// Key for the buy-now slot.
    pub const BUY_NOW: &str = "buy_now_item";

    /// Key for the durable device identity.
    pub const DEVICE_ID: &str = "device_id";

    /// Key for the admin panel session flag.
    pub const ADMIN: &str = "admin_authed";
}

/// [`KvStore`] over the request's session.
///
/// Cheap to construct per request; the session itself is shared state.
#[derive(Debug, Clone)]
pub struct SessionKv {
    session: Session,
}

impl SessionKv {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl KvStore for SessionKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.session
            .get::<String>(key)
            .await
            .map_err(|e| KvError(e.to_string()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KvError> {
        self.session
            .insert(key, value)
            .await
            .map_err(|e| KvError(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        self.session
            .remove::<String>(key)
            .await
            .map(|_| ())
            .map_err(|e| KvError(e.to_string()))
    }
}
