//! Collaborator contracts for the hosted backend.
//!
//! The storefront implements these against its REST client; tests use
//! [`MemoryGateway`]. The checkout orchestrator only ever sees the traits.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::order::{NewOrder, Order};
use crate::types::{DeviceId, OrderId, OrderStatus, ProductId, ProductSnapshot};

/// Failure talking to the persistence backend.
///
/// This is the only error class surfaced to the shopper, always as a
/// retryable condition - the submitting state is preserved so the same
/// order can be resubmitted unchanged.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The backend could not be reached (network failure, timeout).
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the request (validation rejection, bad schema).
    #[error("backend rejected the request: {0}")]
    Rejected(String),

    /// A response arrived but could not be interpreted.
    #[error("unexpected backend response: {0}")]
    InvalidResponse(String),

    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),
}

/// Order persistence operations.
///
/// `create_order` is the checkout path; the list and status operations back
/// the my-orders page and the admin panel.
pub trait OrderGateway {
    /// Persist a new order. The backend assigns the id, a `pending` status,
    /// and the creation timestamp.
    fn create_order(
        &self,
        order: NewOrder,
    ) -> impl Future<Output = Result<Order, GatewayError>> + Send;

    /// Orders placed from one device, newest first.
    fn orders_for_device(
        &self,
        device: &DeviceId,
    ) -> impl Future<Output = Result<Vec<Order>, GatewayError>> + Send;

    /// Every order, newest first (admin only).
    fn all_orders(&self) -> impl Future<Output = Result<Vec<Order>, GatewayError>> + Send;

    /// Update an order's status; the only permitted post-creation mutation.
    fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<Order, GatewayError>> + Send;
}

/// Catalog read operations.
///
/// Used only to populate a snapshot when an item enters the cart or buy-now
/// slot; nothing re-reads the catalog after that point.
pub trait CatalogReader {
    /// Look up one product by id.
    fn product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Option<ProductSnapshot>, GatewayError>> + Send;

    /// The full product list, in catalog order.
    fn products(&self) -> impl Future<Output = Result<Vec<ProductSnapshot>, GatewayError>> + Send;
}

/// In-memory [`OrderGateway`] used by tests and tooling.
///
/// Assigns UUID order ids, stamps `created_at`, and defaults status to
/// pending, mirroring the hosted backend's insert behavior. A failure can be
/// injected for the next create call to exercise retry paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    orders: Arc<Mutex<Vec<Order>>>,
    fail_next: Arc<Mutex<Option<GatewayError>>>,
}

impl MemoryGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_order` call fail with `error`.
    pub fn inject_failure(&self, error: GatewayError) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(error);
        }
    }

    /// Snapshot of every stored order, in insertion order.
    #[must_use]
    pub fn stored(&self) -> Vec<Order> {
        self.orders.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl OrderGateway for MemoryGateway {
    async fn create_order(&self, order: NewOrder) -> Result<Order, GatewayError> {
        if let Ok(mut slot) = self.fail_next.lock()
            && let Some(error) = slot.take()
        {
            return Err(error);
        }

        let stored = Order {
            id: OrderId::new(Uuid::new_v4().to_string()),
            device_id: order.device_id,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            customer_phone: order.customer_phone,
            customer_address: order.customer_address,
            items: order.items,
            total_price: order.total_price,
            shipping_cost: order.shipping_cost,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        self.orders
            .lock()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?
            .push(stored.clone());
        Ok(stored)
    }

    async fn orders_for_device(&self, device: &DeviceId) -> Result<Vec<Order>, GatewayError> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?
            .iter()
            .filter(|o| &o.device_id == device)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn all_orders(&self) -> Result<Vec<Order>, GatewayError> {
        let mut orders = self
            .orders
            .lock()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?
            .clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order, GatewayError> {
        let mut orders = self
            .orders
            .lock()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        let order = orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| GatewayError::OrderNotFound(id.clone()))?;
        order.status = status;
        Ok(order.clone())
    }
}
