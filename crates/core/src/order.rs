//! Order snapshots.
//!
//! An order's items and totals are copied from the active item source at
//! submission time and never recomputed afterwards - later cart mutations or
//! catalog price edits cannot change an order that has already been placed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::types::{DeviceId, OrderId, OrderStatus, ProductId, Rupees};

/// One purchased line, frozen at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub title: String,
    pub author: String,
    pub price: Rupees,
    pub quantity: u32,
    pub image: String,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.item.id.clone(),
            title: line.item.title.clone(),
            author: line.item.author.clone(),
            price: line.item.price,
            quantity: line.quantity,
            image: line.item.image.clone(),
        }
    }
}

/// The payload sent to the order gateway's create operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub device_id: DeviceId,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    /// The full shipping address joined into one display string.
    pub customer_address: String,
    pub items: Vec<OrderItem>,
    /// Subtotal plus shipping, computed once at submission time.
    pub total_price: Rupees,
    pub shipping_cost: Rupees,
}

/// A persisted order as returned by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub device_id: DeviceId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub customer_address: String,
    pub items: Vec<OrderItem>,
    pub total_price: Rupees,
    pub shipping_cost: Rupees,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Total number of units across all items.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().fold(0, |n, i| n.saturating_add(i.quantity))
    }
}
