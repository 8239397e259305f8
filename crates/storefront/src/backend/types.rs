//! Row types for the hosted backend's REST interface.
//!
//! Rows deserialize defensively: optional columns default rather than fail,
//! and an unknown status string falls back to `pending` so one bad row
//! cannot take down an order listing.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use kurohana_core::{
    DeviceId, Order, OrderId, OrderItem, ProductId, ProductSnapshot, ProductStatus, Rupees,
};

/// A catalog row from the `products` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    #[serde(default)]
    pub original_price: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default = "default_volumes")]
    pub volumes: u32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub is_new: bool,
}

const fn default_volumes() -> u32 {
    1
}

impl ProductRow {
    /// Freeze this row into the snapshot the cart engine works with.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(self.id.clone()),
            title: self.title.clone(),
            author: self.author.clone(),
            price: Rupees::new(self.price),
            original_price: Rupees::new(self.original_price),
            image: self.image.clone(),
            genre: self.genre.clone(),
            rating: self.rating,
            volumes: self.volumes,
            status: match self.status.as_deref() {
                Some("ongoing") => ProductStatus::Ongoing,
                _ => ProductStatus::Completed,
            },
        }
    }
}

/// An order row from the `orders` table.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRow {
    pub id: String,
    pub device_id: String,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub customer_address: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_price: i64,
    pub shipping_cost: i64,
    #[serde(default)]
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            device_id: DeviceId::new(row.device_id),
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            customer_address: row.customer_address,
            items: row.items,
            total_price: Rupees::new(row.total_price),
            shipping_cost: Rupees::new(row.shipping_cost),
            status: row
                .status
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurohana_core::OrderStatus;

    #[test]
    fn test_order_row_unknown_status_defaults_to_pending() {
        let row: OrderRow = serde_json::from_value(serde_json::json!({
            "id": "o1",
            "device_id": "device_a",
            "customer_name": "Asha",
            "customer_email": "asha@example.com",
            "customer_address": "12 MG Road, Bengaluru, Karnataka, 560001",
            "items": [],
            "total_price": 650,
            "shipping_cost": 150,
            "status": "weird",
            "created_at": "2025-11-02T10:00:00Z"
        }))
        .expect("row should parse");

        let order = Order::from(row);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_product_row_snapshot() {
        let row: ProductRow = serde_json::from_value(serde_json::json!({
            "id": "vagabond",
            "title": "Vagabond",
            "author": "Takehiko Inoue",
            "price": 899,
            "original_price": 1099,
            "image": "/images/vagabond.jpg",
            "genre": ["Seinen"],
            "rating": 4.9,
            "volumes": 37,
            "status": "ongoing"
        }))
        .expect("row should parse");

        let snapshot = row.snapshot();
        assert_eq!(snapshot.id.as_str(), "vagabond");
        assert_eq!(snapshot.price, Rupees::new(899));
        assert_eq!(snapshot.status, ProductStatus::Ongoing);
        assert_eq!(snapshot.volumes, 37);
    }
}
