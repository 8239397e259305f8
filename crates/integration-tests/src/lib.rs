//! Integration tests for Kurohana.
//!
//! These tests drive the cart/checkout engine end to end against the
//! in-memory collaborators (`MemoryStore`, `MemoryGateway`), covering the
//! flows a shopper actually walks: fill a cart, check out, buy now, retry a
//! failed submission.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kurohana-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - End-to-end checkout scenarios for both modes
//! - `cart_persistence` - Cart durability across reloads and corrupt state

/// Shared fixtures for the integration tests.
pub mod fixtures {
    use kurohana_core::{ProductId, ProductSnapshot, ProductStatus, Rupees};

    /// A catalog snapshot with the given id and price.
    #[must_use]
    pub fn product(id: &str, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            title: format!("Title {id}"),
            author: "Author".to_owned(),
            price: Rupees::new(price),
            original_price: Rupees::new(price),
            image: format!("/images/{id}.jpg"),
            genre: vec!["Seinen".to_owned()],
            rating: 4.5,
            volumes: 1,
            status: ProductStatus::Completed,
        }
    }
}
