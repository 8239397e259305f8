//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /health                  - Health check
//!
//! # Catalog
//! GET  /shop                    - Product grid (optional ?genre= filter)
//! GET  /products/{id}           - Product detail
//! POST /products/{id}/buy-now   - Write buy-now slot, enter buy-now checkout
//!
//! # Cart (HTMX fragments)
//! GET  /cart                    - Cart page
//! POST /cart/add                - Add to cart (returns count, triggers cart-updated)
//! POST /cart/update             - Update quantity (returns cart_items fragment)
//! POST /cart/remove             - Remove item (returns cart_items fragment)
//! GET  /cart/count              - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                - Checkout page (?mode=buynow for the slot)
//! POST /checkout                - Submit order
//!
//! # Orders
//! GET  /my-orders               - Orders placed from this device
//!
//! # Admin (token-gated)
//! GET  /admin                   - Login gate or orders dashboard
//! POST /admin/login             - Open admin session
//! POST /admin/logout            - Close admin session
//! POST /admin/orders/{id}/status - Update order status
//! ```

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;
pub mod shop;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::show))
        .route("/{id}/buy-now", post(products::buy_now))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::panel))
        .route("/login", post(admin::login))
        .route("/logout", post(admin::logout))
        .route("/orders/{id}/status", post(admin::update_status))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Shop grid
        .route("/shop", get(shop::index))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::submit))
        // Device order history
        .route("/my-orders", get(orders::my_orders))
        // Admin panel
        .nest("/admin", admin_routes())
}
