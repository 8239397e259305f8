//! Kurohana Core - Cart and checkout engine.
//!
//! This crate owns the storefront's only stateful subsystem: the persistent
//! shopping cart, the ephemeral buy-now slot, and the checkout orchestrator
//! that reconciles the two into a single order submission.
//!
//! # Architecture
//!
//! The core crate contains types, pure logic, and the traits the web layer
//! implements - no HTTP clients, no database access. Persistence goes through
//! the [`kv::KvStore`] trait; order creation and catalog reads go through
//! [`gateway::OrderGateway`] and [`gateway::CatalogReader`].
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, rupee prices, product snapshots, status enums
//! - [`cart`] - Persistent cart with idempotent line merge
//! - [`buy_now`] - Single-item slot bypassing the cart
//! - [`checkout`] - Totals, validation, and the submission state machine
//! - [`device`] - Per-device identity attached to every order
//! - [`order`] - Order snapshots (frozen at submission time)
//! - [`kv`] - Key-value persistence trait and in-memory reference store
//! - [`gateway`] - Order persistence and catalog read contracts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod buy_now;
pub mod cart;
pub mod checkout;
pub mod device;
pub mod gateway;
pub mod kv;
pub mod order;
pub mod types;

pub use buy_now::BuyNowStore;
pub use cart::{Cart, CartLine, CartStore};
pub use checkout::{
    CheckoutError, CheckoutMode, CheckoutPhase, CheckoutSession, CheckoutTotals, CustomerDetails,
    FLAT_SHIPPING_FEE, FREE_SHIPPING_THRESHOLD, OrderDraft, ShippingAddress, ValidationError,
    place_order,
};
pub use device::resolve_device_id;
pub use gateway::{CatalogReader, GatewayError, MemoryGateway, OrderGateway};
pub use kv::{KvError, KvStore, MemoryStore};
pub use order::{NewOrder, Order, OrderItem};
pub use types::*;
