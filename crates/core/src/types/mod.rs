//! Core types for Kurohana.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use id::*;
pub use price::{Rupees, discount_percent, range_price};
pub use product::{ProductSnapshot, VolumeError, VolumeSelection};
pub use status::{OrderStatus, ProductStatus};
