//! Rupee amounts and derived-price math.
//!
//! The catalog prices everything in whole rupees - there are no minor units
//! anywhere in the system, so amounts are plain integers rather than decimal
//! arithmetic. Display formatting follows the Indian grouping convention
//! (`₹1,23,456`) with zero decimal places.

use core::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// A whole-rupee amount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Rupees(i64);

impl Rupees {
    /// Zero rupees.
    pub const ZERO: Self = Self(0);

    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiply by a line quantity, saturating at the numeric bounds.
    #[must_use]
    #[allow(clippy::cast_lossless)] // i64::from is not const
    pub const fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    /// Difference that bottoms out at zero instead of going negative.
    #[must_use]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        let diff = self.0.saturating_sub(other.0);
        if diff < 0 { Self::ZERO } else { Self(diff) }
    }
}

impl fmt::Display for Rupees {
    /// Formats as `₹` followed by the Indian-grouped amount, no decimals.
    /// Negative amounts clamp to `₹0` - they cannot arise from catalog data
    /// and rendering a negative price would only mislead.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clamped = if self.0 < 0 { 0 } else { self.0 };
        write!(f, "₹{}", group_indian(clamped))
    }
}

impl Add for Rupees {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Rupees {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Rupees {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Rupees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Percentage discount of `current` relative to `original`, rounded to the
/// nearest integer: `round((1 - current/original) * 100)`.
///
/// Returns `0` when `original` is zero (nothing meaningful to compare
/// against), matching how the discount badge is suppressed for products
/// without a list price.
#[must_use]
pub fn discount_percent(current: Rupees, original: Rupees) -> i64 {
    if original.0 == 0 {
        return 0;
    }

    #[allow(clippy::cast_precision_loss)] // catalog prices are far below 2^52
    let ratio = current.0 as f64 / original.0 as f64;
    #[allow(clippy::cast_possible_truncation)] // rounded value fits i64
    let percent = ((1.0 - ratio) * 100.0).round() as i64;
    percent
}

/// Price for a "volumes 1..=count" selection: a flat per-volume multiplier.
///
/// There is deliberately no bundle-discount curve; the per-volume price does
/// not change as the count grows.
#[must_use]
pub const fn range_price(per_volume: Rupees, count: u32) -> Rupees {
    per_volume.times(count)
}

/// Group a non-negative amount Indian-style: the last three digits form one
/// group, everything before groups in twos (`1234567` -> `12,34,567`).
fn group_indian(amount: i64) -> String {
    let digits = amount.to_string();
    let len = digits.len();
    if len <= 3 {
        return digits;
    }

    let boundary = len - 3;
    let mut out = String::with_capacity(len + len / 2);
    for (i, ch) in digits.chars().enumerate() {
        if i == boundary || (i > 0 && i < boundary && (boundary - i) % 2 == 0) {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indian_grouping() {
        assert_eq!(Rupees::new(0).to_string(), "₹0");
        assert_eq!(Rupees::new(999).to_string(), "₹999");
        assert_eq!(Rupees::new(1_234).to_string(), "₹1,234");
        assert_eq!(Rupees::new(12_345).to_string(), "₹12,345");
        assert_eq!(Rupees::new(1_23_456).to_string(), "₹1,23,456");
        assert_eq!(Rupees::new(12_34_567).to_string(), "₹12,34,567");
    }

    #[test]
    fn test_negative_clamps_to_zero_on_display() {
        assert_eq!(Rupees::new(-450).to_string(), "₹0");
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(discount_percent(Rupees::new(750), Rupees::new(1000)), 25);
        assert_eq!(discount_percent(Rupees::new(999), Rupees::new(1299)), 23);
        assert_eq!(discount_percent(Rupees::new(1000), Rupees::new(1000)), 0);
    }

    #[test]
    fn test_discount_percent_zero_original() {
        assert_eq!(discount_percent(Rupees::new(500), Rupees::ZERO), 0);
    }

    #[test]
    fn test_range_price_is_flat_multiplier() {
        assert_eq!(range_price(Rupees::new(399), 1), Rupees::new(399));
        assert_eq!(range_price(Rupees::new(399), 10), Rupees::new(3990));
    }

    #[test]
    fn test_sum_and_times() {
        let total: Rupees = [Rupees::new(1200), Rupees::new(900).times(2)]
            .into_iter()
            .sum();
        assert_eq!(total, Rupees::new(3000));
    }

    #[test]
    fn test_saturating_sub_floor() {
        assert_eq!(
            Rupees::new(500).saturating_sub(Rupees::new(2000)),
            Rupees::ZERO
        );
        assert_eq!(
            Rupees::new(2000).saturating_sub(Rupees::new(500)),
            Rupees::new(1500)
        );
    }
}
