//! Product snapshots and volume selection.
//!
//! A [`ProductSnapshot`] is the frozen copy of a catalog entry taken at the
//! moment it enters a cart line or buy-now slot. Everything downstream
//! (cart totals, order items) works from the snapshot; the catalog is never
//! re-read once an item has been snapshotted, so later catalog edits cannot
//! retroactively change a cart or an order.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{Rupees, discount_percent, range_price};
use super::status::ProductStatus;

/// A frozen copy of a purchasable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub title: String,
    /// Author for manga, brand for figures and katanas.
    pub author: String,
    pub price: Rupees,
    pub original_price: Rupees,
    pub image: String,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    /// Number of volumes available for range selection. Derived snapshots
    /// carry the fixed placeholder `1` - a purchasable unit is one line.
    #[serde(default = "one")]
    pub volumes: u32,
    #[serde(default)]
    pub status: ProductStatus,
}

const fn one() -> u32 {
    1
}

impl ProductSnapshot {
    /// Discount badge percentage against the list price.
    #[must_use]
    pub fn discount_percent(&self) -> i64 {
        discount_percent(self.price, self.original_price)
    }

    /// Whether a discount badge should be shown at all.
    #[must_use]
    pub fn discounted(&self) -> bool {
        self.original_price > self.price && !self.original_price.is_zero()
    }
}

/// Which volumes of a series the shopper picked on the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSelection {
    /// A single volume `n`.
    Single(u32),
    /// Volumes `1..=n` at the flat per-volume price.
    Range(u32),
}

/// Rejected volume selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VolumeError {
    #[error("please enter a valid volume number")]
    Invalid,
    #[error("maximum {max} volumes available")]
    ExceedsAvailable { max: u32 },
}

impl VolumeSelection {
    /// Freeze this selection against a catalog product, producing the derived
    /// snapshot that goes into the cart or buy-now slot.
    ///
    /// The derived snapshot gets a synthetic id (`{id}-vol-{n}` or
    /// `{id}-vols-1-{n}`), a title suffix naming the selection, and for a
    /// range the flat-multiplier price. Its `volumes` field collapses to `1`:
    /// the selection is now a single purchasable unit.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError`] when the selection is zero or exceeds the
    /// product's available volume count.
    pub fn apply(self, product: &ProductSnapshot) -> Result<ProductSnapshot, VolumeError> {
        let max = product.volumes.max(1);
        let n = match self {
            Self::Single(n) | Self::Range(n) => n,
        };
        if n < 1 {
            return Err(VolumeError::Invalid);
        }
        if n > max {
            return Err(VolumeError::ExceedsAvailable { max });
        }

        let mut derived = product.clone();
        derived.volumes = 1;
        match self {
            Self::Single(n) => {
                derived.id = product.id.single_volume(n);
                derived.title = format!("{} - Volume {n}", product.title);
            }
            Self::Range(n) => {
                derived.id = product.id.volume_range(n);
                derived.title = format!("{} - Volumes 1-{n}", product.title);
                derived.price = range_price(product.price, n);
            }
        }
        Ok(derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(volumes: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new("vagabond"),
            title: "Vagabond".to_owned(),
            author: "Takehiko Inoue".to_owned(),
            price: Rupees::new(899),
            original_price: Rupees::new(1099),
            image: "/images/vagabond.jpg".to_owned(),
            genre: vec!["Seinen".to_owned()],
            rating: 4.9,
            volumes,
            status: ProductStatus::Completed,
        }
    }

    #[test]
    fn test_single_volume_keeps_base_price() {
        let derived = VolumeSelection::Single(7).apply(&series(37)).unwrap();
        assert_eq!(derived.id.as_str(), "vagabond-vol-7");
        assert_eq!(derived.title, "Vagabond - Volume 7");
        assert_eq!(derived.price, Rupees::new(899));
        assert_eq!(derived.volumes, 1);
    }

    #[test]
    fn test_range_multiplies_flat() {
        let derived = VolumeSelection::Range(10).apply(&series(37)).unwrap();
        assert_eq!(derived.id.as_str(), "vagabond-vols-1-10");
        assert_eq!(derived.title, "Vagabond - Volumes 1-10");
        assert_eq!(derived.price, Rupees::new(8990));
    }

    #[test]
    fn test_selection_bounds() {
        assert_eq!(
            VolumeSelection::Single(0).apply(&series(37)),
            Err(VolumeError::Invalid)
        );
        assert_eq!(
            VolumeSelection::Range(38).apply(&series(37)),
            Err(VolumeError::ExceedsAvailable { max: 37 })
        );
    }

    #[test]
    fn test_discount_badge() {
        let product = series(37);
        assert!(product.discounted());
        assert_eq!(product.discount_percent(), 18);
    }
}
