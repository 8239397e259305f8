//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. IDs are backed by
//! strings because the backend assigns text keys, and purchasable units use
//! derived ids (`{product}-vol-{n}`, `{product}-vols-1-{n}`) that only exist
//! client-side.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use kurohana_core::define_id;
/// define_id!(ProductId);
/// define_id!(OrderId);
///
/// let product_id = ProductId::new("vagabond");
/// let order_id = OrderId::new("3b2e...");
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(OrderId);
define_id!(DeviceId);

impl ProductId {
    /// Derived id for a single-volume selection of this product.
    #[must_use]
    pub fn single_volume(&self, volume: u32) -> Self {
        Self(format!("{}-vol-{volume}", self.0))
    }

    /// Derived id for a volumes `1..=count` selection of this product.
    #[must_use]
    pub fn volume_range(&self, count: u32) -> Self {
        Self(format!("{}-vols-1-{count}", self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_volume_ids() {
        let id = ProductId::new("berserk");
        assert_eq!(id.single_volume(7).as_str(), "berserk-vol-7");
        assert_eq!(id.volume_range(12).as_str(), "berserk-vols-1-12");
    }

    #[test]
    fn test_display_and_conversions() {
        let id = OrderId::new("abc-123");
        assert_eq!(id.to_string(), "abc-123");
        assert_eq!(String::from(id), "abc-123");
    }
}
