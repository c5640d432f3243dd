//! Newtype IDs for type-safe entity references.
//!
//! Backend identifiers are opaque strings assigned by the hosted database.
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use rojarhat_core::define_id;
/// define_id!(WarehouseId);
/// define_id!(ShipmentId);
///
/// let warehouse = WarehouseId::new("w-1");
/// let shipment = ShipmentId::new("w-1");
///
/// // These are different types, so this won't compile:
/// // let _: WarehouseId = shipment;
/// assert_eq!(warehouse.as_str(), shipment.as_str());
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
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.pad(&self.0)
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
define_id!(CustomerId);
define_id!(CategoryId);

impl ProductId {
    /// Length of a hyphenated UUID, the shape the products table requires.
    pub const UUID_LENGTH: usize = 36;

    /// Whether this ID has the shape the backend's products table expects.
    ///
    /// The check is purely syntactic: a 36-character hyphenated UUID. It says
    /// nothing about whether the product still exists.
    ///
    /// ```
    /// use rojarhat_core::ProductId;
    ///
    /// assert!(ProductId::new("3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b").is_well_formed());
    /// assert!(!ProductId::new("not-a-uuid").is_well_formed());
    /// assert!(!ProductId::new("3f2b8c1e9a4d4e6b8f1a2c3d4e5f6a7b").is_well_formed());
    /// ```
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == Self::UUID_LENGTH && uuid::Uuid::try_parse(&self.0).is_ok()
    }

    /// The lowercase form the backend stores and compares.
    ///
    /// UUIDs are case-insensitive, so IDs that differ only in case name the
    /// same product.
    ///
    /// ```
    /// use rojarhat_core::ProductId;
    ///
    /// let id = ProductId::new("3F2B8C1E-9A4D-4E6B-8F1A-2C3D4E5F6A7B");
    /// assert_eq!(id.canonical().as_str(), "3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b");
    /// ```
    #[must_use]
    pub fn canonical(&self) -> Self {
        Self(self.0.to_ascii_lowercase())
    }

    /// A short fragment of the ID for display when no product name is known.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0
            .char_indices()
            .nth(8)
            .map_or(self.0.as_str(), |(idx, _)| &self.0[..idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_accepts_hyphenated_uuid() {
        let id = ProductId::new(uuid::Uuid::new_v4().to_string());
        assert!(id.is_well_formed());
    }

    #[test]
    fn test_well_formed_rejects_other_shapes() {
        assert!(!ProductId::new("").is_well_formed());
        assert!(!ProductId::new("not-a-uuid").is_well_formed());
        assert!(!ProductId::new("42").is_well_formed());
        // Braced and URN forms parse as UUIDs but are not 36 characters
        assert!(!ProductId::new("{3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b}").is_well_formed());
        assert!(
            !ProductId::new("urn:uuid:3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b").is_well_formed()
        );
        // Right length, wrong alphabet
        assert!(!ProductId::new("zzzzzzzz-9a4d-4e6b-8f1a-2c3d4e5f6a7b").is_well_formed());
    }

    #[test]
    fn test_canonical_only_changes_case() {
        let upper = ProductId::new("3F2B8C1E-9A4D-4E6B-8F1A-2C3D4E5F6A7B");
        let lower = ProductId::new("3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b");

        assert!(upper.is_well_formed());
        assert_eq!(upper.canonical(), lower);
        assert_eq!(lower.canonical(), lower);
    }

    #[test]
    fn test_short_truncates_to_eight_chars() {
        let id = ProductId::new("3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b");
        assert_eq!(id.short(), "3f2b8c1e");

        let id = ProductId::new("abc");
        assert_eq!(id.short(), "abc");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = OrderId::new("ord-1");
        assert_eq!(serde_json::to_string(&id).unwrap_or_default(), "\"ord-1\"");
        assert_eq!(id.to_string(), "ord-1");
    }
}
