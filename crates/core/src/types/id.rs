//! Newtype IDs for type-safe entity references.

use serde::{Deserialize, Serialize};

/// Opaque product identifier as issued by the catalog backend.
///
/// Backed by a string so numeric and UUID-style ids round-trip unchanged.
/// A product id on its own does not identify a cart line - cart identity is
/// the `(product id, size)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_serde_transparent() {
        let id = ProductId::new("nike-af1-07");
        let json = serde_json::to_string(&id).expect("serializes");
        assert_eq!(json, "\"nike-af1-07\"");

        let back: ProductId = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, id);
    }

    #[test]
    fn test_product_id_display() {
        assert_eq!(ProductId::from("42").to_string(), "42");
    }
}
