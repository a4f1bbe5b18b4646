//! Cart and wishlist item types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use solestride_core::{ProductId, UnitPricing};

/// Sentinel size for products without a size dimension.
pub const DEFAULT_SIZE: &str = "One Size";

/// Sentinel color for products without a color variant.
pub const DEFAULT_COLOR: &str = "Standard";

/// Default category when the catalog omits one.
pub const DEFAULT_CATEGORY: &str = "Shoes";

/// A product as handed over from a catalog view, before any cart defaults
/// are applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ProductId,
    pub title: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    /// Representative image; falls back to the first of `images`.
    pub image: Option<String>,
    pub images: Vec<String>,
    #[serde(flatten)]
    pub pricing: UnitPricing,
    pub discount_percent: Option<Decimal>,
    pub has_discount: bool,
}

impl CatalogItem {
    /// The single representative image reference carried into cart lines.
    #[must_use]
    pub fn representative_image(&self) -> Option<String> {
        self.image
            .clone()
            .or_else(|| self.images.first().cloned())
    }
}

/// One product+size combination with a quantity in the active cart.
///
/// Identity is the `(product_id, size)` pair: a second add for the same
/// pair increments `quantity` instead of appending a line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub title: String,
    pub brand: Option<String>,
    pub category: String,
    pub size: String,
    pub color: String,
    pub image: Option<String>,
    #[serde(flatten)]
    pub pricing: UnitPricing,
    pub discount_percent: Option<Decimal>,
    pub has_discount: bool,
    pub quantity: u32,
}

impl CartLine {
    /// Build a fresh line (quantity 1) from a catalog item, applying the
    /// variant sentinels and resolving the stored price fields.
    #[must_use]
    pub fn from_item(item: &CatalogItem) -> Self {
        let effective = item.pricing.effective();
        Self {
            product_id: item.id.clone(),
            title: item.title.clone(),
            brand: item.brand.clone(),
            category: item
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            size: item.size.clone().unwrap_or_else(|| DEFAULT_SIZE.to_string()),
            color: item
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            image: item.representative_image(),
            pricing: UnitPricing {
                price: Some(effective),
                original_price: Some(
                    item.pricing
                        .original_price
                        .or(item.pricing.price)
                        .unwrap_or(effective),
                ),
                discounted_price: item.pricing.discounted_price,
            },
            discount_percent: item.discount_percent,
            has_discount: item.has_discount,
            quantity: 1,
        }
    }

    /// The effective unit price (discount fallback applied).
    #[must_use]
    pub fn effective_unit_price(&self) -> Decimal {
        self.pricing.effective()
    }

    /// Effective unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.effective_unit_price() * Decimal::from(self.quantity)
    }
}

/// A saved-for-later product reference. No quantity; unique by product id
/// alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub product_id: ProductId,
    pub title: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image: Option<String>,
    #[serde(flatten)]
    pub pricing: UnitPricing,
    pub discount_percent: Option<Decimal>,
    pub has_discount: bool,
}

impl WishlistEntry {
    /// Build an entry from a catalog item. Variant fields are kept as-is;
    /// wishlist entries have no size dimension to default.
    #[must_use]
    pub fn from_item(item: &CatalogItem) -> Self {
        Self {
            product_id: item.id.clone(),
            title: item.title.clone(),
            brand: item.brand.clone(),
            category: item.category.clone(),
            size: item.size.clone(),
            color: item.color.clone(),
            image: item.representative_image(),
            pricing: item.pricing,
            discount_percent: item.discount_percent,
            has_discount: item.has_discount,
        }
    }
}
