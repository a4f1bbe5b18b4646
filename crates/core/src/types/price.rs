//! Unit pricing with the discount fallback rule.
//!
//! Catalog items carry up to three prices: a discounted price, a plain
//! price, and a pre-discount original price. Any of them may be absent.
//! Every place a unit price is read - line totals, cart totals, order
//! snapshots - resolves through [`UnitPricing::effective`] so the same
//! fallback applies uniformly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The price fields a catalog item may carry.
///
/// Amounts are in the store currency's standard unit (PKR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitPricing {
    /// Plain list price.
    pub price: Option<Decimal>,
    /// Pre-discount reference price.
    pub original_price: Option<Decimal>,
    /// Discounted price; wins over both others when present.
    pub discounted_price: Option<Decimal>,
}

impl UnitPricing {
    /// The effective unit price: discounted, else plain, else original,
    /// else zero.
    #[must_use]
    pub fn effective(&self) -> Decimal {
        self.discounted_price
            .or(self.price)
            .or(self.original_price)
            .unwrap_or(Decimal::ZERO)
    }

    /// The pre-discount reference price shown struck through next to a
    /// discounted line: original, else plain, else zero.
    #[must_use]
    pub fn reference(&self) -> Decimal {
        self.original_price.or(self.price).unwrap_or(Decimal::ZERO)
    }
}
