//! Shared type definitions.

mod id;
mod price;
mod status;

pub use id::ProductId;
pub use price::UnitPricing;
pub use status::{OrderStatus, PaymentMethod, PaymentStatus, UnknownPaymentMethod};
