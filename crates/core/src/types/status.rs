//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order fulfillment lifecycle.
///
/// Orders move forward through the chain pending -> confirmed -> processing
/// -> shipped -> delivered. Cancellation is terminal and reachable from any
/// non-terminal state. Status is only ever mutated by the back-office after
/// submission; this crate just models the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether no further transition is allowed from this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether `next` is a legal successor of this state.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Self::Cancelled) {
            return true;
        }
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::Processing)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
        )
    }
}

/// Payment settlement status, independent of fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

/// Accepted payment methods.
///
/// Wire values match the hosted backend's `payment_method` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery; the only method that carries a shipping fee.
    Cash,
    SadaPay,
    NayaPay,
}

impl PaymentMethod {
    /// All selectable methods, in display order.
    pub const ALL: [Self; 3] = [Self::Cash, Self::SadaPay, Self::NayaPay];

    /// Human-readable name for the view layer.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash on Delivery",
            Self::SadaPay => "SadaPay",
            Self::NayaPay => "NayaPay",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::SadaPay => write!(f, "sadapay"),
            Self::NayaPay => write!(f, "nayapay"),
        }
    }
}

/// Error returned when parsing an unrecognized payment method.
#[derive(Debug, Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(String);

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "sadapay" => Ok(Self::SadaPay),
            "nayapay" => Ok(Self::NayaPay),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}
