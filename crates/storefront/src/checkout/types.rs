//! Checkout form, order, and payment types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use solestride_core::{OrderStatus, PaymentMethod, PaymentStatus, ProductId};

use crate::cart::CartLine;

/// Maximum accepted payment-proof file size (5 MB).
pub const MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

/// Default shipping country for the delivery form.
pub const DEFAULT_COUNTRY: &str = "Pakistan";

/// User-entered delivery details, edited field by field until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub payment_method: Option<PaymentMethod>,
    pub special_instructions: String,
}

impl Default for DeliveryForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            payment_method: None,
            special_instructions: String::new(),
        }
    }
}

/// A payment-proof file as picked by the user, held in memory until upload.
#[derive(Clone)]
pub struct PaymentProof {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PaymentProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentProof")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl PaymentProof {
    /// File extension from the original name, `bin` when there is none.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map_or("bin", |(_, ext)| ext)
    }
}

/// A proof file rejected before it is ever attached.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProofError {
    #[error("File size too large. Maximum size is 5MB.")]
    TooLarge,

    #[error("Please upload an image file (JPEG, PNG, etc.)")]
    NotAnImage,
}

/// Delivery-form fields that validation can flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FullName,
    Email,
    Phone,
    Address,
    City,
    PaymentMethod,
    PaymentProof,
}

/// Field-level validation messages for one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(FormField, &'static str)>,
}

impl ValidationErrors {
    pub(crate) fn push(&mut self, field: FormField, message: &'static str) {
        self.entries.push((field, message));
    }

    /// True when the pass found no problems.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The message attached to `field`, if it was flagged.
    #[must_use]
    pub fn message_for(&self, field: FormField) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, msg)| *msg)
    }

    /// All flagged fields with their messages, in check order.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &'static str)> + '_ {
        self.entries.iter().copied()
    }
}

/// Where the checkout flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    /// The form is being edited (also the state after any failure).
    #[default]
    Editing,
    /// A validation pass is running.
    Validating,
    /// Upload and insert are in flight.
    Submitting,
    /// Submission succeeded; cart and form have been reset.
    Cleared,
}

/// A frozen copy of one cart line as embedded in a submitted order.
///
/// Field names follow the order table's `items` column format, which the
/// back office reads, so they are part of the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineSnapshot {
    pub id: ProductId,
    pub title: String,
    pub brand: String,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    pub price: Decimal,
    pub original_price: Decimal,
    pub discounted_price: Option<Decimal>,
    pub image: String,
    pub category: String,
    pub has_discount: bool,
    pub discount_percent: Option<Decimal>,
}

impl OrderLineSnapshot {
    /// Freeze a live cart line. The snapshot owns its data; later cart
    /// mutations cannot reach it.
    #[must_use]
    pub fn from_line(line: &CartLine) -> Self {
        Self {
            id: line.product_id.clone(),
            title: line.title.clone(),
            brand: line.brand.clone().unwrap_or_else(|| "Unknown".to_string()),
            size: line.size.clone(),
            color: line.color.clone(),
            quantity: line.quantity,
            price: line.effective_unit_price(),
            original_price: line.pricing.reference(),
            discounted_price: line.pricing.discounted_price,
            image: line.image.clone().unwrap_or_default(),
            category: line.category.clone(),
            has_discount: line.has_discount,
            discount_percent: line.discount_percent,
        }
    }
}

/// Delivery details as flattened into the order row's columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(rename = "customer_name")]
    pub name: String,
    #[serde(rename = "customer_email")]
    pub email: String,
    #[serde(rename = "customer_phone")]
    pub phone: String,
    #[serde(rename = "customer_address")]
    pub address: String,
    #[serde(rename = "customer_city")]
    pub city: String,
    #[serde(rename = "customer_postal_code")]
    pub postal_code: Option<String>,
    #[serde(rename = "customer_country")]
    pub country: String,
}

/// One composed order, assembled exactly once at submission.
///
/// Write-once: after the insert only `status` and `payment_status` change,
/// and only through the back office.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_number: String,
    #[serde(flatten)]
    pub customer: CustomerDetails,
    pub payment_method: PaymentMethod,
    pub payment_proof_url: Option<String>,
    pub special_instructions: Option<String>,
    pub items: Vec<OrderLineSnapshot>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub tax: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// What the caller gets back after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_number: String,
    pub total_amount: Decimal,
}

/// Manual-transfer instructions shown once a payment method is picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInstructions {
    pub name: &'static str,
    pub details: &'static [&'static str],
    pub upload_text: &'static str,
}

/// The transfer instructions for a payment method.
#[must_use]
pub fn payment_instructions(method: PaymentMethod) -> PaymentInstructions {
    match method {
        PaymentMethod::SadaPay => PaymentInstructions {
            name: "SadaPay",
            details: &[
                "IBAN: PK36SADA0000001234567890",
                "Account Number: 1234567890",
                "Account Title: Your Store Name",
                "Bank: SadaPay",
                "Please upload screenshot of full payment confirmation",
            ],
            upload_text: "Upload full payment screenshot",
        },
        PaymentMethod::NayaPay => PaymentInstructions {
            name: "NayaPay",
            details: &[
                "IBAN: PK01NAYA0000009876543210",
                "Account Number: 9876543210",
                "Account Title: Your Store Name",
                "Bank: NayaPay",
                "Please upload screenshot of full payment confirmation",
            ],
            upload_text: "Upload full payment screenshot",
        },
        PaymentMethod::Cash => PaymentInstructions {
            name: "Cash on Delivery",
            details: &[
                "Rs. 299 advance payment required",
                "Remaining amount payable at delivery",
                "Please upload screenshot of Rs. 299 advance payment",
            ],
            upload_text: "Upload Rs. 299 advance payment screenshot",
        },
    }
}
