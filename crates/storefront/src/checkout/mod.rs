//! Checkout: form validation, proof upload, order composition and submission.
//!
//! The composer walks a small state machine over the delivery form:
//! `Editing -> Validating -> Submitting -> Cleared`, dropping back to
//! `Editing` on any failure. A submission either persists exactly one order
//! row or nothing at all - validation and snapshotting have no durable side
//! effects, and an insert failure leaves the cart and form intact for a
//! retry. The one asymmetry is a proof file uploaded before a failed
//! insert: it stays in storage unreferenced, and no compensating delete is
//! attempted.

mod types;

pub use types::{
    CheckoutPhase, CustomerDetails, DEFAULT_COUNTRY, DeliveryForm, FormField, MAX_PROOF_BYTES,
    Order, OrderConfirmation, OrderLineSnapshot, PaymentInstructions, PaymentProof, ProofError,
    ValidationErrors, payment_instructions,
};

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use solestride_core::{OrderStatus, PaymentMethod, PaymentStatus};

use crate::backend::{BackendError, ObjectStorage, OrderApi};
use crate::cart::CartService;
use crate::config::StorefrontConfig;
use crate::notify::{CONFIRMATION_TTL, Severity};
use crate::store::LocalStore;

/// Storage bucket holding payment-proof uploads.
const PROOF_BUCKET: &str = "payment-proofs";

/// Characters used for the random order-number suffix.
const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A submission attempt that did not produce an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Submitting with nothing in the cart.
    #[error("Your cart is empty. Please add items to proceed.")]
    EmptyCart,

    /// One or more form fields failed validation.
    #[error("delivery form has invalid fields")]
    Validation(ValidationErrors),

    /// The proof upload failed; no order insert was attempted.
    #[error("Failed to upload payment proof: {0}")]
    Upload(#[source] BackendError),

    /// The order insert failed; the uploaded proof (if any) is orphaned.
    #[error("Failed to create order: {0}")]
    Submission(#[source] BackendError),
}

/// Shipping fee schedule. Cash on delivery carries a flat advance fee;
/// wallet transfers ship free.
#[derive(Debug, Clone)]
pub struct ShippingPolicy {
    cod_fee: Decimal,
}

impl ShippingPolicy {
    /// Policy with a given cash-on-delivery fee.
    #[must_use]
    pub const fn new(cod_fee: Decimal) -> Self {
        Self { cod_fee }
    }

    /// Policy using the configured cash-on-delivery fee.
    #[must_use]
    pub const fn from_config(config: &StorefrontConfig) -> Self {
        Self::new(config.cod_shipping_fee)
    }

    /// The fee for an order paid with `method`. Zero for an empty cart.
    #[must_use]
    pub fn fee_for(&self, method: PaymentMethod, line_count: usize) -> Decimal {
        if line_count > 0 && method == PaymentMethod::Cash {
            self.cod_fee
        } else {
            Decimal::ZERO
        }
    }
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self::new(Decimal::from(299))
    }
}

/// Drives the delivery form from first edit to a submitted order.
#[derive(Debug, Default)]
pub struct CheckoutComposer {
    form: DeliveryForm,
    proof: Option<PaymentProof>,
    phase: CheckoutPhase,
    policy: ShippingPolicy,
}

impl CheckoutComposer {
    /// Composer with a blank form and the given shipping policy.
    #[must_use]
    pub fn new(policy: ShippingPolicy) -> Self {
        Self {
            form: DeliveryForm::default(),
            proof: None,
            phase: CheckoutPhase::Editing,
            policy,
        }
    }

    /// The delivery form as currently entered.
    #[must_use]
    pub const fn form(&self) -> &DeliveryForm {
        &self.form
    }

    /// Mutable access for field-by-field edits.
    pub const fn form_mut(&mut self) -> &mut DeliveryForm {
        &mut self.form
    }

    /// Where the flow currently stands.
    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// The attached proof file, if any.
    #[must_use]
    pub const fn proof(&self) -> Option<&PaymentProof> {
        self.proof.as_ref()
    }

    /// Transfer instructions for the currently selected payment method.
    #[must_use]
    pub fn instructions(&self) -> Option<PaymentInstructions> {
        self.form.payment_method.map(payment_instructions)
    }

    /// Attach a proof file, rejecting oversized or non-image files before
    /// they are ever held.
    ///
    /// # Errors
    ///
    /// Returns `ProofError` when the file exceeds 5 MB or is not an image.
    pub fn attach_proof(&mut self, proof: PaymentProof) -> Result<(), ProofError> {
        if proof.bytes.len() > MAX_PROOF_BYTES {
            return Err(ProofError::TooLarge);
        }
        if !proof.content_type.starts_with("image/") {
            return Err(ProofError::NotAnImage);
        }
        self.proof = Some(proof);
        Ok(())
    }

    /// Drop the attached proof file.
    pub fn detach_proof(&mut self) {
        self.proof = None;
    }

    /// Run the validation rules over the current form.
    ///
    /// A proof file is required whenever a payment method is selected,
    /// cash included.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        if self.form.full_name.trim().is_empty() {
            errors.push(FormField::FullName, "Full name is required");
        }
        let email = self.form.email.trim();
        if email.is_empty() {
            errors.push(FormField::Email, "Email is required");
        } else if !email_looks_valid(email) {
            errors.push(FormField::Email, "Email is invalid");
        }
        if self.form.phone.trim().is_empty() {
            errors.push(FormField::Phone, "Phone number is required");
        }
        if self.form.address.trim().is_empty() {
            errors.push(FormField::Address, "Address is required");
        }
        if self.form.city.trim().is_empty() {
            errors.push(FormField::City, "City is required");
        }
        if self.form.payment_method.is_none() {
            errors.push(FormField::PaymentMethod, "Payment method is required");
        }
        if self.form.payment_method.is_some() && self.proof.is_none() {
            errors.push(
                FormField::PaymentProof,
                "Payment proof is required for all payment methods",
            );
        }

        errors
    }

    /// Validate, upload the proof, compose the order, and insert it.
    ///
    /// On success the cart is cleared (wishlist untouched), the form is
    /// reset to defaults, and a confirmation notification carrying the
    /// order number and total is emitted.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` and drops back to `Editing` on an empty
    /// cart, a validation failure, an upload failure, or an insert
    /// failure. The cart and form are preserved in every error case.
    #[instrument(skip_all)]
    pub async fn submit<S, B>(
        &mut self,
        cart: &mut CartService<S>,
        backend: &B,
    ) -> Result<OrderConfirmation, CheckoutError>
    where
        S: LocalStore,
        B: ObjectStorage + OrderApi,
    {
        if cart.lines().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.phase = CheckoutPhase::Validating;
        let errors = self.validate();
        let (true, Some(method)) = (errors.is_empty(), self.form.payment_method) else {
            self.phase = CheckoutPhase::Editing;
            cart.notifier_mut().emit(
                "Please fix the highlighted fields and try again.",
                Severity::Error,
                crate::notify::CART_EVENT_TTL,
            );
            return Err(CheckoutError::Validation(errors));
        };

        self.phase = CheckoutPhase::Submitting;

        let payment_proof_url = match &self.proof {
            Some(proof) => {
                let path = format!("{PROOF_BUCKET}/{}.{}", Uuid::new_v4(), proof.extension());
                let url = backend
                    .upload(PROOF_BUCKET, &path, proof.bytes.clone(), &proof.content_type)
                    .await
                    .map_err(|err| {
                        warn!(error = %err, "payment proof upload failed");
                        self.phase = CheckoutPhase::Editing;
                        CheckoutError::Upload(err)
                    })?;
                Some(url)
            }
            None => None,
        };

        let order_number = generate_order_number();
        let subtotal = cart.cart_total();
        let shipping_fee = self.policy.fee_for(method, cart.lines().len());
        let tax = Decimal::ZERO;
        let total_amount = subtotal + shipping_fee + tax;

        let items: Vec<OrderLineSnapshot> = cart
            .lines()
            .iter()
            .map(OrderLineSnapshot::from_line)
            .collect();

        let order = Order {
            order_number: order_number.clone(),
            customer: CustomerDetails {
                name: self.form.full_name.trim().to_string(),
                email: self.form.email.trim().to_string(),
                phone: self.form.phone.trim().to_string(),
                address: self.form.address.trim().to_string(),
                city: self.form.city.trim().to_string(),
                postal_code: non_empty(&self.form.postal_code),
                country: self.form.country.clone(),
            },
            payment_method: method,
            payment_proof_url,
            special_instructions: non_empty(&self.form.special_instructions),
            items,
            subtotal,
            shipping_fee,
            tax,
            total_amount,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
        };

        backend.insert_order(&order).await.map_err(|err| {
            warn!(order_number, error = %err, "order insert failed");
            self.phase = CheckoutPhase::Editing;
            CheckoutError::Submission(err)
        })?;

        info!(order_number, %total_amount, "order submitted");

        cart.clear_cart();
        cart.notifier_mut().emit(
            format!("Order {order_number} placed successfully! Total: Rs. {total_amount}"),
            Severity::Success,
            CONFIRMATION_TTL,
        );
        self.form = DeliveryForm::default();
        self.proof = None;
        self.phase = CheckoutPhase::Cleared;

        Ok(OrderConfirmation {
            order_number,
            total_amount,
        })
    }
}

/// Client-side order number: `ORD-<YYYYMMDD>-<4 random uppercase chars>`.
/// Not guaranteed globally unique; the store accepts the collision risk at
/// its volume.
fn generate_order_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let mut rng = rand::rng();
    let suffix: String = (0..4)
        .map(|_| {
            let index = rng.random_range(0..ORDER_NUMBER_ALPHABET.len());
            ORDER_NUMBER_ALPHABET[index] as char
        })
        .collect();
    format!("ORD-{date}-{suffix}")
}

/// Loose shape check: something before an `@`, a dotted domain after it.
fn email_looks_valid(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !local.is_empty() && !host.is_empty() && !tld.is_empty()
}

/// Trim a form field, mapping an all-whitespace value to a null column.
fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartService, CatalogItem};
    use crate::store::MemoryStore;
    use solestride_core::{ProductId, UnitPricing};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockBackend {
        fail_upload: bool,
        fail_insert: bool,
        upload_calls: AtomicUsize,
        insert_calls: AtomicUsize,
        inserted: Mutex<Vec<Order>>,
    }

    impl ObjectStorage for MockBackend {
        async fn upload(
            &self,
            bucket: &str,
            path: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, BackendError> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_upload {
                return Err(BackendError::Api {
                    status: 500,
                    message: "storage unavailable".to_string(),
                });
            }
            Ok(format!("https://backend.test/{bucket}/{path}"))
        }
    }

    impl OrderApi for MockBackend {
        async fn insert_order(&self, order: &Order) -> Result<Order, BackendError> {
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_insert {
                return Err(BackendError::Api {
                    status: 503,
                    message: "database unavailable".to_string(),
                });
            }
            self.inserted.lock().unwrap().push(order.clone());
            Ok(order.clone())
        }
    }

    fn catalog_item(id: &str, price: i64) -> CatalogItem {
        CatalogItem {
            id: ProductId::from(id),
            title: format!("Sneaker {id}"),
            brand: Some("Adidas".to_string()),
            category: None,
            size: Some("9".to_string()),
            color: None,
            image: None,
            images: vec![],
            pricing: UnitPricing {
                price: Some(Decimal::from(price)),
                original_price: None,
                discounted_price: None,
            },
            discount_percent: None,
            has_discount: false,
        }
    }

    fn filled_form(method: Option<PaymentMethod>) -> DeliveryForm {
        DeliveryForm {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "03001234567".to_string(),
            address: "1 Analytical Lane".to_string(),
            city: "Lahore".to_string(),
            postal_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            payment_method: method,
            special_instructions: "  ".to_string(),
        }
    }

    fn proof() -> PaymentProof {
        PaymentProof {
            file_name: "receipt.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0u8; 64],
        }
    }

    fn ready_composer(method: PaymentMethod) -> CheckoutComposer {
        let mut composer = CheckoutComposer::default();
        *composer.form_mut() = filled_form(Some(method));
        composer.attach_proof(proof()).expect("attach");
        composer
    }

    fn cart_with_items() -> CartService<MemoryStore> {
        let mut cart = CartService::hydrate(MemoryStore::new());
        cart.add_to_cart(&catalog_item("A", 1000));
        cart.add_to_cart(&catalog_item("B", 500));
        cart
    }

    #[test]
    fn test_email_validator_shapes() {
        assert!(email_looks_valid("a@b.c"));
        assert!(email_looks_valid("ada.lovelace@mail.example.com"));
        assert!(!email_looks_valid("plainaddress"));
        assert!(!email_looks_valid("a@b"));
        assert!(!email_looks_valid("@b.c"));
        assert!(!email_looks_valid("a@.c"));
        assert!(!email_looks_valid("a b@c.d"));
    }

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        assert_eq!(number.len(), "ORD-20260828-A1B2".len());
        assert!(number.starts_with("ORD-"));
        let suffix = &number[number.len() - 4..];
        assert!(
            suffix
                .bytes()
                .all(|b| ORDER_NUMBER_ALPHABET.contains(&b))
        );
    }

    #[test]
    fn test_attach_proof_rejects_oversize() {
        let mut composer = CheckoutComposer::default();
        let big = PaymentProof {
            file_name: "huge.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0u8; MAX_PROOF_BYTES + 1],
        };
        assert_eq!(composer.attach_proof(big), Err(ProofError::TooLarge));
        assert!(composer.proof().is_none());
    }

    #[test]
    fn test_attach_proof_rejects_non_image() {
        let mut composer = CheckoutComposer::default();
        let pdf = PaymentProof {
            file_name: "receipt.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![0u8; 64],
        };
        assert_eq!(composer.attach_proof(pdf), Err(ProofError::NotAnImage));
    }

    #[test]
    fn test_shipping_fee_only_for_cash() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.fee_for(PaymentMethod::Cash, 2), Decimal::from(299));
        assert_eq!(policy.fee_for(PaymentMethod::SadaPay, 2), Decimal::ZERO);
        assert_eq!(policy.fee_for(PaymentMethod::Cash, 0), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_missing_payment_method_blocks_all_backend_calls() {
        let mut composer = CheckoutComposer::default();
        *composer.form_mut() = filled_form(None);
        let mut cart = cart_with_items();
        let backend = MockBackend::default();

        let result = composer.submit(&mut cart, &backend).await;

        let Err(CheckoutError::Validation(errors)) = result else {
            panic!("expected validation failure");
        };
        assert_eq!(
            errors.message_for(FormField::PaymentMethod),
            Some("Payment method is required")
        );
        assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.insert_calls.load(Ordering::SeqCst), 0);
        assert_eq!(composer.phase(), CheckoutPhase::Editing);
    }

    #[tokio::test]
    async fn test_proof_required_even_when_everything_else_valid() {
        let mut composer = CheckoutComposer::default();
        *composer.form_mut() = filled_form(Some(PaymentMethod::Cash));
        let mut cart = cart_with_items();
        let backend = MockBackend::default();

        let Err(CheckoutError::Validation(errors)) =
            composer.submit(&mut cart, &backend).await
        else {
            panic!("expected validation failure");
        };
        assert_eq!(
            errors.message_for(FormField::PaymentProof),
            Some("Payment proof is required for all payment methods")
        );
        assert!(errors.message_for(FormField::Email).is_none());
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_before_validation() {
        let mut composer = ready_composer(PaymentMethod::Cash);
        let mut cart = CartService::hydrate(MemoryStore::new());
        let backend = MockBackend::default();

        assert!(matches!(
            composer.submit(&mut cart, &backend).await,
            Err(CheckoutError::EmptyCart)
        ));
        assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_aborts_before_insert() {
        let mut composer = ready_composer(PaymentMethod::SadaPay);
        let mut cart = cart_with_items();
        let backend = MockBackend {
            fail_upload: true,
            ..MockBackend::default()
        };

        let result = composer.submit(&mut cart, &backend).await;

        assert!(matches!(result, Err(CheckoutError::Upload(_))));
        assert_eq!(backend.insert_calls.load(Ordering::SeqCst), 0);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(composer.phase(), CheckoutPhase::Editing);
    }

    #[tokio::test]
    async fn test_insert_failure_preserves_cart_and_form() {
        let mut composer = ready_composer(PaymentMethod::NayaPay);
        let mut cart = cart_with_items();
        let backend = MockBackend {
            fail_insert: true,
            ..MockBackend::default()
        };

        let result = composer.submit(&mut cart, &backend).await;

        assert!(matches!(result, Err(CheckoutError::Submission(_))));
        // Proof was uploaded and is now orphaned; no compensating delete.
        assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(composer.form().full_name, "Ada Lovelace");
        assert!(composer.proof().is_some());
        assert_eq!(composer.phase(), CheckoutPhase::Editing);
    }

    #[tokio::test]
    async fn test_successful_cash_submission_composes_full_order() {
        let mut composer = ready_composer(PaymentMethod::Cash);
        let mut cart = cart_with_items();
        cart.add_to_wishlist(&catalog_item("W", 900));
        let backend = MockBackend::default();

        let confirmation = composer
            .submit(&mut cart, &backend)
            .await
            .expect("submission succeeds");

        // subtotal 1500 + COD fee 299
        assert_eq!(confirmation.total_amount, Decimal::from(1799));

        let inserted = backend.inserted.lock().unwrap();
        let order = inserted.first().expect("one order");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.subtotal, Decimal::from(1500));
        assert_eq!(order.shipping_fee, Decimal::from(299));
        assert_eq!(order.tax, Decimal::ZERO);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.customer.postal_code, None);
        assert_eq!(order.special_instructions, None);
        assert!(
            order
                .payment_proof_url
                .as_deref()
                .is_some_and(|url| url.contains("payment-proofs/"))
        );

        // Cart cleared, wishlist untouched, form and proof reset.
        assert!(cart.lines().is_empty());
        assert_eq!(cart.wishlist_count(), 1);
        assert_eq!(composer.form(), &DeliveryForm::default());
        assert!(composer.proof().is_none());
        assert_eq!(composer.phase(), CheckoutPhase::Cleared);

        let note = cart.notifier().current().expect("confirmation visible");
        assert!(note.message().contains(&confirmation.order_number));
        assert!(note.message().contains("1799"));
    }

    #[tokio::test]
    async fn test_wallet_payment_ships_free() {
        let mut composer = ready_composer(PaymentMethod::SadaPay);
        let mut cart = cart_with_items();
        let backend = MockBackend::default();

        let confirmation = composer
            .submit(&mut cart, &backend)
            .await
            .expect("submission succeeds");
        assert_eq!(confirmation.total_amount, Decimal::from(1500));
    }

    #[tokio::test]
    async fn test_snapshot_is_decoupled_from_later_cart_state() {
        let mut composer = ready_composer(PaymentMethod::SadaPay);
        let mut cart = cart_with_items();
        let backend = MockBackend::default();

        composer
            .submit(&mut cart, &backend)
            .await
            .expect("submission succeeds");
        cart.add_to_cart(&catalog_item("Z", 9999));

        let inserted = backend.inserted.lock().unwrap();
        let order = inserted.first().expect("one order");
        assert_eq!(order.items.len(), 2);
        assert!(order.items.iter().all(|i| i.id.as_str() != "Z"));
    }

    #[test]
    fn test_instructions_follow_selected_method() {
        let mut composer = CheckoutComposer::default();
        assert!(composer.instructions().is_none());
        composer.form_mut().payment_method = Some(PaymentMethod::SadaPay);
        let instructions = composer.instructions().expect("instructions");
        assert_eq!(instructions.name, "SadaPay");
    }
}
