//! Integration tests for Solestride.
//!
//! End-to-end flows over the cart engine, checkout composer, local store,
//! and a recording fake of the hosted backend. No network access is
//! required; the backend fake records every upload and insert so tests can
//! assert on call ordering and payloads.
//!
//! Shared fixtures live here; the flows themselves are under `tests/`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use rust_decimal::Decimal;

use solestride_core::{PaymentMethod, ProductId, UnitPricing};
use solestride_storefront::backend::{BackendError, ObjectStorage, OrderApi};
use solestride_storefront::cart::CatalogItem;
use solestride_storefront::checkout::{DEFAULT_COUNTRY, DeliveryForm, Order, PaymentProof};

/// Backend fake that records every call and can be told to fail either
/// endpoint.
#[derive(Default)]
pub struct RecordingBackend {
    pub fail_upload: bool,
    pub fail_insert: bool,
    pub upload_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub uploaded_paths: Mutex<Vec<String>>,
    pub inserted_orders: Mutex<Vec<Order>>,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing_insert() -> Self {
        Self {
            fail_insert: true,
            ..Self::default()
        }
    }

    /// The single inserted order, panicking if there is not exactly one.
    ///
    /// # Panics
    ///
    /// Panics when zero or more than one order was inserted.
    #[must_use]
    pub fn only_order(&self) -> Order {
        let orders = self
            .inserted_orders
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(orders.len(), 1, "expected exactly one inserted order");
        orders.first().cloned().expect("just asserted non-empty")
    }
}

impl ObjectStorage for RecordingBackend {
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
        self.uploaded_paths
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(format!("{bucket}/{path}"));
        Ok(format!(
            "https://backend.test/storage/v1/object/public/{bucket}/{path}"
        ))
    }
}

impl OrderApi for RecordingBackend {
    async fn insert_order(&self, order: &Order) -> Result<Order, BackendError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert {
            return Err(BackendError::Api {
                status: 503,
                message: "database unavailable".to_string(),
            });
        }
        self.inserted_orders
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(order.clone());
        Ok(order.clone())
    }
}

/// A catalog item with a plain price and a size, as a product page hands
/// it over.
#[must_use]
pub fn catalog_item(id: &str, price: i64) -> CatalogItem {
    CatalogItem {
        id: ProductId::from(id),
        title: format!("Sneaker {id}"),
        brand: Some("Nike".to_string()),
        category: Some("Shoes".to_string()),
        size: Some("9".to_string()),
        color: Some("White".to_string()),
        image: Some(format!("{id}.jpg")),
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

/// A catalog item carrying an active discount.
#[must_use]
pub fn discounted_item(id: &str, original: i64, discounted: i64) -> CatalogItem {
    let mut item = catalog_item(id, original);
    item.pricing = UnitPricing {
        price: Some(Decimal::from(original)),
        original_price: Some(Decimal::from(original)),
        discounted_price: Some(Decimal::from(discounted)),
    };
    item.has_discount = true;
    item
}

/// A delivery form that passes every validation rule.
#[must_use]
pub fn valid_form(method: PaymentMethod) -> DeliveryForm {
    DeliveryForm {
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "03001234567".to_string(),
        address: "1 Analytical Lane".to_string(),
        city: "Lahore".to_string(),
        postal_code: "54000".to_string(),
        country: DEFAULT_COUNTRY.to_string(),
        payment_method: Some(method),
        special_instructions: String::new(),
    }
}

/// A small PNG-typed proof file.
#[must_use]
pub fn proof_file() -> PaymentProof {
    PaymentProof {
        file_name: "receipt.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0u8; 128],
    }
}
