//! Cart and wishlist persistence across engine instances, simulating a
//! page reload by rehydrating a fresh engine from the same store.

use rust_decimal::Decimal;

use solestride_core::PaymentMethod;
use solestride_integration_tests::{RecordingBackend, catalog_item, proof_file, valid_form};
use solestride_storefront::cart::CartService;
use solestride_storefront::checkout::{CheckoutComposer, ShippingPolicy};
use solestride_storefront::store::{CART_ITEMS_KEY, LocalStore, MemoryStore};

#[test]
fn test_collections_survive_reload() {
    let store = MemoryStore::new();
    {
        let mut cart = CartService::hydrate(store.clone());
        cart.add_to_cart(&catalog_item("X", 1000));
        cart.add_to_cart(&catalog_item("X", 1000));
        cart.add_to_wishlist(&catalog_item("W", 500));
    }

    let revived = CartService::hydrate(store);
    assert_eq!(revived.cart_count(), 2);
    assert_eq!(revived.cart_total(), Decimal::from(2000));
    assert_eq!(revived.wishlist_count(), 1);
}

#[test]
fn test_corrupt_stored_cart_starts_empty() {
    let store = MemoryStore::new();
    store.set(CART_ITEMS_KEY, "{definitely not json").expect("set");

    let cart = CartService::hydrate(store);
    assert!(cart.lines().is_empty());
}

#[tokio::test]
async fn test_submission_persists_the_cleared_cart() {
    let store = MemoryStore::new();
    let mut cart = CartService::hydrate(store.clone());
    cart.add_to_cart(&catalog_item("X", 1000));
    cart.add_to_wishlist(&catalog_item("W", 500));

    let mut composer = CheckoutComposer::new(ShippingPolicy::default());
    *composer.form_mut() = valid_form(PaymentMethod::Cash);
    composer.attach_proof(proof_file()).expect("attach proof");

    composer
        .submit(&mut cart, &RecordingBackend::new())
        .await
        .expect("submission succeeds");

    // A reload after checkout must come back with an empty cart but the
    // wishlist intact.
    let revived = CartService::hydrate(store);
    assert!(revived.lines().is_empty());
    assert_eq!(revived.wishlist_count(), 1);
}
