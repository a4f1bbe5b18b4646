//! Cart and wishlist engine.
//!
//! Holds the in-memory cart lines and wishlist entries, exposes the
//! mutation operations, derives counts and totals, and mirrors every
//! mutation to the device-local store. The collections are mutated only
//! through this service (single writer); views read freely.
//!
//! Identity rules are deliberately asymmetric and must stay that way:
//! adding merges by the `(product id, size)` pair, while removal drops the
//! first line matching the product id regardless of size. This is a
//! documented business rule of the store, not an accident.

mod types;

pub use types::{CartLine, CatalogItem, DEFAULT_CATEGORY, DEFAULT_COLOR, DEFAULT_SIZE, WishlistEntry};

use rust_decimal::Decimal;

use solestride_core::ProductId;

use crate::notify::NotificationEmitter;
use crate::store::{CART_ITEMS_KEY, LocalStore, WISHLIST_ITEMS_KEY, load_collection, save_collection};

/// In-memory cart and wishlist with best-effort local persistence.
#[derive(Debug)]
pub struct CartService<S> {
    lines: Vec<CartLine>,
    wishlist: Vec<WishlistEntry>,
    store: S,
    notifier: NotificationEmitter,
}

impl<S: LocalStore> CartService<S> {
    /// Hydrate both collections from the local store. Missing or corrupt
    /// values start the session with empty collections.
    pub fn hydrate(store: S) -> Self {
        let lines = load_collection(&store, CART_ITEMS_KEY);
        let wishlist = load_collection(&store, WISHLIST_ITEMS_KEY);
        Self {
            lines,
            wishlist,
            store,
            notifier: NotificationEmitter::new(),
        }
    }

    // =========================================================================
    // Cart operations
    // =========================================================================

    /// Add a catalog item to the cart.
    ///
    /// If a line for the same `(product id, size)` pair exists its quantity
    /// is incremented by 1; otherwise a new line with quantity 1 is
    /// appended. Persists afterwards.
    pub fn add_to_cart(&mut self, item: &CatalogItem) {
        let incoming = CartLine::from_item(item);
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == incoming.product_id && l.size == incoming.size)
        {
            line.quantity += 1;
            self.notifier
                .success(format!("{} quantity updated in cart!", item.title));
        } else {
            self.lines.push(incoming);
            self.notifier
                .success(format!("{} added to cart!", item.title));
        }
        self.persist_cart();
    }

    /// Remove the first line matching `product_id`, regardless of size.
    ///
    /// Silent no-op (no notification, no persist) when no line matches.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) {
        let Some(index) = self.lines.iter().position(|l| &l.product_id == product_id) else {
            return;
        };
        let removed = self.lines.remove(index);
        self.notifier
            .success(format!("{} removed from cart!", removed.title));
        self.persist_cart();
    }

    /// Adjust quantity by `delta` on every line with this product id,
    /// clamping at a minimum of 1. Silent: no notification is emitted.
    pub fn update_quantity(&mut self, product_id: &ProductId, delta: i64) {
        let mut touched = false;
        for line in self
            .lines
            .iter_mut()
            .filter(|l| &l.product_id == product_id)
        {
            let next = i64::from(line.quantity).saturating_add(delta).max(1);
            line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
            touched = true;
        }
        if touched {
            self.persist_cart();
        }
    }

    /// Set an absolute quantity on every line with this product id.
    /// Ignored entirely when `quantity` is below 1.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity < 1 {
            return;
        }
        let mut touched = false;
        for line in self
            .lines
            .iter_mut()
            .filter(|l| &l.product_id == product_id)
        {
            line.quantity = quantity;
            touched = true;
        }
        if touched {
            self.persist_cart();
        }
    }

    /// Sum of all line quantities (not the number of lines).
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum over lines of effective unit price times quantity.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Empty the cart, notify, and persist. The wishlist is untouched.
    pub fn clear_cart(&mut self) {
        self.lines.clear();
        self.notifier.success("Cart cleared successfully!");
        self.persist_cart();
    }

    /// Whether any cart line carries this product id (any size).
    #[must_use]
    pub fn is_in_cart(&self, product_id: &ProductId) -> bool {
        self.lines.iter().any(|l| &l.product_id == product_id)
    }

    // =========================================================================
    // Wishlist operations
    // =========================================================================

    /// Toggle an item's wishlist membership.
    ///
    /// Adding an id that is already present removes it - add acts as
    /// add-or-remove, a deliberate UX shortcut of the store.
    pub fn add_to_wishlist(&mut self, item: &CatalogItem) {
        if let Some(index) = self
            .wishlist
            .iter()
            .position(|e| e.product_id == item.id)
        {
            self.wishlist.remove(index);
            self.notifier
                .success(format!("{} removed from wishlist!", item.title));
        } else {
            self.wishlist.push(WishlistEntry::from_item(item));
            self.notifier
                .success(format!("{} added to wishlist!", item.title));
        }
        self.persist_wishlist();
    }

    /// Remove a wishlist entry by product id. Silent no-op when absent.
    pub fn remove_from_wishlist(&mut self, product_id: &ProductId) {
        let Some(index) = self
            .wishlist
            .iter()
            .position(|e| &e.product_id == product_id)
        else {
            return;
        };
        let removed = self.wishlist.remove(index);
        self.notifier
            .success(format!("{} removed from wishlist!", removed.title));
        self.persist_wishlist();
    }

    /// Empty the wishlist, notify, and persist.
    pub fn clear_wishlist(&mut self) {
        self.wishlist.clear();
        self.notifier.success("Wishlist cleared successfully!");
        self.persist_wishlist();
    }

    /// Whether the wishlist holds this product id.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: &ProductId) -> bool {
        self.wishlist.iter().any(|e| &e.product_id == product_id)
    }

    /// Number of wishlist entries.
    #[must_use]
    pub fn wishlist_count(&self) -> usize {
        self.wishlist.len()
    }

    /// Move an item from the wishlist into the cart.
    ///
    /// Composed from `add_to_cart` then `remove_from_wishlist` - not
    /// atomic; an interruption can leave the item in both collections.
    pub fn move_to_cart(&mut self, item: &CatalogItem) {
        self.add_to_cart(item);
        self.remove_from_wishlist(&item.id);
    }

    /// Move an item from the cart into the wishlist. Composed, not atomic.
    pub fn move_to_wishlist(&mut self, item: &CatalogItem) {
        self.add_to_wishlist(item);
        self.remove_from_cart(&item.id);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The current cart lines.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The current wishlist entries.
    #[must_use]
    pub fn wishlist(&self) -> &[WishlistEntry] {
        &self.wishlist
    }

    /// The notification emitter, for the view layer to poll.
    #[must_use]
    pub const fn notifier(&self) -> &NotificationEmitter {
        &self.notifier
    }

    /// Mutable access to the emitter, for checkout confirmations.
    pub const fn notifier_mut(&mut self) -> &mut NotificationEmitter {
        &mut self.notifier
    }

    fn persist_cart(&self) {
        save_collection(&self.store, CART_ITEMS_KEY, &self.lines);
    }

    fn persist_wishlist(&self) {
        save_collection(&self.store, WISHLIST_ITEMS_KEY, &self.wishlist);
    }
}
