//! Solestride storefront core library.
//!
//! Client-side cart and wishlist state, checkout composition, and thin
//! adapters over the hosted backend (REST CRUD + object storage) and the
//! device-local key-value store. There is no server and no local database:
//! the hosted backend owns persistence and auth, and the local store is a
//! best-effort mirror so collections survive a reload.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod notify;
pub mod store;
