//! Solestride Core - Shared types library.
//!
//! This crate provides common types used across all Solestride components:
//! - `storefront` - Cart, checkout, and backend-adapter library
//! - `integration-tests` - End-to-end checkout scenarios
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! persistence. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, unit pricing, and status/payment enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
