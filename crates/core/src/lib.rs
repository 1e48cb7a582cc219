//! Easel Core - Shared types library.
//!
//! This crate provides the domain types used across all Easel components:
//! - `storefront` - the headless client library (stores, checkout, API glue)
//! - `integration-tests` - cross-component test scenarios
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! Every value that flows between the cart, wishlist, session, and checkout
//! modules is defined here once, so the stores all agree on the shape of an
//! artwork or a price.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, statuses, and the artwork type

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
