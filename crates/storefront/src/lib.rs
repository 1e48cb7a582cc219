//! Easel Storefront - headless client library for the artwork marketplace.
//!
//! This crate is the state layer a view layer binds to. It owns:
//!
//! - The in-memory [`stores`] (cart, wishlist, session) with a narrow
//!   mutation API and a subscription mechanism for change notification
//! - The [`checkout`] wizard that turns cart contents into an order
//! - The [`api`] client for the marketplace's REST backend
//! - Durable [`storage`] for the authenticated session (token + user),
//!   so identity survives a restart
//!
//! Rendering, routing, and form widgets are explicitly out of scope; views
//! read store state, dispatch store operations, and subscribe for changes.
//!
//! # Concurrency model
//!
//! Stores are single-owner, mutated synchronously from one task. Network
//! calls are async and single-attempt (idempotent GETs get one retry on
//! transport failure); there is no request cancellation or queueing.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod stores;

pub use error::{ClientError, Result};
