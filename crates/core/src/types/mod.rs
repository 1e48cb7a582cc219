//! Core types for Easel.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod artwork;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use artwork::Artwork;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use status::*;
