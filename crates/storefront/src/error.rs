//! Unified error handling for the storefront client.
//!
//! Each module defines its own error enum; `ClientError` is the single
//! type callers (the view layer) match on. Store operations never
//! partially mutate state on error: a failed login leaves the session
//! as it was, a failed payment leaves the cart intact.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Top-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend API rejected a request or could not be reached.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Durable session storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Checkout flow rejected an operation.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The stored token was rejected by the backend; the session has been
    /// cleared and the user must sign in again.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// An operation that requires a signed-in session was called while
    /// signed out.
    #[error("Not signed in")]
    NotAuthenticated,
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
