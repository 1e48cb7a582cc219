//! API error types and backend error-body extraction.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised by the backend API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never reached the server (DNS, connect, timeout).
    #[error("Unable to connect to the server")]
    Transport(#[from] reqwest::Error),

    /// The stored token was rejected (HTTP 401).
    #[error("Authentication expired")]
    TokenExpired,

    /// The resource does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server rejected the request with a structured error body.
    #[error("{message}")]
    Rejected {
        /// HTTP status of the rejection.
        status: StatusCode,
        /// First recognized error message from the body.
        message: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("Invalid response from server: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request path could not be joined onto the base URL.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Field names recognized when extracting the first field-level error.
///
/// Order matters: it is the precedence the original client applied.
const RECOGNIZED_FIELDS: &[(&str, &str)] = &[
    ("password", "Password"),
    ("password_confirm", "Password confirmation"),
    ("email", "Email"),
    ("username", "Username"),
];

/// Extract a user-facing message from a backend error body.
///
/// The backend emits DRF-style bodies. Precedence: `detail`, then the
/// first `non_field_errors` entry, then the first recognized field error
/// (prefixed with the field label), then `error`, then a generic message.
#[must_use]
pub fn extract_error_message(body: &str, fallback: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback.to_owned();
    };

    if let Some(detail) = value.get("detail").and_then(|v| v.as_str()) {
        return detail.to_owned();
    }

    if let Some(msg) = first_message(value.get("non_field_errors")) {
        return msg;
    }

    for (field, label) in RECOGNIZED_FIELDS {
        if let Some(msg) = first_message(value.get(*field)) {
            return format!("{label}: {msg}");
        }
    }

    if let Some(error) = value.get("error").and_then(|v| v.as_str()) {
        return error.to_owned();
    }

    fallback.to_owned()
}

/// First string out of a value that is either a string or an array of
/// strings (DRF uses both shapes).
fn first_message(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|item| item.as_str())
            .map(str::to_owned),
        _ => None,
    }
}
