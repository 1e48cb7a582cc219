//! Marketplace REST API client.
//!
//! One shared `reqwest` client behind a cheaply-clonable handle. Catalog
//! reads are cached with `moka` (5-minute TTL); everything else is
//! fetched fresh. Idempotent GETs get a single retry on transport
//! failure; mutations are single-shot.

mod cache;
mod error;
pub mod types;

pub use error::{ApiError, extract_error_message};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{RequestBuilder, Response, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use easel_core::{Artwork, ArtworkId, OrderId, PaymentMethod, UserId};

use crate::config::StorefrontConfig;
use crate::models::User;

use cache::CacheValue;
use types::{
    AuthResponse, CartSnapshot, CreateOrderRequest, ListResponse, Order, PaymentReceipt,
    PaymentRequest, ProfileUpdate, RegistrationForm,
};

/// Maximum cached catalog entries.
const CACHE_CAPACITY: u64 = 1000;
/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300);
/// Characters of an error body to include in log events.
const LOG_BODY_LIMIT: usize = 500;

/// Client for the marketplace REST API.
///
/// All authenticated operations take the bearer token as a parameter; the
/// session store owns the token and its lifecycle.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        Self::from_parts(config.api_base_url.clone(), config.request_timeout)
    }

    /// Create a client from a base URL and timeout.
    ///
    /// The base URL must end with a trailing slash; request paths are
    /// joined relative to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_parts(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                cache,
            }),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn authorize(request: RequestBuilder, token: &SecretString) -> RequestBuilder {
        request.header(
            header::AUTHORIZATION,
            format!("Token {}", token.expose_secret()),
        )
    }

    /// Send a GET, retrying once on transport failure. The backend's GETs
    /// are idempotent, so a single immediate retry is safe; HTTP error
    /// statuses are never retried.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
        context: &'static str,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let build = || {
            let request = self.inner.client.get(url.clone());
            match token {
                Some(token) => Self::authorize(request, token),
                None => request,
            }
        };

        let response = match build().send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, path, "GET failed in transit, retrying once");
                build().send().await?
            }
        };

        read_json(response, token.is_some(), context).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
        body: &impl serde::Serialize,
        context: &'static str,
    ) -> Result<T, ApiError> {
        let request = self.inner.client.post(self.url(path)?).json(body);
        let request = match token {
            Some(token) => Self::authorize(request, token),
            None => request,
        };
        read_json(request.send().await?, token.is_some(), context).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the backend's message on bad
    /// credentials, or `ApiError::Transport` if the server is unreachable.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.post_json("auth/login/", None, &body, "Login failed")
            .await
    }

    /// Register a new account. The backend issues a token immediately,
    /// so registration authenticates like a login.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the first field-level validation
    /// message on invalid input.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<AuthResponse, ApiError> {
        self.post_json("auth/register/", None, form, "Registration failed")
            .await
    }

    /// Invalidate the token server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; callers treat this as
    /// best-effort.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &SecretString) -> Result<(), ApiError> {
        let request = Self::authorize(self.inner.client.post(self.url("auth/logout/")?), token);
        let response = request.send().await?;
        read_ok(response, "Logout failed").await
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::TokenExpired` if the token was rejected.
    #[instrument(skip(self, token))]
    pub async fn get_profile(&self, token: &SecretString) -> Result<User, ApiError> {
        self.get_json("auth/profile/", Some(token), "Failed to fetch profile")
            .await
    }

    /// Update the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::TokenExpired` if the token was rejected, or
    /// `ApiError::Rejected` on validation failure.
    #[instrument(skip(self, token, changes))]
    pub async fn update_profile(
        &self,
        token: &SecretString,
        changes: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        let request = Self::authorize(
            self.inner.client.patch(self.url("auth/profile/")?),
            token,
        )
        .json(changes);
        read_json(request.send().await?, true, "Profile update failed").await
    }

    // =========================================================================
    // Catalog (cached)
    // =========================================================================

    /// List artworks, optionally filtered to one artist.
    ///
    /// The unfiltered listing is cached; filtered queries always hit the
    /// backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_artworks(&self, artist: Option<UserId>) -> Result<Vec<Artwork>, ApiError> {
        let cache_key = "artworks:all".to_owned();

        if artist.is_none()
            && let Some(CacheValue::Artworks(artworks)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for artwork listing");
            return Ok(artworks);
        }

        let path = match artist {
            Some(id) => format!("artworks/?artist_id={id}"),
            None => "artworks/".to_owned(),
        };
        let listing: ListResponse<Artwork> = self
            .get_json(&path, None, "Failed to fetch artworks")
            .await?;
        let artworks = listing.into_vec();

        if artist.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Artworks(artworks.clone()))
                .await;
        }

        Ok(artworks)
    }

    /// Fetch one artwork by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the artwork does not exist.
    #[instrument(skip(self), fields(artwork_id = %id))]
    pub async fn get_artwork(&self, id: ArtworkId) -> Result<Artwork, ApiError> {
        let cache_key = format!("artwork:{id}");

        if let Some(CacheValue::Artwork(artwork)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for artwork");
            return Ok(*artwork);
        }

        let artwork: Artwork = self
            .get_json(
                &format!("artworks/{id}/"),
                None,
                "Failed to fetch artwork",
            )
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Artwork(Box::new(artwork.clone())))
            .await;

        Ok(artwork)
    }

    /// List the signed-in artist's own works (not cached; the artist
    /// edits these).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::TokenExpired` if the token was rejected.
    #[instrument(skip(self, token))]
    pub async fn my_artworks(&self, token: &SecretString) -> Result<Vec<Artwork>, ApiError> {
        let listing: ListResponse<Artwork> = self
            .get_json("artworks/my/", Some(token), "Failed to fetch my artworks")
            .await?;
        Ok(listing.into_vec())
    }

    /// Drop a cached artwork (e.g., after its listing changed).
    pub async fn invalidate_artwork(&self, id: ArtworkId) {
        self.inner.cache.invalidate(&format!("artwork:{id}")).await;
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    // =========================================================================
    // Cart & Orders (never cached - mutable state)
    // =========================================================================

    /// Fetch the server-side cart snapshot for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::TokenExpired` if the token was rejected.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &SecretString) -> Result<CartSnapshot, ApiError> {
        self.get_json("cart/", Some(token), "Failed to fetch cart")
            .await
    }

    /// List the signed-in user's orders.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::TokenExpired` if the token was rejected.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        let listing: ListResponse<Order> = self
            .get_json("orders/", Some(token), "Failed to fetch orders")
            .await?;
        Ok(listing.into_vec())
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist or
    /// belongs to another user.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn get_order(&self, token: &SecretString, id: &OrderId) -> Result<Order, ApiError> {
        self.get_json(
            &format!("orders/{id}/"),
            Some(token),
            "Failed to fetch order",
        )
        .await
    }

    /// Create an order from the server cart and the finalized draft.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the backend refuses the order
    /// (e.g., empty cart, validation failure).
    #[instrument(skip(self, token, order))]
    pub async fn create_order(
        &self,
        token: &SecretString,
        order: &CreateOrderRequest,
    ) -> Result<Order, ApiError> {
        self.post_json("orders/", Some(token), order, "Failed to create order")
            .await
    }

    /// Process payment for an order. Must only be called after the order
    /// was created successfully.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if payment is refused (e.g., the
    /// order was already paid).
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn process_payment(
        &self,
        token: &SecretString,
        order_id: &OrderId,
        payment_method: PaymentMethod,
    ) -> Result<PaymentReceipt, ApiError> {
        self.post_json(
            &format!("orders/{order_id}/payment/"),
            Some(token),
            &PaymentRequest { payment_method },
            "Failed to process payment",
        )
        .await
    }
}

/// Funnel a response into the expected JSON type or an `ApiError`.
///
/// `authed` controls 401 handling: with a token attached, a 401 means the
/// token expired; without one (login/register), it is an ordinary
/// rejection whose body carries the message.
async fn read_json<T: DeserializeOwned>(
    response: Response,
    authed: bool,
    context: &'static str,
) -> Result<T, ApiError> {
    let status = response.status();

    if authed && status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::TokenExpired);
    }

    let body = response.text().await?;

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(extract_error_message(&body, context)));
    }

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %truncate(&body),
            "backend returned non-success status"
        );
        return Err(ApiError::Rejected {
            status,
            message: extract_error_message(&body, context),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(error = %e, body = %truncate(&body), "failed to parse backend response");
        ApiError::Parse(e)
    })
}

/// Like [`read_json`] for endpoints whose body we don't need.
async fn read_ok(response: Response, context: &'static str) -> Result<(), ApiError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::TokenExpired);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Rejected {
            status,
            message: extract_error_message(&body, context),
        });
    }

    Ok(())
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
