//! The session store: authenticated identity and bearer token.

use secrecy::SecretString;
use tracing::{debug, warn};

use crate::api::types::{ProfileUpdate, RegistrationForm};
use crate::api::{ApiClient, ApiError};
use crate::error::ClientError;
use crate::models::User;
use crate::storage::{SessionStorage, StorageError, keys};
use crate::stores::notify::{Subscribers, SubscriptionId};

/// Owns the signed-in user and bearer token, synchronized with durable
/// storage so identity survives a restart.
///
/// Invariant: user and token are set together or both absent, in memory
/// and in storage - there is no half-authenticated state. Hydration
/// treats a lone token or lone user as corruption and fails safe to
/// signed-out.
pub struct SessionStore<S: SessionStorage> {
    api: ApiClient,
    storage: S,
    user: Option<User>,
    token: Option<SecretString>,
    subscribers: Subscribers,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Create the store, hydrating from durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error only if storage itself cannot be read or
    /// cleared; inconsistent contents are repaired, not reported.
    pub fn new(api: ApiClient, storage: S) -> Result<Self, StorageError> {
        let mut store = Self {
            api,
            storage,
            user: None,
            token: None,
            subscribers: Subscribers::default(),
        };
        store.hydrate()?;
        Ok(store)
    }

    fn hydrate(&mut self) -> Result<(), StorageError> {
        let token = self.storage.get(keys::TOKEN)?;
        let user_json = self.storage.get(keys::USER)?;

        match (token, user_json) {
            (Some(token), Some(user_json)) => match serde_json::from_str::<User>(&user_json) {
                Ok(user) => {
                    debug!(user_id = %user.id, "session hydrated from storage");
                    self.token = Some(SecretString::from(token));
                    self.user = Some(user);
                }
                Err(e) => {
                    warn!(error = %e, "stored user is unreadable, clearing session");
                    self.clear_storage()?;
                }
            },
            (None, None) => {}
            _ => {
                // Lone token or lone user: corrupted state, never
                // half-authenticate.
                warn!("inconsistent session state in storage, clearing");
                self.clear_storage()?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // State machine: signed-out -> signed-in -> signed-out
    // =========================================================================

    /// Log in with email and password.
    ///
    /// On success the session is signed-in and persisted. On failure the
    /// session is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection message for bad credentials, or a
    /// connectivity error if the server was unreachable.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        let response = self.api.clone().login(email, password).await?;
        self.set_auth_data(response.token, response.user)?;
        Ok(())
    }

    /// Register a new account. The backend auto-authenticates the new
    /// account, so success behaves exactly like [`Self::login`].
    ///
    /// # Errors
    ///
    /// Returns the first field-level validation message on rejected
    /// input, without mutating session state.
    pub async fn register(&mut self, form: &RegistrationForm) -> Result<(), ClientError> {
        let response = self.api.clone().register(form).await?;
        self.set_auth_data(response.token, response.user)?;
        Ok(())
    }

    /// Sign out. The server-side token invalidation is best-effort; local
    /// state and durable storage are cleared unconditionally.
    ///
    /// # Errors
    ///
    /// Returns an error only if durable storage cannot be cleared.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        if let Some(token) = &self.token
            && let Err(e) = self.api.clone().logout(token).await
        {
            warn!(error = %e, "server-side logout failed, clearing local session anyway");
        }
        self.clear_auth_data()?;
        Ok(())
    }

    /// Re-fetch the profile with the stored token. A rejected token
    /// forces the session to signed-out.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotAuthenticated`] when signed out, and
    /// [`ClientError::SessionExpired`] after clearing a rejected session.
    pub async fn refresh_user(&mut self) -> Result<(), ClientError> {
        let Some(token) = &self.token else {
            return Err(ClientError::NotAuthenticated);
        };

        match self.api.clone().get_profile(token).await {
            Ok(user) => {
                self.replace_user(user)?;
                Ok(())
            }
            Err(ApiError::TokenExpired) => {
                warn!("stored token rejected by backend, signing out");
                self.clear_auth_data()?;
                Err(ClientError::SessionExpired)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Update the profile and store the refreshed user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotAuthenticated`] when signed out, or the
    /// backend's rejection on validation failure.
    pub async fn update_profile(&mut self, changes: &ProfileUpdate) -> Result<(), ClientError> {
        let Some(token) = &self.token else {
            return Err(ClientError::NotAuthenticated);
        };

        match self.api.clone().update_profile(token, changes).await {
            Ok(user) => {
                self.replace_user(user)?;
                Ok(())
            }
            Err(ApiError::TokenExpired) => {
                self.clear_auth_data()?;
                Err(ClientError::SessionExpired)
            }
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// True iff both user and token are present. Re-derived on every
    /// call, never cached, so it can't go stale after a logout.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The bearer token, if signed in.
    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// The API client this session authenticates against.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribe to sign-in/sign-out/profile-change notifications.
    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Remove a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Persist then apply a new signed-in state. Storage is written
    /// before memory, so a storage failure leaves the session untouched.
    fn set_auth_data(&mut self, token: String, user: User) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(&user)?;
        self.storage.set(keys::TOKEN, &token)?;
        self.storage.set(keys::USER, &user_json)?;
        self.token = Some(SecretString::from(token));
        self.user = Some(user);
        self.subscribers.notify();
        Ok(())
    }

    /// Replace the stored user (token unchanged).
    fn replace_user(&mut self, user: User) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(&user)?;
        self.storage.set(keys::USER, &user_json)?;
        self.user = Some(user);
        self.subscribers.notify();
        Ok(())
    }

    fn clear_auth_data(&mut self) -> Result<(), StorageError> {
        let was_signed_in = self.is_authenticated();
        self.clear_storage()?;
        self.token = None;
        self.user = None;
        if was_signed_in {
            self.subscribers.notify();
        }
        Ok(())
    }

    fn clear_storage(&mut self) -> Result<(), StorageError> {
        self.storage.remove(keys::TOKEN)?;
        self.storage.remove(keys::USER)?;
        Ok(())
    }
}

impl<S: SessionStorage> std::fmt::Debug for SessionStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("user", &self.user.as_ref().map(|u| u.id))
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
