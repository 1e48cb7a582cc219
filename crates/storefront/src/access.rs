//! Route access gating.
//!
//! Views wrap their entry points in these checks before rendering.
//! A denial carries the destination the caller was heading to, so the
//! sign-in view can send them back there afterwards.

use easel_core::Role;

use crate::models::User;
use crate::storage::SessionStorage;
use crate::stores::SessionStore;

/// Why a protected destination was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    /// No authenticated session; redirect to sign-in and come back.
    #[error("sign in required to visit {destination}")]
    SignInRequired { destination: String },

    /// Signed in, but with the wrong account type.
    #[error("{required} account required to visit {destination}")]
    RoleRequired { required: Role, destination: String },
}

impl AccessDenied {
    /// The destination the caller should resume at after resolving
    /// the denial.
    #[must_use]
    pub fn destination(&self) -> &str {
        match self {
            Self::SignInRequired { destination } | Self::RoleRequired { destination, .. } => {
                destination
            }
        }
    }
}

/// Allow only authenticated sessions through; returns the signed-in
/// user so the view can render without a second lookup.
///
/// # Errors
///
/// Returns [`AccessDenied::SignInRequired`] when the session is signed
/// out.
pub fn require_auth<'a, S: SessionStorage>(
    session: &'a SessionStore<S>,
    destination: &str,
) -> Result<&'a User, AccessDenied> {
    session.user().ok_or_else(|| AccessDenied::SignInRequired {
        destination: destination.to_owned(),
    })
}

/// Allow only authenticated sessions with the given account type.
///
/// An unauthenticated caller gets [`AccessDenied::SignInRequired`], not
/// a role denial, so the resume-after-sign-in flow still applies.
///
/// # Errors
///
/// Returns [`AccessDenied::RoleRequired`] when signed in under the
/// wrong account type.
pub fn require_role<'a, S: SessionStorage>(
    session: &'a SessionStore<S>,
    required: Role,
    destination: &str,
) -> Result<&'a User, AccessDenied> {
    let user = require_auth(session, destination)?;
    if user.user_type == required {
        Ok(user)
    } else {
        Err(AccessDenied::RoleRequired {
            required,
            destination: destination.to_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::storage::{MemoryStorage, keys};
    use std::time::Duration;
    use url::Url;

    fn api() -> ApiClient {
        ApiClient::from_parts(
            Url::parse("http://localhost:8000/api/").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn signed_in(user_type: &str) -> SessionStore<MemoryStorage> {
        let user = format!(
            r#"{{"id": 1, "email": "a@b.c", "username": "a", "user_type": "{user_type}"}}"#
        );
        let storage = MemoryStorage::with_values([(keys::TOKEN, "tok"), (keys::USER, &user)]);
        SessionStore::new(api(), storage).unwrap()
    }

    #[test]
    fn test_signed_out_is_redirected_to_sign_in() {
        let session = SessionStore::new(api(), MemoryStorage::new()).unwrap();

        let denied = require_auth(&session, "/checkout").unwrap_err();
        assert_eq!(
            denied,
            AccessDenied::SignInRequired {
                destination: "/checkout".to_owned()
            }
        );
        assert_eq!(denied.destination(), "/checkout");
    }

    #[test]
    fn test_signed_in_passes_auth_gate() {
        let session = signed_in("buyer");
        let user = require_auth(&session, "/checkout").unwrap();
        assert_eq!(user.username, "a");
    }

    #[test]
    fn test_role_gate() {
        let artist = signed_in("artist");
        assert!(require_role(&artist, Role::Artist, "/studio").is_ok());

        let buyer = signed_in("buyer");
        let denied = require_role(&buyer, Role::Artist, "/studio").unwrap_err();
        assert_eq!(
            denied,
            AccessDenied::RoleRequired {
                required: Role::Artist,
                destination: "/studio".to_owned()
            }
        );
    }

    #[test]
    fn test_signed_out_role_gate_asks_for_sign_in_first() {
        let session = SessionStore::new(api(), MemoryStorage::new()).unwrap();
        let denied = require_role(&session, Role::Artist, "/studio").unwrap_err();
        assert!(matches!(denied, AccessDenied::SignInRequired { .. }));
    }
}
