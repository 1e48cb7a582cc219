//! The authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use easel_core::{Email, Role, UserId};

/// The signed-in account as returned by the auth and profile endpoints.
///
/// Serialized as-is into durable session storage, so identity survives a
/// restart without a network round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique account ID.
    pub id: UserId,
    /// Account email address.
    pub email: Email,
    /// Public handle.
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Buyer or artist.
    #[serde(default)]
    pub user_type: Role,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// When the account was created; absent on some historical payloads.
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

impl User {
    /// Display name: "First Last", falling back to the username.
    #[must_use]
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.username.clone()
        } else {
            trimmed.to_owned()
        }
    }

    /// True if the account can list artworks.
    #[must_use]
    pub const fn is_artist(&self) -> bool {
        matches!(self.user_type, Role::Artist)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> User {
        serde_json::from_str(
            r#"{
                "id": 3,
                "email": "maya@example.com",
                "username": "maya",
                "first_name": "Maya",
                "last_name": "Rao",
                "user_type": "artist"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample().full_name(), "Maya Rao");
    }

    #[test]
    fn test_full_name_falls_back_to_username() {
        let mut user = sample();
        user.first_name.clear();
        user.last_name.clear();
        assert_eq!(user.full_name(), "maya");
    }

    #[test]
    fn test_role() {
        assert!(sample().is_artist());
    }

    #[test]
    fn test_storage_roundtrip() {
        let user = sample();
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, user.id);
        assert_eq!(back.email, user.email);
    }
}
