//! Session lifecycle against the mock backend: sign in, persist,
//! reload, sign out.

#![allow(clippy::unwrap_used)]

use secrecy::ExposeSecret;
use tempfile::TempDir;

use easel_integration_tests::MockMarket;
use easel_storefront::ClientError;
use easel_storefront::api::types::RegistrationForm;
use easel_storefront::storage::FileStorage;
use easel_storefront::stores::SessionStore;

fn session_file(dir: &TempDir) -> FileStorage {
    FileStorage::open(dir.path().join("session.json")).expect("failed to open session file")
}

// ============================================================================
// Sign-in & persistence
// ============================================================================

#[tokio::test]
async fn test_login_persists_across_restart() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();

    let mut session = SessionStore::new(market.client(), session_file(&dir)).unwrap();
    assert!(!session.is_authenticated());

    session.login("asha@example.com", "sunset42").await.unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.user().unwrap().username, "asha");

    // A fresh store over the same file hydrates the same identity
    // without any network call.
    market.shutdown();
    let reloaded = SessionStore::new(market.client(), session_file(&dir)).unwrap();
    assert!(reloaded.is_authenticated());
    assert_eq!(reloaded.user().unwrap().username, "asha");
    assert_eq!(reloaded.token().unwrap().expose_secret(), "tok-asha");
}

#[tokio::test]
async fn test_bad_credentials_surface_the_backend_message() {
    let market = MockMarket::spawn().await;
    let mut session =
        SessionStore::new(market.client(), session_file(&TempDir::new().unwrap())).unwrap();

    let err = session.login("asha@example.com", "wrong").await.unwrap_err();
    assert!(
        err.to_string().contains("Unable to log in"),
        "unexpected error: {err}"
    );
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_register_authenticates_immediately() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();
    let mut session = SessionStore::new(market.client(), session_file(&dir)).unwrap();

    let form = RegistrationForm {
        email: "nila@example.com".to_owned(),
        username: "nila".to_owned(),
        first_name: "Nila".to_owned(),
        last_name: "Menon".to_owned(),
        password: "harbour77".to_owned(),
        password_confirm: "harbour77".to_owned(),
        user_type: easel_core::Role::Buyer,
    };
    session.register(&form).await.unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.user().unwrap().username, "nila");
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected_with_field_error() {
    let market = MockMarket::spawn().await;
    let mut session =
        SessionStore::new(market.client(), session_file(&TempDir::new().unwrap())).unwrap();

    let form = RegistrationForm {
        email: "asha@example.com".to_owned(),
        username: "asha2".to_owned(),
        first_name: String::new(),
        last_name: String::new(),
        password: "pw".to_owned(),
        password_confirm: "pw".to_owned(),
        user_type: easel_core::Role::Buyer,
    };
    let err = session.register(&form).await.unwrap_err();
    assert!(err.to_string().contains("already exists"), "got: {err}");
    assert!(!session.is_authenticated());
}

// ============================================================================
// Sign-out
// ============================================================================

#[tokio::test]
async fn test_logout_clears_locally_and_invalidates_server_side() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();

    let mut session = SessionStore::new(market.client(), session_file(&dir)).unwrap();
    session.login("asha@example.com", "sunset42").await.unwrap();

    session.logout().await.unwrap();
    assert!(!session.is_authenticated());
    assert_eq!(market.logout_count(), 1);

    // Nothing left for a later store to hydrate.
    let reloaded = SessionStore::new(market.client(), session_file(&dir)).unwrap();
    assert!(!reloaded.is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_locally_even_when_the_server_is_down() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();

    let mut session = SessionStore::new(market.client(), session_file(&dir)).unwrap();
    session.login("asha@example.com", "sunset42").await.unwrap();

    market.shutdown();
    session.logout().await.unwrap();
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert!(session.token().is_none());
}

// ============================================================================
// Expired sessions
// ============================================================================

#[tokio::test]
async fn test_revoked_token_forces_sign_out_on_refresh() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();

    let mut session = SessionStore::new(market.client(), session_file(&dir)).unwrap();
    session.login("asha@example.com", "sunset42").await.unwrap();

    market.revoke_token("tok-asha");
    let err = session.refresh_user().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
    assert!(!session.is_authenticated());

    // The cleared state is durable too.
    let reloaded = SessionStore::new(market.client(), session_file(&dir)).unwrap();
    assert!(!reloaded.is_authenticated());
}

#[tokio::test]
async fn test_refresh_while_signed_out_is_rejected_without_network() {
    let market = MockMarket::spawn().await;
    market.shutdown();

    let mut session =
        SessionStore::new(market.client(), session_file(&TempDir::new().unwrap())).unwrap();
    let err = session.refresh_user().await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_update_refreshes_the_stored_user() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();

    let mut session = SessionStore::new(market.client(), session_file(&dir)).unwrap();
    session.login("asha@example.com", "sunset42").await.unwrap();

    let changes = easel_storefront::api::types::ProfileUpdate {
        bio: Some("Collector of monsoon landscapes".to_owned()),
        ..Default::default()
    };
    session.update_profile(&changes).await.unwrap();
    assert_eq!(
        session.user().unwrap().bio.as_deref(),
        Some("Collector of monsoon landscapes")
    );

    // The updated user is what a restart sees.
    let reloaded = SessionStore::new(market.client(), session_file(&dir)).unwrap();
    assert_eq!(
        reloaded.user().unwrap().bio.as_deref(),
        Some("Collector of monsoon landscapes")
    );
}
