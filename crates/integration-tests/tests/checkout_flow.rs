//! End-to-end checkout against the mock backend: cart to confirmed
//! order, and the failure paths that must leave the cart intact.

#![allow(clippy::unwrap_used)]

use tempfile::TempDir;

use easel_core::{ArtworkId, PaymentMethod, Price};
use easel_integration_tests::MockMarket;
use easel_storefront::ClientError;
use easel_storefront::api::types::TransactionStatus;
use easel_storefront::checkout::{CheckoutError, CheckoutFlow, CheckoutStep};
use easel_storefront::config::CheckoutRates;
use easel_storefront::storage::FileStorage;
use easel_storefront::stores::{CartStore, SessionStore};

async fn signed_in_session(market: &MockMarket, dir: &TempDir) -> SessionStore<FileStorage> {
    let storage = FileStorage::open(dir.path().join("session.json")).unwrap();
    let mut session = SessionStore::new(market.client(), storage).unwrap();
    session.login("asha@example.com", "sunset42").await.unwrap();
    session
}

/// Fill the remaining required address fields of a prefilled draft.
fn complete_shipping(flow: &mut CheckoutFlow) {
    flow.draft.shipping.address_line_1 = "12 Gallery Lane".to_owned();
    flow.draft.shipping.city = "Mumbai".to_owned();
    flow.draft.shipping.state = "MH".to_owned();
    flow.draft.shipping.postal_code = "400001".to_owned();
}

async fn cart_with_two_pieces(market: &MockMarket) -> CartStore {
    let api = market.client();
    let mut cart = CartStore::new();
    cart.add(api.get_artwork(ArtworkId::new(1)).await.unwrap());
    cart.add(api.get_artwork(ArtworkId::new(2)).await.unwrap());
    cart
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_full_checkout_creates_order_pays_and_clears_the_cart() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();
    let session = signed_in_session(&market, &dir).await;
    let mut cart = cart_with_two_pieces(&market).await;
    assert_eq!(cart.subtotal(), Price::from_major(500));

    let mut flow = CheckoutFlow::for_user(CheckoutRates::default(), session.user().unwrap());
    // Prefill picked up the signed-in user's contact details.
    assert_eq!(flow.draft.shipping.first_name, "Asha");
    assert_eq!(flow.draft.shipping.email, "asha@example.com");
    complete_shipping(&mut flow);

    assert_eq!(flow.next().unwrap(), CheckoutStep::Payment);
    flow.draft.payment_method = PaymentMethod::Upi;
    assert_eq!(flow.next().unwrap(), CheckoutStep::Review);

    // Two 250.00 pieces sit exactly at the free-shipping threshold, so
    // shipping is still charged.
    let totals = flow.totals(cart.subtotal());
    assert_eq!(totals.tax, Price::from_major(90));
    assert_eq!(totals.shipping, Price::from_major(50));
    assert_eq!(totals.total, Price::from_major(640));

    let token = session.token().unwrap();
    let confirmation = flow.submit(session.api(), token, &mut cart).await.unwrap();

    assert!(cart.is_empty());
    assert_eq!(market.order_count(), 1);
    assert_eq!(confirmation.order.total_amount, Price::from_major(640));
    assert_eq!(
        confirmation.receipt.payment.status,
        TransactionStatus::Completed
    );
    assert_eq!(
        confirmation.receipt.payment.payment_method,
        Some(PaymentMethod::Upi)
    );

    // The order shows up in history, marked paid.
    let orders = session.api().list_orders(token).await.unwrap();
    assert_eq!(orders.len(), 1);
    let fetched = session
        .api()
        .get_order(token, &confirmation.order.id)
        .await
        .unwrap();
    assert_eq!(fetched.order_number, confirmation.order.order_number);
    assert_eq!(fetched.payment_status, easel_core::PaymentStatus::Paid);
}

#[tokio::test]
async fn test_submission_sends_billing_identical_to_shipping() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();
    let session = signed_in_session(&market, &dir).await;
    let mut cart = cart_with_two_pieces(&market).await;

    let mut flow = CheckoutFlow::for_user(CheckoutRates::default(), session.user().unwrap());
    complete_shipping(&mut flow);
    flow.next().unwrap();
    flow.next().unwrap();
    // Edit shipping after reaching review; the mirror flag means the
    // submitted billing must reflect the edit.
    flow.draft.shipping.city = "Pune".to_owned();

    let token = session.token().unwrap();
    flow.submit(session.api(), token, &mut cart).await.unwrap();

    let sent = market.last_order_request().unwrap();
    assert_eq!(sent["shipping_city"], "Pune");
    assert_eq!(sent["billing_city"], "Pune");
    assert_eq!(sent["billing_first_name"], sent["shipping_first_name"]);
    assert_eq!(sent["billing_postal_code"], sent["shipping_postal_code"]);
}

#[tokio::test]
async fn test_server_cart_total_feeds_the_estimate() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();
    let session = signed_in_session(&market, &dir).await;
    market.set_server_cart(&[3]);

    let snapshot = session
        .api()
        .get_cart(session.token().unwrap())
        .await
        .unwrap();
    assert_eq!(snapshot.total_amount, Price::from_major(3000));

    // Above the threshold: free shipping.
    let flow = CheckoutFlow::new(CheckoutRates::default());
    let totals = flow.totals(snapshot.total_amount);
    assert_eq!(totals.shipping, Price::ZERO);
    assert_eq!(totals.total, Price::from_major(3540));
}

// ============================================================================
// Failure paths
// ============================================================================

#[tokio::test]
async fn test_failed_payment_aborts_and_leaves_the_cart_intact() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();
    let session = signed_in_session(&market, &dir).await;
    let mut cart = cart_with_two_pieces(&market).await;

    let mut flow = CheckoutFlow::for_user(CheckoutRates::default(), session.user().unwrap());
    complete_shipping(&mut flow);
    flow.next().unwrap();
    flow.next().unwrap();

    market.fail_payments(true);
    let token = session.token().unwrap();
    let err = flow.submit(session.api(), token, &mut cart).await.unwrap_err();
    assert!(err.to_string().contains("declined"), "got: {err}");

    // The order exists but is unpaid, and nothing was lost client-side.
    assert_eq!(market.order_count(), 1);
    assert_eq!(cart.distinct_count(), 2);
    assert_eq!(cart.subtotal(), Price::from_major(500));

    // Fixing the gateway and retrying from review succeeds.
    market.fail_payments(false);
    let confirmation = flow.submit(session.api(), token, &mut cart).await.unwrap();
    assert!(cart.is_empty());
    assert_eq!(
        confirmation.receipt.payment.status,
        TransactionStatus::Completed
    );
}

#[tokio::test]
async fn test_submit_requires_the_review_step() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();
    let session = signed_in_session(&market, &dir).await;
    let mut cart = cart_with_two_pieces(&market).await;

    let mut flow = CheckoutFlow::new(CheckoutRates::default());
    let token = session.token().unwrap();
    let err = flow.submit(session.api(), token, &mut cart).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Checkout(CheckoutError::NotAtReview)
    ));
    assert_eq!(market.order_count(), 0);
}

#[tokio::test]
async fn test_empty_cart_cannot_be_submitted() {
    let market = MockMarket::spawn().await;
    let dir = TempDir::new().unwrap();
    let session = signed_in_session(&market, &dir).await;
    let mut cart = CartStore::new();

    let mut flow = CheckoutFlow::for_user(CheckoutRates::default(), session.user().unwrap());
    complete_shipping(&mut flow);
    flow.next().unwrap();
    flow.next().unwrap();

    let token = session.token().unwrap();
    let err = flow.submit(session.api(), token, &mut cart).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Checkout(CheckoutError::EmptyCart)
    ));
    assert_eq!(market.order_count(), 0);
}
