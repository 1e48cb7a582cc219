//! Integration tests for Easel.
//!
//! Tests run against an in-process mock of the marketplace REST backend
//! ([`MockMarket`]), so the suite needs no external services:
//!
//! ```bash
//! cargo test -p easel-integration-tests
//! ```
//!
//! The mock speaks the same wire dialect as the real backend: token
//! auth (`Authorization: Token <token>`), decimal-string prices, DRF
//! style error bodies (`detail`, `non_field_errors`, field errors), and
//! paginated list envelopes.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use url::Url;

use easel_storefront::api::ApiClient;

/// Install a test tracing subscriber honoring `RUST_LOG`. Safe to call
/// from every test; only the first call wins.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// A seeded account the mock accepts credentials for.
#[derive(Debug, Clone)]
struct Account {
    password: String,
    token: String,
    user: Value,
}

/// Shared state behind the mock's handlers.
struct MarketState {
    accounts: Mutex<Vec<Account>>,
    revoked_tokens: Mutex<Vec<String>>,
    artworks: Vec<Value>,
    server_cart: Mutex<Vec<i64>>,
    orders: Mutex<Vec<Value>>,
    last_order_request: Mutex<Option<Value>>,
    fail_payments: AtomicBool,
    logouts: AtomicUsize,
    next_order: AtomicUsize,
}

impl MarketState {
    fn seeded() -> Self {
        let accounts = vec![
            Account {
                password: "sunset42".to_owned(),
                token: "tok-asha".to_owned(),
                user: json!({
                    "id": 1,
                    "email": "asha@example.com",
                    "username": "asha",
                    "first_name": "Asha",
                    "last_name": "Rao",
                    "user_type": "buyer",
                    "phone": "9999999999"
                }),
            },
            Account {
                password: "palette9".to_owned(),
                token: "tok-ravi".to_owned(),
                user: json!({
                    "id": 2,
                    "email": "ravi@example.com",
                    "username": "ravi",
                    "user_type": "artist"
                }),
            },
        ];

        let artworks = vec![
            json!({
                "id": 1,
                "title": "Monsoon Over Marine Drive",
                "artist_name": "Ravi Iyer",
                "artist": 2,
                "price": "250.00",
                "availability": "for_sale",
                "category": "painting"
            }),
            json!({
                "id": 2,
                "title": "Still Life with Brass Lamp",
                "artist_name": "Ravi Iyer",
                "artist": 2,
                "price": "250.00",
                "availability": "for_sale"
            }),
            json!({
                "id": 3,
                "title": "Banyan Root Study",
                "artist_name": "Meera Pillai",
                "artist": 7,
                "price": "3000.00",
                "availability": "for_sale"
            }),
        ];

        Self {
            accounts: Mutex::new(accounts),
            revoked_tokens: Mutex::new(Vec::new()),
            artworks,
            server_cart: Mutex::new(Vec::new()),
            orders: Mutex::new(Vec::new()),
            last_order_request: Mutex::new(None),
            fail_payments: AtomicBool::new(false),
            logouts: AtomicUsize::new(0),
            next_order: AtomicUsize::new(1),
        }
    }

    /// Resolve the `Authorization: Token <token>` header to a user.
    fn authenticate(&self, headers: &HeaderMap) -> Option<Value> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Token ")?
            .to_owned();
        if self.revoked_tokens.lock().unwrap().contains(&token) {
            return None;
        }
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.token == token)
            .map(|a| a.user.clone())
    }

    fn artwork_by_id(&self, id: i64) -> Option<Value> {
        self.artworks
            .iter()
            .find(|a| a["id"].as_i64() == Some(id))
            .cloned()
    }

    fn cart_snapshot(&self) -> Value {
        let ids = self.server_cart.lock().unwrap().clone();
        let items: Vec<Value> = ids
            .iter()
            .filter_map(|id| self.artwork_by_id(*id))
            .map(|artwork| json!({"artwork": artwork}))
            .collect();
        let total: f64 = items
            .iter()
            .filter_map(|i| i["artwork"]["price"].as_str())
            .filter_map(|p| p.parse::<f64>().ok())
            .sum();
        json!({
            "items": items,
            "total_items": items.len(),
            "total_amount": format!("{total:.2}")
        })
    }
}

type Reply = (StatusCode, Json<Value>);

fn unauthorized() -> Reply {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid token."})))
}

fn field(body: &Value, key: &str) -> String {
    body[key].as_str().unwrap_or_default().to_owned()
}

async fn login(State(state): State<Arc<MarketState>>, Json(body): Json<Value>) -> Reply {
    let email = field(&body, "email");
    let password = field(&body, "password");
    let accounts = state.accounts.lock().unwrap();
    match accounts
        .iter()
        .find(|a| a.user["email"] == json!(email) && a.password == password)
    {
        Some(account) => (
            StatusCode::OK,
            Json(json!({"token": account.token, "user": account.user})),
        ),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"non_field_errors": ["Unable to log in with provided credentials."]})),
        ),
    }
}

async fn register(State(state): State<Arc<MarketState>>, Json(body): Json<Value>) -> Reply {
    let email = field(&body, "email");
    let username = field(&body, "username");
    if field(&body, "password") != field(&body, "password_confirm") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"password": ["Password fields didn't match."]})),
        );
    }

    let mut accounts = state.accounts.lock().unwrap();
    if accounts.iter().any(|a| a.user["email"] == json!(email)) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["user with this email already exists."]})),
        );
    }

    let id = accounts.len() as i64 + 1;
    let account = Account {
        password: field(&body, "password"),
        token: format!("tok-{username}"),
        user: json!({
            "id": id,
            "email": email,
            "username": username,
            "first_name": field(&body, "first_name"),
            "last_name": field(&body, "last_name"),
            "user_type": body["user_type"].clone()
        }),
    };
    let response = json!({"token": account.token, "user": account.user});
    accounts.push(account);
    (StatusCode::CREATED, Json(response))
}

async fn logout(State(state): State<Arc<MarketState>>, headers: HeaderMap) -> Reply {
    let Some(_) = state.authenticate(&headers) else {
        return unauthorized();
    };
    if let Some(token) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Token "))
    {
        state.revoked_tokens.lock().unwrap().push(token.to_owned());
    }
    state.logouts.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, Json(json!({"message": "Logged out successfully."})))
}

async fn get_profile(State(state): State<Arc<MarketState>>, headers: HeaderMap) -> Reply {
    match state.authenticate(&headers) {
        Some(user) => (StatusCode::OK, Json(user)),
        None => unauthorized(),
    }
}

async fn update_profile(
    State(state): State<Arc<MarketState>>,
    headers: HeaderMap,
    Json(changes): Json<Value>,
) -> Reply {
    let Some(user) = state.authenticate(&headers) else {
        return unauthorized();
    };
    let mut accounts = state.accounts.lock().unwrap();
    let account = accounts
        .iter_mut()
        .find(|a| a.user["id"] == user["id"])
        .expect("authenticated user must exist");
    if let (Some(target), Some(source)) = (account.user.as_object_mut(), changes.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    (StatusCode::OK, Json(account.user.clone()))
}

async fn list_artworks(
    State(state): State<Arc<MarketState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let artist_filter: Option<i64> = params.get("artist_id").and_then(|v| v.parse().ok());
    let results: Vec<Value> = state
        .artworks
        .iter()
        .filter(|a| artist_filter.is_none_or(|id| a["artist"].as_i64() == Some(id)))
        .cloned()
        .collect();
    (
        StatusCode::OK,
        Json(json!({"count": results.len(), "results": results})),
    )
}

async fn get_artwork(State(state): State<Arc<MarketState>>, Path(id): Path<i64>) -> Reply {
    match state.artwork_by_id(id) {
        Some(artwork) => (StatusCode::OK, Json(artwork)),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))),
    }
}

async fn my_artworks(State(state): State<Arc<MarketState>>, headers: HeaderMap) -> Reply {
    let Some(user) = state.authenticate(&headers) else {
        return unauthorized();
    };
    let mine: Vec<Value> = state
        .artworks
        .iter()
        .filter(|a| a["artist"] == user["id"])
        .cloned()
        .collect();
    (StatusCode::OK, Json(json!(mine)))
}

async fn get_cart(State(state): State<Arc<MarketState>>, headers: HeaderMap) -> Reply {
    if state.authenticate(&headers).is_none() {
        return unauthorized();
    }
    (StatusCode::OK, Json(state.cart_snapshot()))
}

async fn create_order(
    State(state): State<Arc<MarketState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if state.authenticate(&headers).is_none() {
        return unauthorized();
    }
    if field(&body, "shipping_first_name").is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"shipping_first_name": ["This field may not be blank."]})),
        );
    }
    *state.last_order_request.lock().unwrap() = Some(body);

    let n = state.next_order.fetch_add(1, Ordering::SeqCst);
    let order = json!({
        "id": format!("7d1c2a9e-0000-0000-0000-{n:012}"),
        "order_number": format!("ORD-2025-{n:04}"),
        "status": "pending",
        "payment_status": "pending",
        "subtotal": "500.00",
        "tax_amount": "90.00",
        "shipping_amount": "50.00",
        "total_amount": "640.00"
    });
    state.orders.lock().unwrap().push(order.clone());
    (StatusCode::CREATED, Json(order))
}

async fn list_orders(State(state): State<Arc<MarketState>>, headers: HeaderMap) -> Reply {
    if state.authenticate(&headers).is_none() {
        return unauthorized();
    }
    let orders = state.orders.lock().unwrap().clone();
    (
        StatusCode::OK,
        Json(json!({"count": orders.len(), "results": orders})),
    )
}

async fn get_order(
    State(state): State<Arc<MarketState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    if state.authenticate(&headers).is_none() {
        return unauthorized();
    }
    let orders = state.orders.lock().unwrap();
    match orders.iter().find(|o| o["id"] == json!(id)) {
        Some(order) => (StatusCode::OK, Json(order.clone())),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))),
    }
}

async fn process_payment(
    State(state): State<Arc<MarketState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    if state.authenticate(&headers).is_none() {
        return unauthorized();
    }
    if state.fail_payments.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Payment declined by gateway."})),
        );
    }
    let mut orders = state.orders.lock().unwrap();
    let Some(order) = orders.iter_mut().find(|o| o["id"] == json!(id)) else {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."})));
    };
    order["payment_status"] = json!("paid");
    order["status"] = json!("confirmed");
    (
        StatusCode::OK,
        Json(json!({
            "message": "Payment processed successfully",
            "payment": {
                "payment_method": body["payment_method"].clone(),
                "status": "completed",
                "transaction_id": format!("TXN-{id}")
            }
        })),
    )
}

/// An in-process mock of the marketplace backend, bound to an ephemeral
/// port. Dropping it shuts the server down.
pub struct MockMarket {
    api_base: Url,
    state: Arc<MarketState>,
    server: tokio::task::JoinHandle<()>,
}

impl MockMarket {
    /// Start the mock with the standard seed data: two accounts
    /// (`asha@example.com` / `sunset42`, `ravi@example.com` /
    /// `palette9`) and a three-piece catalog.
    pub async fn spawn() -> Self {
        init_tracing();
        let state = Arc::new(MarketState::seeded());
        let app = Router::new()
            .route("/api/auth/login/", post(login))
            .route("/api/auth/register/", post(register))
            .route("/api/auth/logout/", post(logout))
            .route("/api/auth/profile/", get(get_profile).patch(update_profile))
            .route("/api/artworks/", get(list_artworks))
            .route("/api/artworks/my/", get(my_artworks))
            .route("/api/artworks/{id}/", get(get_artwork))
            .route("/api/cart/", get(get_cart))
            .route("/api/orders/", post(create_order).get(list_orders))
            .route("/api/orders/{id}/", get(get_order))
            .route("/api/orders/{id}/payment/", post(process_payment))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let addr = listener.local_addr().expect("mock backend has no address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock backend server failed");
        });

        let api_base = Url::parse(&format!("http://{addr}/api/")).expect("mock base url");
        Self {
            api_base,
            state,
            server,
        }
    }

    /// Base URL of the mock's REST API, with trailing slash.
    #[must_use]
    pub fn api_base(&self) -> Url {
        self.api_base.clone()
    }

    /// An [`ApiClient`] pointed at the mock.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::from_parts(self.api_base(), Duration::from_secs(5))
            .expect("failed to build api client")
    }

    /// Make every subsequent payment attempt fail with a gateway error.
    pub fn fail_payments(&self, fail: bool) {
        self.state.fail_payments.store(fail, Ordering::SeqCst);
    }

    /// Replace the server-side cart with the given artwork ids.
    pub fn set_server_cart(&self, artwork_ids: &[i64]) {
        *self.state.server_cart.lock().unwrap() = artwork_ids.to_vec();
    }

    /// Revoke a token so the next authenticated call gets a 401.
    pub fn revoke_token(&self, token: &str) {
        self.state.revoked_tokens.lock().unwrap().push(token.to_owned());
    }

    /// The body of the most recent `POST /orders/`, for asserting what
    /// the client actually sent.
    #[must_use]
    pub fn last_order_request(&self) -> Option<Value> {
        self.state.last_order_request.lock().unwrap().clone()
    }

    /// How many server-side logouts have been processed.
    #[must_use]
    pub fn logout_count(&self) -> usize {
        self.state.logouts.load(Ordering::SeqCst)
    }

    /// Number of orders the mock has accepted.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.state.orders.lock().unwrap().len()
    }

    /// Stop the server immediately, simulating an unreachable backend.
    pub fn shutdown(&self) {
        self.server.abort();
    }
}

impl Drop for MockMarket {
    fn drop(&mut self) {
        self.server.abort();
    }
}
