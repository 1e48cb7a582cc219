//! Wire types for the marketplace REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use easel_core::{Artwork, OrderId, OrderStatus, PaymentMethod, PaymentStatus, Price, Role};

use crate::models::User;

/// Response of `POST /auth/login/` and `POST /auth/register/`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent authenticated calls.
    pub token: String,
    /// The authenticated account.
    pub user: User,
}

/// Body of `POST /auth/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationForm {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
    pub user_type: Role,
}

/// Body of `PATCH /auth/profile/`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One line of the server-side cart snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct CartSnapshotItem {
    pub artwork: Artwork,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

/// Response of `GET /cart/`: the backend's view of the signed-in user's
/// cart. Its `total_amount` is the authoritative checkout subtotal.
#[derive(Debug, Clone, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartSnapshotItem>,
    #[serde(default)]
    pub total_items: u32,
    pub total_amount: Price,
}

impl CartSnapshot {
    /// True if the server cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Body of `POST /orders/`: the finalized order draft. Field names match
/// the backend's flat shipping/billing columns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateOrderRequest {
    pub shipping_first_name: String,
    pub shipping_last_name: String,
    pub shipping_email: String,
    pub shipping_phone: String,
    pub shipping_address_line_1: String,
    pub shipping_address_line_2: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_postal_code: String,
    pub shipping_country: String,
    pub billing_first_name: String,
    pub billing_last_name: String,
    pub billing_email: String,
    pub billing_phone: String,
    pub billing_address_line_1: String,
    pub billing_address_line_2: String,
    pub billing_city: String,
    pub billing_state: String,
    pub billing_postal_code: String,
    pub billing_country: String,
    pub notes: String,
}

/// An order as returned by the orders endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub subtotal: Price,
    #[serde(default)]
    pub tax_amount: Price,
    #[serde(default)]
    pub shipping_amount: Price,
    pub total_amount: Price,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /orders/{id}/payment/`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    pub payment_method: PaymentMethod,
}

/// State of a simulated payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Payment record embedded in the payment response.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// Response of `POST /orders/{id}/payment/`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentReceipt {
    #[serde(default)]
    pub message: String,
    pub payment: Payment,
}

/// List responses arrive either paginated (`{"results": [...]}`) or as a
/// bare array, depending on the endpoint. Both shapes parse to a vec.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paginated { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListResponse<T> {
    /// Flatten to the contained items.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Paginated { results } => results,
            Self::Plain(items) => items,
        }
    }
}
