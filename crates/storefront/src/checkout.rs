//! The three-step checkout wizard.
//!
//! Shipping → Payment → Review, then a single submission that creates
//! the order and processes payment. Totals shown along the way are a
//! client-side estimate; the backend recomputes them authoritatively
//! when the order is created.

use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument};

use easel_core::{PaymentMethod, Price};

use crate::api::ApiClient;
use crate::api::types::{CreateOrderRequest, Order, PaymentReceipt};
use crate::config::CheckoutRates;
use crate::error::ClientError;
use crate::models::User;
use crate::stores::CartStore;

/// Errors raised by the checkout wizard itself (as opposed to the
/// backend rejecting the order or payment).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Required shipping fields are blank; names the offenders.
    #[error("missing required shipping fields: {}", .0.join(", "))]
    MissingShippingFields(Vec<&'static str>),

    /// Submission attempted before reaching the review step.
    #[error("checkout can only be submitted from the review step")]
    NotAtReview,

    /// There is nothing to order.
    #[error("cannot check out an empty cart")]
    EmptyCart,
}

/// The wizard's steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Payment,
    Review,
}

impl CheckoutStep {
    /// 1-based position, for "step N of 3" displays.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Shipping => 1,
            Self::Payment => 2,
            Self::Review => 3,
        }
    }
}

/// Shipping address fields. All strings; the backend validates formats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingFields {
    /// Names of required fields that are currently blank.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        let required: [(&'static str, &str); 8] = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address_line_1", &self.address_line_1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
        ];
        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Billing address fields, same shape as shipping.
pub type BillingFields = ShippingFields;

/// Everything the user fills in across the three steps.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub shipping: ShippingFields,
    pub billing: BillingFields,
    billing_same_as_shipping: bool,
    pub payment_method: PaymentMethod,
    pub notes: String,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            shipping: ShippingFields {
                country: "India".to_owned(),
                ..ShippingFields::default()
            },
            billing: BillingFields {
                country: "India".to_owned(),
                ..BillingFields::default()
            },
            billing_same_as_shipping: true,
            payment_method: PaymentMethod::default(),
            notes: String::new(),
        }
    }
}

impl OrderDraft {
    /// A draft seeded from the signed-in user's contact details.
    #[must_use]
    pub fn prefilled_from(user: &User) -> Self {
        let mut draft = Self::default();
        draft.shipping.first_name = user.first_name.clone();
        draft.shipping.last_name = user.last_name.clone();
        draft.shipping.email = user.email.to_string();
        draft.shipping.phone = user.phone.clone().unwrap_or_default();
        draft
    }

    /// Whether billing mirrors shipping.
    #[must_use]
    pub const fn billing_same_as_shipping(&self) -> bool {
        self.billing_same_as_shipping
    }

    /// Set the billing-same-as-shipping flag. Turning it on copies the
    /// current shipping fields into billing once; later shipping edits
    /// are not tracked live but are re-copied at submission while the
    /// flag stays on. Turning it off leaves billing as last copied, for
    /// the user to edit.
    pub fn set_billing_same_as_shipping(&mut self, same: bool) {
        if same && !self.billing_same_as_shipping {
            self.billing = self.shipping.clone();
        }
        self.billing_same_as_shipping = same;
    }

    /// Reconcile billing with shipping and produce the order request
    /// body. Called at submission so the backend always sees billing
    /// equal to shipping when the flag is set.
    pub fn finalize(&mut self) -> CreateOrderRequest {
        if self.billing_same_as_shipping {
            self.billing = self.shipping.clone();
        }
        CreateOrderRequest {
            shipping_first_name: self.shipping.first_name.clone(),
            shipping_last_name: self.shipping.last_name.clone(),
            shipping_email: self.shipping.email.clone(),
            shipping_phone: self.shipping.phone.clone(),
            shipping_address_line_1: self.shipping.address_line_1.clone(),
            shipping_address_line_2: self.shipping.address_line_2.clone(),
            shipping_city: self.shipping.city.clone(),
            shipping_state: self.shipping.state.clone(),
            shipping_postal_code: self.shipping.postal_code.clone(),
            shipping_country: self.shipping.country.clone(),
            billing_first_name: self.billing.first_name.clone(),
            billing_last_name: self.billing.last_name.clone(),
            billing_email: self.billing.email.clone(),
            billing_phone: self.billing.phone.clone(),
            billing_address_line_1: self.billing.address_line_1.clone(),
            billing_address_line_2: self.billing.address_line_2.clone(),
            billing_city: self.billing.city.clone(),
            billing_state: self.billing.state.clone(),
            billing_postal_code: self.billing.postal_code.clone(),
            billing_country: self.billing.country.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Client-side order total estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Price,
    pub tax: Price,
    pub shipping: Price,
    pub total: Price,
}

impl Totals {
    /// Compute the estimate for a subtotal under the given rates.
    ///
    /// Shipping is free only strictly above the threshold; a subtotal
    /// exactly at the threshold still pays the flat fee.
    #[must_use]
    pub fn compute(subtotal: Price, rates: &CheckoutRates) -> Self {
        let tax = Price::new(subtotal.amount() * rates.tax_rate);
        let shipping = if subtotal > rates.free_shipping_threshold {
            Price::ZERO
        } else {
            rates.shipping_flat_fee
        };
        Self {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }
}

/// The order and payment receipt returned by a successful submission.
#[derive(Debug, Clone)]
pub struct CheckoutConfirmation {
    pub order: Order,
    pub receipt: PaymentReceipt,
}

/// The checkout wizard: step navigation plus the final submission.
#[derive(Debug, Default)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    pub draft: OrderDraft,
    rates: CheckoutRates,
}

impl CheckoutFlow {
    /// Start at the shipping step with an empty draft.
    #[must_use]
    pub fn new(rates: CheckoutRates) -> Self {
        Self {
            step: CheckoutStep::Shipping,
            draft: OrderDraft::default(),
            rates,
        }
    }

    /// Start with a draft seeded from the signed-in user.
    #[must_use]
    pub fn for_user(rates: CheckoutRates, user: &User) -> Self {
        Self {
            step: CheckoutStep::Shipping,
            draft: OrderDraft::prefilled_from(user),
            rates,
        }
    }

    /// The current step.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Advance one step. Leaving Shipping requires the required address
    /// fields to be filled in; Review is the last step and `next` there
    /// is a no-op (submission is explicit).
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingShippingFields`] naming the blank
    /// required fields.
    pub fn next(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.step = match self.step {
            CheckoutStep::Shipping => {
                let missing = self.draft.shipping.missing_required();
                if !missing.is_empty() {
                    return Err(CheckoutError::MissingShippingFields(missing));
                }
                CheckoutStep::Payment
            }
            CheckoutStep::Payment | CheckoutStep::Review => CheckoutStep::Review,
        };
        Ok(self.step)
    }

    /// Go back one step; a no-op at Shipping.
    pub fn prev(&mut self) -> CheckoutStep {
        self.step = match self.step {
            CheckoutStep::Shipping | CheckoutStep::Payment => CheckoutStep::Shipping,
            CheckoutStep::Review => CheckoutStep::Payment,
        };
        self.step
    }

    /// The estimate for the given subtotal. Callers pass the server
    /// cart's `total_amount` when available, or the local cart subtotal.
    #[must_use]
    pub fn totals(&self, subtotal: Price) -> Totals {
        Totals::compute(subtotal, &self.rates)
    }

    /// Submit the order: create it, then process payment, then clear the
    /// cart. Order creation strictly precedes payment; if either call
    /// fails the flow aborts and the cart is left intact, so the user
    /// can retry.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotAtReview`] or
    /// [`CheckoutError::EmptyCart`] before any network call, and the API
    /// error if the backend rejects the order or the payment.
    #[instrument(skip_all, fields(step = self.step.number()))]
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        token: &SecretString,
        cart: &mut CartStore,
    ) -> Result<CheckoutConfirmation, ClientError> {
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::NotAtReview.into());
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }

        let request = self.draft.finalize();
        let order = api.create_order(token, &request).await?;
        let receipt = api
            .process_payment(token, &order.id, self.draft.payment_method)
            .await?;

        cart.clear();
        info!(order_id = %order.id, order_number = %order.order_number, "checkout complete");
        Ok(CheckoutConfirmation { order, receipt })
    }
}
