//! Checkout: order summary, shipping details and the payment round trip.
//!
//! A submission moves through `Submitting` (provider order created on the
//! backend), `PaymentPending` (the payment widget collects the payment) and
//! `Verifying` (the backend checks the provider's signature). Only a
//! verified payment empties the cart. Any failure parks the flow in
//! `Error` until the shopper edits or submits again.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use akario_core::{PaymentOrderId, Price, Role};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::api::ApiClient;
use crate::api::types::{PaymentConfirmation, PaymentOrder};
use crate::auth::AuthStore;
use crate::cart::CartStore;
use crate::config::CheckoutConfig;
use crate::error::{Result, StorefrontError};
use crate::format::format_currency;
use crate::sync::WriteOutcome;

/// Merchant name shown by the payment widget.
pub const MERCHANT_NAME: &str = "Akario Mart";

/// Purchase description shown by the payment widget.
pub const PURCHASE_DESCRIPTION: &str = "Product Purchase";

// =============================================================================
// Shipping
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Razorpay,
}

/// Delivery and contact details entered at checkout. Every field is
/// required.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub payment_method: PaymentMethod,
}

impl ShippingDetails {
    /// Whether every field has non-blank content.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            &self.full_name,
            &self.email,
            &self.phone,
            &self.address,
            &self.city,
            &self.state,
            &self.zip_code,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    /// Single-line address passed to the payment provider as a note.
    #[must_use]
    pub fn notes_address(&self) -> String {
        format!(
            "{}, {}, {} - {}",
            self.address.trim(),
            self.city.trim(),
            self.state.trim(),
            self.zip_code.trim()
        )
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Subtotal, tax and total, each rounded to two places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    pub subtotal: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderSummary {
    #[must_use]
    pub fn new(subtotal: Price, tax_rate: Decimal) -> Self {
        let tax = (subtotal * tax_rate).round_cents();
        Self {
            subtotal,
            tax,
            total: (subtotal + tax).round_cents(),
        }
    }
}

// =============================================================================
// Payment widget
// =============================================================================

/// Customer fields pre-filled in the payment widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Everything the payment widget needs to collect one payment.
#[derive(Debug, Clone)]
pub struct WidgetRequest {
    pub key_id: SecretString,
    pub order: PaymentOrder,
    pub merchant: &'static str,
    pub description: &'static str,
    pub prefill: Prefill,
    pub notes_address: String,
}

/// Collects a payment for a provider order and hands back the provider's
/// signed confirmation.
///
/// An `Err` carries the provider's failure description, which may be empty.
pub trait PaymentWidget {
    fn collect(
        &self,
        request: &WidgetRequest,
    ) -> impl Future<Output = std::result::Result<PaymentConfirmation, String>> + Send;
}

// =============================================================================
// State
// =============================================================================

/// Result of a verified payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlaced {
    pub order_id: PaymentOrderId,
    pub payment_id: String,
    pub total: Price,
    /// Page to show once the confirmation has been displayed.
    pub redirect_to: &'static str,
    pub redirect_after: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Editing,
    Submitting,
    PaymentPending,
    Verifying,
    Placed(OrderPlaced),
    Error(String),
}

impl CheckoutState {
    /// Whether a submission is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Submitting | Self::PaymentPending | Self::Verifying)
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// One checkout session over the shared cart.
pub struct Checkout<W> {
    api: ApiClient,
    auth: Arc<AuthStore>,
    cart: Arc<CartStore>,
    config: CheckoutConfig,
    widget: W,
    state: Mutex<CheckoutState>,
}

impl<W: PaymentWidget> Checkout<W> {
    #[must_use]
    pub fn new(
        api: ApiClient,
        auth: Arc<AuthStore>,
        cart: Arc<CartStore>,
        config: CheckoutConfig,
        widget: W,
    ) -> Self {
        Self {
            api,
            auth,
            cart,
            config,
            widget,
            state: Mutex::new(CheckoutState::Editing),
        }
    }

    #[must_use]
    pub fn state(&self) -> CheckoutState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_state(&self, state: CheckoutState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Return to `Editing` after an error.
    pub fn edit(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*state, CheckoutState::Error(_)) {
            *state = CheckoutState::Editing;
        }
    }

    /// Details with the signed-in shopper's name and email filled in.
    #[must_use]
    pub fn prefilled_details(&self) -> ShippingDetails {
        let mut details = ShippingDetails::default();
        if let Some(user) = self.auth.user() {
            details.full_name = user.name;
            details.email = user.email;
        }
        details
    }

    /// Totals for the current cart.
    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        OrderSummary::new(self.cart.total(), self.config.tax_rate)
    }

    fn fail(&self, err: StorefrontError) -> StorefrontError {
        error!(error = %err, "Checkout failed");
        self.set_state(CheckoutState::Error(err.user_message()));
        err
    }

    /// Claim the flow for a new submission.
    fn start(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_active() {
            return Err(StorefrontError::Validation(
                "A payment is already in progress".to_string(),
            ));
        }
        *state = CheckoutState::Submitting;
        Ok(())
    }

    fn validate(&self, details: &ShippingDetails, summary: &OrderSummary) -> Result<()> {
        match self.auth.role() {
            None => return Err(StorefrontError::LoginRequired),
            Some(role) if role != Role::User => return Err(StorefrontError::AccessDenied(role)),
            Some(_) => {}
        }
        if self.cart.count() == 0 {
            return Err(StorefrontError::Validation("Your cart is empty".to_string()));
        }
        if !details.is_complete() {
            return Err(StorefrontError::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }
        let total = summary.total.amount();
        if total <= Decimal::ZERO || total > self.config.max_amount {
            let max = format_currency(self.config.max_amount);
            return Err(StorefrontError::Validation(format!(
                "Invalid amount: ₹{}. Amount must be between ₹0.01 and {}.",
                total.normalize(),
                max.trim_end_matches(".00")
            )));
        }
        Ok(())
    }

    /// Run the full payment round trip for the current cart.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for incomplete details or an out-of-range total,
    /// `LoginRequired`/`AccessDenied` for sessions that may not buy, and
    /// `Payment` when the order, the widget or the verification fails. The
    /// cart is left untouched on every error.
    #[instrument(skip_all)]
    pub async fn submit(&self, details: &ShippingDetails) -> Result<OrderPlaced> {
        self.start()?;

        let summary = self.summary();
        if let Err(err) = self.validate(details, &summary) {
            return Err(self.fail(err));
        }
        let token = self.auth.token();

        let order = match self.create_order(summary.total, token.as_ref()).await {
            Ok(order) => order,
            Err(err) => return Err(self.fail(err)),
        };
        info!(order_id = %order.id, total = %summary.total, "Payment order created");

        self.set_state(CheckoutState::PaymentPending);
        let Some(key_id) = self.config.razorpay_key_id.clone() else {
            return Err(self.fail(StorefrontError::Payment(
                "Payment gateway is not configured".to_string(),
            )));
        };
        let request = WidgetRequest {
            key_id,
            order: order.clone(),
            merchant: MERCHANT_NAME,
            description: PURCHASE_DESCRIPTION,
            prefill: Prefill {
                name: details.full_name.trim().to_string(),
                email: details.email.trim().to_string(),
                contact: details.phone.trim().to_string(),
            },
            notes_address: details.notes_address(),
        };
        let confirmation = match self.widget.collect(&request).await {
            Ok(confirmation) => confirmation,
            Err(description) => {
                let message = if description.trim().is_empty() {
                    "Payment failed. Please try again.".to_string()
                } else {
                    description
                };
                return Err(self.fail(StorefrontError::Payment(message)));
            }
        };

        self.set_state(CheckoutState::Verifying);
        if let Err(err) = self.verify(&confirmation, token.as_ref()).await {
            return Err(self.fail(err));
        }

        let placed = OrderPlaced {
            order_id: order.id,
            payment_id: confirmation.razorpay_payment_id,
            total: summary.total,
            redirect_to: Role::User.dashboard_path(),
            redirect_after: self.config.redirect_delay,
        };
        match self.cart.clear().await {
            WriteOutcome::Synced | WriteOutcome::Local => {}
            outcome => warn!(?outcome, "Cart not cleared on the server after payment"),
        }
        info!(order_id = %placed.order_id, "Order placed");
        self.set_state(CheckoutState::Placed(placed.clone()));
        Ok(placed)
    }

    async fn create_order(
        &self,
        total: Price,
        token: Option<&SecretString>,
    ) -> Result<PaymentOrder> {
        let response = self
            .api
            .create_payment_order(total, self.config.currency, token)
            .await;
        let order = if response.success {
            response.decode_first::<PaymentOrder>(&["order", "data"])
        } else {
            Err(response.to_error())
        };
        order.map_err(|err| {
            let reason = match err {
                StorefrontError::Rejected { message, .. } => message,
                other => other.to_string(),
            };
            StorefrontError::Payment(format!("Order creation failed: {reason}"))
        })
    }

    async fn verify(
        &self,
        confirmation: &PaymentConfirmation,
        token: Option<&SecretString>,
    ) -> Result<()> {
        let response = self.api.verify_payment(confirmation, token).await;
        if response.is_transport_failure() {
            return Err(StorefrontError::Payment(
                "Payment verification failed. Please try again.".to_string(),
            ));
        }
        if !response.success {
            return Err(StorefrontError::Payment(
                "Payment verification failed. Please contact support.".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn details() -> ShippingDetails {
        ShippingDetails {
            full_name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            phone: "9876543210".into(),
            address: "12 MG Road".into(),
            city: "Pune".into(),
            state: "MH".into(),
            zip_code: "411001".into(),
            payment_method: PaymentMethod::Razorpay,
        }
    }

    #[test]
    fn test_summary_adds_eight_percent_tax() {
        let summary = OrderSummary::new(Price::new(d("1000")), d("0.08"));
        assert_eq!(summary.tax, Price::new(d("80")));
        assert_eq!(summary.total, Price::new(d("1080")));
        assert_eq!(summary.total.to_string(), "1080.00");
    }

    #[test]
    fn test_summary_rounds_tax_to_cents() {
        let summary = OrderSummary::new(Price::new(d("99.99")), d("0.08"));
        assert_eq!(summary.tax, Price::new(d("8.00")));
        assert_eq!(summary.total, Price::new(d("107.99")));

        let summary = OrderSummary::new(Price::new(d("230")), d("0.08"));
        assert_eq!(summary.total, Price::new(d("248.40")));
    }

    #[test]
    fn test_blank_field_is_incomplete() {
        assert!(details().is_complete());
        let mut missing = details();
        missing.zip_code = "   ".into();
        assert!(!missing.is_complete());
    }

    #[test]
    fn test_notes_address() {
        assert_eq!(details().notes_address(), "12 MG Road, Pune, MH - 411001");
    }

    #[test]
    fn test_details_wire_names() {
        let value = serde_json::to_value(details()).unwrap();
        assert_eq!(value["zipCode"], "411001");
        assert_eq!(value["paymentMethod"], "razorpay");
    }

    #[test]
    fn test_active_states() {
        assert!(CheckoutState::Verifying.is_active());
        assert!(!CheckoutState::Error("x".into()).is_active());
        assert!(!CheckoutState::Editing.is_active());
    }
}
