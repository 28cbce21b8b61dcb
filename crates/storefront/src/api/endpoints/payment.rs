use akario_core::{CurrencyCode, Price};
use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use tracing::instrument;

use crate::api::types::PaymentConfirmation;
use crate::api::{ApiClient, ApiResponse};

#[derive(Serialize)]
struct OrderBody {
    amount: Price,
    currency: &'static str,
}

// =============================================================================
// Payment Methods
// =============================================================================

impl ApiClient {
    /// `POST /api/payment/order {amount, currency}`, answered with
    /// `{success, order: {id, amount, currency}}`.
    #[instrument(skip(self, token), fields(amount = %amount, currency = currency.code()))]
    pub async fn create_payment_order(
        &self,
        amount: Price,
        currency: CurrencyCode,
        token: Option<&SecretString>,
    ) -> ApiResponse {
        let body = OrderBody {
            amount,
            currency: currency.code(),
        };
        self.request_json(Method::POST, "/api/payment/order", &body, token)
            .await
    }

    /// `POST /api/payment/verify` with the provider's signed fields.
    #[instrument(skip_all, fields(order_id = %confirmation.razorpay_order_id))]
    pub async fn verify_payment(
        &self,
        confirmation: &PaymentConfirmation,
        token: Option<&SecretString>,
    ) -> ApiResponse {
        self.request_json(Method::POST, "/api/payment/verify", confirmation, token)
            .await
    }
}
