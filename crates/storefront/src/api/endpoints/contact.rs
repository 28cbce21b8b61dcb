use akario_core::ContactId;
use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use tracing::instrument;

use crate::api::cache::Resource;
use crate::api::types::ContactMessage;
use crate::api::{ApiClient, ApiResponse};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyBody<'a> {
    response_message: &'a str,
}

// =============================================================================
// Contact Methods
// =============================================================================

impl ApiClient {
    /// `POST /api/contact`. Anonymous visitors may write too.
    #[instrument(skip(self, message, token), fields(subject = %message.subject))]
    pub async fn send_contact_message(
        &self,
        message: &ContactMessage,
        token: Option<&SecretString>,
    ) -> ApiResponse {
        let response = self
            .request_json(Method::POST, "/api/contact", message, token)
            .await;
        self.invalidate_resource(Resource::UserContact).await;
        response
    }

    /// `GET /api/contact/user`: the signed-in user's messages and replies.
    #[instrument(skip(self, token))]
    pub async fn user_contact_messages(&self, token: &SecretString) -> ApiResponse {
        self.request(Method::GET, "/api/contact/user", None, Some(token))
            .await
    }

    // =========================================================================
    // Seller Contact Methods
    // =========================================================================

    /// `GET /api/seller/contact`.
    #[instrument(skip(self, token))]
    pub async fn seller_contact_messages(&self, token: &SecretString) -> ApiResponse {
        self.request(Method::GET, "/api/seller/contact", None, Some(token))
            .await
    }

    /// `POST /api/seller/contact/:id/response {responseMessage}`.
    #[instrument(skip(self, reply, token), fields(contact_id = %id))]
    pub async fn respond_to_contact(
        &self,
        id: &ContactId,
        reply: &str,
        token: &SecretString,
    ) -> ApiResponse {
        let body = ReplyBody {
            response_message: reply,
        };
        let response = self
            .request_json(
                Method::POST,
                &format!("/api/seller/contact/{id}/response"),
                &body,
                Some(token),
            )
            .await;
        self.invalidate_resource(Resource::SellerContact).await;
        response
    }

    /// `GET /api/seller/contact/responses`.
    #[instrument(skip(self, token))]
    pub async fn seller_contact_responses(&self, token: &SecretString) -> ApiResponse {
        self.request(
            Method::GET,
            "/api/seller/contact/responses",
            None,
            Some(token),
        )
        .await
    }

    /// `DELETE /api/seller/contact/:id`.
    #[instrument(skip(self, token), fields(contact_id = %id))]
    pub async fn delete_contact_message(&self, id: &ContactId, token: &SecretString) -> ApiResponse {
        let response = self
            .request(
                Method::DELETE,
                &format!("/api/seller/contact/{id}"),
                None,
                Some(token),
            )
            .await;
        self.invalidate_resource(Resource::SellerContact).await;
        response
    }
}
