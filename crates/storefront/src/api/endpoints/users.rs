use akario_core::ProductId;
use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use tracing::instrument;

use crate::api::cache::Resource;
use crate::api::types::ProfileUpdate;
use crate::api::{ApiClient, ApiResponse};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartLineBody<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WishlistBody<'a> {
    product_id: &'a ProductId,
}

// =============================================================================
// Cart Methods
// =============================================================================

impl ApiClient {
    /// `GET /api/users/cart`.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &SecretString) -> ApiResponse {
        self.request(Method::GET, "/api/users/cart", None, Some(token))
            .await
    }

    /// `POST /api/users/cart {productId, quantity}`.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
        token: &SecretString,
    ) -> ApiResponse {
        let body = CartLineBody {
            product_id,
            quantity,
        };
        let response = self
            .request_json(Method::POST, "/api/users/cart", &body, Some(token))
            .await;
        self.invalidate_resource(Resource::Cart).await;
        response
    }

    /// `PUT /api/users/cart {productId, quantity}`.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn update_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
        token: &SecretString,
    ) -> ApiResponse {
        let body = CartLineBody {
            product_id,
            quantity,
        };
        let response = self
            .request_json(Method::PUT, "/api/users/cart", &body, Some(token))
            .await;
        self.invalidate_resource(Resource::Cart).await;
        response
    }

    /// `DELETE /api/users/cart/:productId`.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: &ProductId, token: &SecretString) -> ApiResponse {
        let response = self
            .request(
                Method::DELETE,
                &format!("/api/users/cart/{product_id}"),
                None,
                Some(token),
            )
            .await;
        self.invalidate_resource(Resource::Cart).await;
        response
    }

    /// `DELETE /api/users/cart`.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &SecretString) -> ApiResponse {
        let response = self
            .request(Method::DELETE, "/api/users/cart", None, Some(token))
            .await;
        self.invalidate_resource(Resource::Cart).await;
        response
    }

    // =========================================================================
    // Wishlist Methods
    // =========================================================================

    /// `GET /api/users/wishlist`.
    #[instrument(skip(self, token))]
    pub async fn wishlist(&self, token: &SecretString) -> ApiResponse {
        self.request(Method::GET, "/api/users/wishlist", None, Some(token))
            .await
    }

    /// `POST /api/users/wishlist {productId}`.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(&self, product_id: &ProductId, token: &SecretString) -> ApiResponse {
        let body = WishlistBody { product_id };
        let response = self
            .request_json(Method::POST, "/api/users/wishlist", &body, Some(token))
            .await;
        self.invalidate_resource(Resource::Wishlist).await;
        response
    }

    /// `DELETE /api/users/wishlist/:productId`.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        product_id: &ProductId,
        token: &SecretString,
    ) -> ApiResponse {
        let response = self
            .request(
                Method::DELETE,
                &format!("/api/users/wishlist/{product_id}"),
                None,
                Some(token),
            )
            .await;
        self.invalidate_resource(Resource::Wishlist).await;
        response
    }

    /// `DELETE /api/users/wishlist`.
    #[instrument(skip(self, token))]
    pub async fn clear_wishlist(&self, token: &SecretString) -> ApiResponse {
        let response = self
            .request(Method::DELETE, "/api/users/wishlist", None, Some(token))
            .await;
        self.invalidate_resource(Resource::Wishlist).await;
        response
    }

    // =========================================================================
    // Profile Methods
    // =========================================================================

    /// `PUT /api/users/profile`.
    #[instrument(skip(self, update, token))]
    pub async fn update_profile(&self, update: &ProfileUpdate, token: &SecretString) -> ApiResponse {
        self.request_json(Method::PUT, "/api/users/profile", update, Some(token))
            .await
    }
}
