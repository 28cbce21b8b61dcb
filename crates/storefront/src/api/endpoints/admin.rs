use akario_core::UserId;
use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use crate::api::cache::Resource;
use crate::api::{ApiClient, ApiResponse};

// =============================================================================
// Admin Methods
// =============================================================================

impl ApiClient {
    /// `GET /api/users/admin`: every account.
    #[instrument(skip(self, token))]
    pub async fn admin_users(&self, token: &SecretString) -> ApiResponse {
        self.request(Method::GET, "/api/users/admin", None, Some(token))
            .await
    }

    /// `GET /api/users/admin/sellers`.
    #[instrument(skip(self, token))]
    pub async fn admin_sellers(&self, token: &SecretString) -> ApiResponse {
        self.request(Method::GET, "/api/users/admin/sellers", None, Some(token))
            .await
    }

    /// `DELETE /api/users/admin/:id`.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId, token: &SecretString) -> ApiResponse {
        let response = self
            .request(
                Method::DELETE,
                &format!("/api/users/admin/{id}"),
                None,
                Some(token),
            )
            .await;
        self.invalidate_resource(Resource::Accounts).await;
        response
    }

    /// `PUT /api/users/admin/:id/block`.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn block_user(&self, id: &UserId, token: &SecretString) -> ApiResponse {
        self.set_blocked(id, "block", token).await
    }

    /// `PUT /api/users/admin/:id/unblock`.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn unblock_user(&self, id: &UserId, token: &SecretString) -> ApiResponse {
        self.set_blocked(id, "unblock", token).await
    }

    async fn set_blocked(&self, id: &UserId, action: &str, token: &SecretString) -> ApiResponse {
        let response = self
            .request(
                Method::PUT,
                &format!("/api/users/admin/{id}/{action}"),
                None,
                Some(token),
            )
            .await;
        self.invalidate_resource(Resource::Accounts).await;
        response
    }

    /// `GET /api/activities`: the admin audit trail.
    #[instrument(skip(self, token))]
    pub async fn activities(&self, token: &SecretString) -> ApiResponse {
        self.request(Method::GET, "/api/activities", None, Some(token))
            .await
    }
}
