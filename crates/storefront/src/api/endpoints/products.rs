use akario_core::ProductId;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use secrecy::SecretString;
use tracing::instrument;

use crate::api::cache::Resource;
use crate::api::types::{PhotoUpload, ProductDraft};
use crate::api::{ApiClient, ApiResponse};

// =============================================================================
// Product Methods
// =============================================================================

impl ApiClient {
    /// `GET /api/products`.
    #[instrument(skip(self))]
    pub async fn products(&self) -> ApiResponse {
        self.request(Method::GET, "/api/products", None, None).await
    }

    /// `GET /api/products/:id`.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> ApiResponse {
        self.request(Method::GET, &format!("/api/products/{id}"), None, None)
            .await
    }

    /// `POST /api/products`.
    #[instrument(skip(self, draft, token), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &ProductDraft, token: &SecretString) -> ApiResponse {
        let response = self
            .request_json(Method::POST, "/api/products", draft, Some(token))
            .await;
        self.invalidate_resource(Resource::Products).await;
        response
    }

    /// `PUT /api/products/:id`.
    #[instrument(skip(self, draft, token), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
        token: &SecretString,
    ) -> ApiResponse {
        let response = self
            .request_json(
                Method::PUT,
                &format!("/api/products/{id}"),
                draft,
                Some(token),
            )
            .await;
        self.invalidate_resource(Resource::Product(id.as_str())).await;
        response
    }

    /// `DELETE /api/products/:id`.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId, token: &SecretString) -> ApiResponse {
        let response = self
            .request(
                Method::DELETE,
                &format!("/api/products/{id}"),
                None,
                Some(token),
            )
            .await;
        self.invalidate_resource(Resource::Product(id.as_str())).await;
        response
    }

    /// `PUT /api/products/:id/photo` as multipart with the image in `file`.
    #[instrument(skip(self, photo, token), fields(product_id = %id, file = %photo.file_name))]
    pub async fn upload_product_photo(
        &self,
        id: &ProductId,
        photo: PhotoUpload,
        token: &SecretString,
    ) -> ApiResponse {
        let part = Part::bytes(photo.bytes).file_name(photo.file_name);
        let form = Form::new().part("file", part);
        let response = self
            .upload(
                Method::PUT,
                &format!("/api/products/{id}/photo"),
                form,
                Some(token),
            )
            .await;
        self.invalidate_resource(Resource::Product(id.as_str())).await;
        response
    }
}
