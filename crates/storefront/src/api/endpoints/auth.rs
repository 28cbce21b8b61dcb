use akario_core::Role;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use crate::api::{ApiClient, ApiResponse};

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
    role: Role,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: Role,
}

// =============================================================================
// Auth Methods
// =============================================================================

impl ApiClient {
    /// `POST /api/auth/login`. Clears the whole cache first: a new session
    /// must not see the previous one's reads.
    #[instrument(skip(self, password), fields(email = %email, role = %role))]
    pub async fn login(&self, email: &str, password: &SecretString, role: Role) -> ApiResponse {
        self.invalidate_all().await;
        let body = LoginBody {
            email,
            password: password.expose_secret(),
            role,
        };
        self.request_json(Method::POST, "/api/auth/login", &body, None)
            .await
    }

    /// `POST /api/auth/register`. Clears the cache like [`ApiClient::login`].
    #[instrument(skip(self, password), fields(email = %email, role = %role))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
        role: Role,
    ) -> ApiResponse {
        self.invalidate_all().await;
        let body = RegisterBody {
            name,
            email,
            password: password.expose_secret(),
            role,
        };
        self.request_json(Method::POST, "/api/auth/register", &body, None)
            .await
    }
}
