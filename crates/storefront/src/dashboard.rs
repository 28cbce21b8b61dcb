//! Dashboard data: admin account management, the activity trail and contact
//! messages.
//!
//! Unlike the cart and wishlist these reads are not mirrored locally; every
//! call goes through the gateway (and its cache) and returns decoded rows.

use std::sync::Arc;

use akario_core::{ContactId, Role, UserId};
use secrecy::SecretString;
use tracing::{info, instrument};

use crate::api::types::{Activity, ContactMessage, ContactRecord, UserSummary};
use crate::api::{ApiClient, ApiResponse};
use crate::auth::AuthStore;
use crate::error::{Result, StorefrontError};
use crate::guard;

/// Role-gated dashboard operations for the signed-in account.
pub struct Dashboard {
    api: ApiClient,
    auth: Arc<AuthStore>,
}

impl Dashboard {
    #[must_use]
    pub const fn new(api: ApiClient, auth: Arc<AuthStore>) -> Self {
        Self { api, auth }
    }

    /// Token of a session whose role is in `allowed`.
    fn token_for(&self, allowed: &[Role]) -> Result<SecretString> {
        guard::authorize(&self.auth, allowed).into_result()?;
        self.auth.token().ok_or(StorefrontError::LoginRequired)
    }

    fn checked(&self, response: ApiResponse) -> Result<ApiResponse> {
        if response.is_unauthorized() {
            self.auth.expire();
        }
        response.into_result()
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Shopper accounts. Sellers and admins in the listing are left out.
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired`/`AccessDenied` unless signed in as admin, and
    /// the backend's error otherwise.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Vec<UserSummary>> {
        let token = self.token_for(&[Role::Admin])?;
        let response = self.checked(self.api.admin_users(&token).await)?;
        let users: Vec<UserSummary> = response.decode_list(&["data", "users"])?;
        Ok(users.into_iter().filter(|u| u.role == Role::User).collect())
    }

    /// # Errors
    ///
    /// Same as [`Dashboard::users`].
    #[instrument(skip(self))]
    pub async fn sellers(&self) -> Result<Vec<UserSummary>> {
        let token = self.token_for(&[Role::Admin])?;
        self.checked(self.api.admin_sellers(&token).await)?
            .decode_list(&["data", "sellers"])
    }

    /// Block or unblock an account.
    ///
    /// # Errors
    ///
    /// Same as [`Dashboard::users`].
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn set_blocked(&self, id: &UserId, blocked: bool) -> Result<()> {
        let token = self.token_for(&[Role::Admin])?;
        let response = if blocked {
            self.api.block_user(id, &token).await
        } else {
            self.api.unblock_user(id, &token).await
        };
        self.checked(response)?;
        info!(blocked, "Account block state changed");
        Ok(())
    }

    /// # Errors
    ///
    /// Same as [`Dashboard::users`].
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<()> {
        let token = self.token_for(&[Role::Admin])?;
        self.checked(self.api.delete_user(id, &token).await)?;
        info!("Account deleted");
        Ok(())
    }

    /// The admin audit trail.
    ///
    /// # Errors
    ///
    /// Same as [`Dashboard::users`].
    #[instrument(skip(self))]
    pub async fn activities(&self) -> Result<Vec<Activity>> {
        let token = self.token_for(&[Role::Admin])?;
        self.checked(self.api.activities(&token).await)?
            .decode_list(&["data", "activities"])
    }

    // =========================================================================
    // Contact
    // =========================================================================

    /// Send a contact message, signed in or not.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if a field is blank, and the backend's error
    /// otherwise.
    #[instrument(skip(self, message), fields(subject = %message.subject))]
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<()> {
        if [&message.name, &message.email, &message.subject, &message.message]
            .iter()
            .any(|f| f.trim().is_empty())
        {
            return Err(StorefrontError::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }
        let token = self.auth.token();
        self.checked(self.api.send_contact_message(message, token.as_ref()).await)?;
        Ok(())
    }

    /// The signed-in user's messages with any replies.
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired` when anonymous, and the backend's error
    /// otherwise.
    #[instrument(skip(self))]
    pub async fn my_messages(&self) -> Result<Vec<ContactRecord>> {
        let token = self.token_for(&[Role::User, Role::Seller, Role::Admin])?;
        self.checked(self.api.user_contact_messages(&token).await)?
            .decode_list(&["data"])
    }

    /// Messages waiting for a seller.
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired`/`AccessDenied` unless signed in as seller or
    /// admin, and the backend's error otherwise.
    #[instrument(skip(self))]
    pub async fn seller_messages(&self) -> Result<Vec<ContactRecord>> {
        let token = self.token_for(&[Role::Seller, Role::Admin])?;
        self.checked(self.api.seller_contact_messages(&token).await)?
            .decode_list(&["data"])
    }

    /// Messages the seller has already answered.
    ///
    /// # Errors
    ///
    /// Same as [`Dashboard::seller_messages`].
    #[instrument(skip(self))]
    pub async fn seller_responses(&self) -> Result<Vec<ContactRecord>> {
        let token = self.token_for(&[Role::Seller, Role::Admin])?;
        self.checked(self.api.seller_contact_responses(&token).await)?
            .decode_list(&["data"])
    }

    /// Reply to a contact message.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank reply, otherwise the same as
    /// [`Dashboard::seller_messages`].
    #[instrument(skip(self, reply), fields(contact_id = %id))]
    pub async fn respond(&self, id: &ContactId, reply: &str) -> Result<()> {
        let token = self.token_for(&[Role::Seller, Role::Admin])?;
        if reply.trim().is_empty() {
            return Err(StorefrontError::Validation(
                "Response message is required".to_string(),
            ));
        }
        self.checked(self.api.respond_to_contact(id, reply.trim(), &token).await)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Same as [`Dashboard::seller_messages`].
    #[instrument(skip(self), fields(contact_id = %id))]
    pub async fn delete_message(&self, id: &ContactId) -> Result<()> {
        let token = self.token_for(&[Role::Seller, Role::Admin])?;
        self.checked(self.api.delete_contact_message(id, &token).await)?;
        Ok(())
    }
}
