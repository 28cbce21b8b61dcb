//! Wishlist store. Same remote-first policy as the cart, without quantities.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use akario_core::{Product, ProductId, Wishlist};
use secrecy::SecretString;
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiResponse};
use crate::auth::AuthStore;
use crate::error::{Result, StorefrontError};
use crate::notify::{NotificationKind, Notifier};
use crate::sync::{RequestSequence, WriteOutcome};

/// Saved products, mirrored from the server when signed in.
pub struct WishlistStore {
    api: ApiClient,
    auth: Arc<AuthStore>,
    notifier: Arc<Notifier>,
    wishlist: RwLock<Wishlist>,
    sequence: RequestSequence,
}

impl WishlistStore {
    #[must_use]
    pub fn new(api: ApiClient, auth: Arc<AuthStore>, notifier: Arc<Notifier>) -> Self {
        Self {
            api,
            auth,
            notifier,
            wishlist: RwLock::new(Wishlist::new()),
            sequence: RequestSequence::new(),
        }
    }

    #[must_use]
    pub fn wishlist(&self) -> Wishlist {
        self.wishlist
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<Product> {
        self.wishlist
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
            .to_vec()
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.wishlist
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    #[must_use]
    pub fn is_unsynced(&self) -> bool {
        self.sequence.is_unsynced()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.sequence.is_busy()
    }

    fn write(&self) -> RwLockWriteGuard<'_, Wishlist> {
        self.wishlist
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, wishlist: Wishlist) {
        *self.write() = wishlist;
        self.sequence.mark_synced();
    }

    fn server_wishlist(response: &ApiResponse) -> Result<Wishlist> {
        if !response.success {
            return Err(response.to_error());
        }
        response.decode_data()
    }

    fn check_unauthorized(&self, err: &StorefrontError) {
        if matches!(err, StorefrontError::Unauthorized) {
            self.auth.expire();
        }
    }

    fn remote_token(&self) -> Option<SecretString> {
        if self.auth.is_authenticated() {
            self.auth.token()
        } else {
            None
        }
    }

    fn notify(&self, message: &str) {
        self.notifier
            .show_modal("Success", message, NotificationKind::Success);
    }

    /// Save `product`. Adding a product already saved changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired` or `AccessDenied` without touching the
    /// wishlist. If the server write fails the product is saved locally
    /// anyway and the failure is still returned.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&self, product: Product) -> Result<WriteOutcome> {
        let Some(role) = self.auth.role() else {
            self.notifier.show_modal(
                "Login Required",
                "Please login to add items to your wishlist",
                NotificationKind::Warning,
            );
            return Err(StorefrontError::LoginRequired);
        };
        if !role.can_purchase() {
            self.notifier.show_modal(
                "Access Denied",
                "Only users can add products to wishlist. Admins and sellers cannot purchase products.",
                NotificationKind::Error,
            );
            return Err(StorefrontError::AccessDenied(role));
        }

        let Some(token) = self.auth.token() else {
            self.write().add(product);
            self.notify("Item added to wishlist successfully!");
            return Ok(WriteOutcome::Local);
        };

        let ticket = self.sequence.begin();
        let response = self.api.add_to_wishlist(&product.id, &token).await;

        match Self::server_wishlist(&response) {
            Ok(wishlist) => {
                if ticket.is_current() {
                    self.replace(wishlist);
                } else {
                    debug!(ticket = ticket.id(), "Dropping superseded wishlist response");
                }
                self.notify("Item added to wishlist successfully!");
                Ok(WriteOutcome::Synced)
            }
            Err(err) => {
                warn!(error = %err, "Remote wishlist add failed; saving locally");
                if ticket.is_current() {
                    self.write().add(product);
                    self.sequence.mark_unsynced();
                }
                let message = match &err {
                    StorefrontError::Rejected { message, .. } => message.clone(),
                    _ => "Failed to add product to wishlist".to_string(),
                };
                self.notifier
                    .show_modal("Error", message, NotificationKind::Error);
                self.check_unauthorized(&err);
                Err(err)
            }
        }
    }

    /// Remove the product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: &ProductId) -> WriteOutcome {
        let Some(token) = self.remote_token() else {
            self.write().remove(id);
            self.notify("Item removed from wishlist successfully!");
            return WriteOutcome::Local;
        };

        let ticket = self.sequence.begin();
        let response = self.api.remove_from_wishlist(id, &token).await;

        if !ticket.is_current() {
            return WriteOutcome::Superseded;
        }

        match Self::server_wishlist(&response) {
            Ok(wishlist) => {
                self.replace(wishlist);
                self.notify("Item removed from wishlist successfully!");
                WriteOutcome::Synced
            }
            Err(StorefrontError::Rejected { message, .. }) => {
                self.notifier.show_modal(
                    "Error",
                    "Failed to remove item from wishlist",
                    NotificationKind::Error,
                );
                WriteOutcome::Rejected(message)
            }
            Err(err) => {
                warn!(error = %err, "Remote wishlist remove failed; removing locally");
                self.write().remove(id);
                self.sequence.mark_unsynced();
                self.notifier.show_modal(
                    "Error",
                    "Failed to remove item from wishlist",
                    NotificationKind::Error,
                );
                self.check_unauthorized(&err);
                WriteOutcome::FellBack
            }
        }
    }

    /// Remove everything.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> WriteOutcome {
        let Some(token) = self.remote_token() else {
            self.write().clear();
            return WriteOutcome::Local;
        };

        let ticket = self.sequence.begin();
        let response = self.api.clear_wishlist(&token).await;

        if !ticket.is_current() {
            return WriteOutcome::Superseded;
        }

        let cleared = if response.success && response.data().is_none_or(serde_json::Value::is_null) {
            Ok(Wishlist::new())
        } else {
            Self::server_wishlist(&response)
        };

        match cleared {
            Ok(wishlist) => {
                self.replace(wishlist);
                WriteOutcome::Synced
            }
            Err(StorefrontError::Rejected { message, .. }) => {
                warn!(%message, "Wishlist clear refused");
                WriteOutcome::Rejected(message)
            }
            Err(err) => {
                warn!(error = %err, "Remote wishlist clear failed; clearing locally");
                self.write().clear();
                self.sequence.mark_unsynced();
                self.check_unauthorized(&err);
                WriteOutcome::FellBack
            }
        }
    }

    /// Replace the wishlist with the server's, or empty it.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        let Some(token) = self.remote_token() else {
            self.reset();
            return;
        };

        let ticket = self.sequence.begin();
        let response = self.api.wishlist(&token).await;

        if !ticket.is_current() {
            debug!(ticket = ticket.id(), "Dropping superseded wishlist load");
            return;
        }

        match Self::server_wishlist(&response) {
            Ok(wishlist) => self.replace(wishlist),
            Err(err) => {
                warn!(error = %err, "Failed to load wishlist; starting empty");
                self.replace(Wishlist::new());
                self.check_unauthorized(&err);
            }
        }
    }

    /// Drop all local state.
    pub fn reset(&self) {
        self.sequence.supersede();
        self.replace(Wishlist::new());
    }
}
