//! Cart store.
//!
//! Signed-in shoppers' carts live on the server; every write goes there
//! first and the returned cart replaces the local copy. When the server is
//! unreachable the write is applied locally instead and the cart is marked
//! unsynced. Anonymous visitors cannot add to the cart at all, and sellers
//! and admins are refused.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use akario_core::{Cart, CartLine, Price, Product, ProductId};
use secrecy::SecretString;
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiResponse};
use crate::auth::AuthStore;
use crate::error::{Result, StorefrontError};
use crate::notify::{NotificationKind, Notifier};
use crate::sync::{RequestSequence, WriteOutcome};

/// The shopping cart, mirrored from the server when signed in.
pub struct CartStore {
    api: ApiClient,
    auth: Arc<AuthStore>,
    notifier: Arc<Notifier>,
    cart: RwLock<Cart>,
    sequence: RequestSequence,
}

impl CartStore {
    #[must_use]
    pub fn new(api: ApiClient, auth: Arc<AuthStore>, notifier: Arc<Notifier>) -> Self {
        Self {
            api,
            auth,
            notifier,
            cart: RwLock::new(Cart::new()),
            sequence: RequestSequence::new(),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lines()
            .to_vec()
    }

    /// Sum of effective price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .total()
    }

    /// Number of items.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .count()
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .quantity_of(id)
    }

    /// Whether local changes failed to reach the server.
    #[must_use]
    pub fn is_unsynced(&self) -> bool {
        self.sequence.is_unsynced()
    }

    /// Whether a cart request is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.sequence.is_busy()
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cart> {
        self.cart.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, cart: Cart) {
        *self.write() = cart;
        self.sequence.mark_synced();
    }

    /// Decode the server cart from a successful response.
    fn server_cart(response: &ApiResponse) -> Result<Cart> {
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

    // =========================================================================
    // Writes
    // =========================================================================

    /// Check that the session may buy. Raises the matching modal if not.
    fn purchase_gate(&self) -> Result<Option<SecretString>> {
        let Some(role) = self.auth.role() else {
            self.notifier.show_modal(
                "Login Required",
                "Please login to add items to your cart",
                NotificationKind::Warning,
            );
            return Err(StorefrontError::LoginRequired);
        };
        if !role.can_purchase() {
            self.notifier.show_modal(
                "Access Denied",
                "Sellers and admins cannot purchase products",
                NotificationKind::Error,
            );
            return Err(StorefrontError::AccessDenied(role));
        }
        Ok(self.auth.token())
    }

    /// Add `quantity` of `product` (0 counts as 1).
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired` or `AccessDenied` without touching the cart.
    /// If the server write fails the item is added locally anyway and the
    /// failure is still returned.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&self, product: Product, quantity: u32) -> Result<WriteOutcome> {
        let token = self.purchase_gate()?;
        let quantity = quantity.max(1);

        let Some(token) = token else {
            self.write().merge(product, quantity);
            self.notify_added();
            return Ok(WriteOutcome::Local);
        };

        let ticket = self.sequence.begin();
        let response = self.api.add_to_cart(&product.id, quantity, &token).await;

        match Self::server_cart(&response) {
            Ok(cart) => {
                if ticket.is_current() {
                    self.replace(cart);
                } else {
                    debug!(ticket = ticket.id(), "Dropping superseded cart response");
                }
                self.notify_added();
                Ok(WriteOutcome::Synced)
            }
            Err(err) => {
                warn!(error = %err, "Remote add failed; adding locally");
                if ticket.is_current() {
                    self.write().merge(product, quantity);
                    self.sequence.mark_unsynced();
                }
                let message = match &err {
                    StorefrontError::Rejected { message, .. } => message.clone(),
                    _ => "Failed to add product to cart".to_string(),
                };
                self.notifier
                    .show_modal("Error", message, NotificationKind::Error);
                self.check_unauthorized(&err);
                Err(err)
            }
        }
    }

    fn notify_added(&self) {
        self.notifier.show_modal(
            "Success",
            "Item added to cart successfully!",
            NotificationKind::Success,
        );
    }

    fn notify_removed(&self) {
        self.notifier.show_modal(
            "Success",
            "Item removed from cart successfully!",
            NotificationKind::Success,
        );
    }

    /// Remove the product's line.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: &ProductId) -> WriteOutcome {
        let Some(token) = self.remote_token() else {
            self.write().remove(id);
            self.notify_removed();
            return WriteOutcome::Local;
        };

        let ticket = self.sequence.begin();
        let response = self.api.remove_from_cart(id, &token).await;

        if !ticket.is_current() {
            return WriteOutcome::Superseded;
        }

        match Self::server_cart(&response) {
            Ok(cart) => {
                self.replace(cart);
                self.notify_removed();
                WriteOutcome::Synced
            }
            Err(StorefrontError::Rejected { message, .. }) => {
                self.notifier.show_modal(
                    "Error",
                    "Failed to remove item from cart",
                    NotificationKind::Error,
                );
                WriteOutcome::Rejected(message)
            }
            Err(err) => {
                warn!(error = %err, "Remote remove failed; removing locally");
                self.write().remove(id);
                self.sequence.mark_unsynced();
                self.notifier.show_modal(
                    "Error",
                    "Failed to remove item from cart",
                    NotificationKind::Error,
                );
                self.check_unauthorized(&err);
                WriteOutcome::FellBack
            }
        }
    }

    /// Set the product's quantity; zero or less removes the line.
    ///
    /// Raises no notification unless it turns into a removal.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_quantity(&self, id: &ProductId, quantity: i64) -> WriteOutcome {
        if quantity <= 0 {
            return self.remove(id).await;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let Some(token) = self.remote_token() else {
            self.write().set_quantity(id, quantity);
            return WriteOutcome::Local;
        };

        let ticket = self.sequence.begin();
        let response = self.api.update_cart(id, quantity, &token).await;

        if !ticket.is_current() {
            return WriteOutcome::Superseded;
        }

        match Self::server_cart(&response) {
            Ok(cart) => {
                self.replace(cart);
                WriteOutcome::Synced
            }
            Err(StorefrontError::Rejected { message, .. }) => {
                warn!(%message, "Quantity update refused");
                WriteOutcome::Rejected(message)
            }
            Err(err) => {
                warn!(error = %err, "Remote update failed; updating locally");
                self.write().set_quantity(id, quantity);
                self.sequence.mark_unsynced();
                self.check_unauthorized(&err);
                WriteOutcome::FellBack
            }
        }
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> WriteOutcome {
        let Some(token) = self.remote_token() else {
            self.write().clear();
            return WriteOutcome::Local;
        };

        let ticket = self.sequence.begin();
        let response = self.api.clear_cart(&token).await;

        if !ticket.is_current() {
            return WriteOutcome::Superseded;
        }

        // a cleared cart may come back without data
        let cleared = if response.success && response.data().is_none_or(serde_json::Value::is_null) {
            Ok(Cart::new())
        } else {
            Self::server_cart(&response)
        };

        match cleared {
            Ok(cart) => {
                self.replace(cart);
                WriteOutcome::Synced
            }
            Err(StorefrontError::Rejected { message, .. }) => {
                warn!(%message, "Cart clear refused");
                WriteOutcome::Rejected(message)
            }
            Err(err) => {
                warn!(error = %err, "Remote clear failed; clearing locally");
                self.write().clear();
                self.sequence.mark_unsynced();
                self.check_unauthorized(&err);
                WriteOutcome::FellBack
            }
        }
    }

    /// Token for remote writes: signed in and holding a token.
    fn remote_token(&self) -> Option<SecretString> {
        if self.auth.is_authenticated() {
            self.auth.token()
        } else {
            None
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replace the cart with the server's, or empty it.
    ///
    /// Anonymous sessions and failed fetches both end with an empty cart;
    /// a previously signed-in cart is never kept.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        let Some(token) = self.remote_token() else {
            self.sequence.supersede();
            self.replace(Cart::new());
            return;
        };

        let ticket = self.sequence.begin();
        let response = self.api.cart(&token).await;

        if !ticket.is_current() {
            debug!(ticket = ticket.id(), "Dropping superseded cart load");
            return;
        }

        match Self::server_cart(&response) {
            Ok(cart) => self.replace(cart),
            Err(err) => {
                warn!(error = %err, "Failed to load cart; starting empty");
                self.replace(Cart::new());
                self.check_unauthorized(&err);
            }
        }
    }

    /// Drop all local state, e.g. on sign-out.
    pub fn reset(&self) {
        self.sequence.supersede();
        self.replace(Cart::new());
    }
}
