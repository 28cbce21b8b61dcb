//! Application context shared by every front end.

use std::sync::Arc;

use akario_core::{Role, User};
use secrecy::SecretString;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::api::ApiClient;
use crate::auth::AuthStore;
use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::checkout::{Checkout, PaymentWidget};
use crate::config::StorefrontConfig;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::notify::Notifier;
use crate::session::{FileStorage, SessionStorage};
use crate::wishlist::WishlistStore;

/// Every store wired to one gateway, one notifier and one session.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    notifier: Arc<Notifier>,
    auth: Arc<AuthStore>,
    cart: Arc<CartStore>,
    wishlist: Arc<WishlistStore>,
    catalog: Catalog,
    dashboard: Dashboard,
}

impl Storefront {
    /// Build the stores over `storage`. Nothing is loaded until
    /// [`Storefront::start`].
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: Arc<dyn SessionStorage>) -> Self {
        let api = ApiClient::new(&config.api);
        let notifier = Arc::new(Notifier::new(config.notification_ttl));
        let auth = Arc::new(AuthStore::new(
            api.clone(),
            storage,
            Arc::clone(&notifier),
        ));
        let cart = Arc::new(CartStore::new(
            api.clone(),
            Arc::clone(&auth),
            Arc::clone(&notifier),
        ));
        let wishlist = Arc::new(WishlistStore::new(
            api.clone(),
            Arc::clone(&auth),
            Arc::clone(&notifier),
        ));
        let catalog = Catalog::new(api.clone(), Arc::clone(&auth));
        let dashboard = Dashboard::new(api.clone(), Arc::clone(&auth));

        Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                notifier,
                auth,
                cart,
                wishlist,
                catalog,
                dashboard,
            }),
        }
    }

    /// Build the stores over the session file in the configured state
    /// directory.
    #[must_use]
    pub fn with_file_storage(config: StorefrontConfig) -> Self {
        let storage = Arc::new(FileStorage::new(config.session_file()));
        Self::new(config, storage)
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.inner.notifier
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<AuthStore> {
        &self.inner.auth
    }

    #[must_use]
    pub fn cart(&self) -> &Arc<CartStore> {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &Arc<WishlistStore> {
        &self.inner.wishlist
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn dashboard(&self) -> &Dashboard {
        &self.inner.dashboard
    }

    /// A checkout over the shared cart, paying through `widget`.
    #[must_use]
    pub fn checkout<W: PaymentWidget>(&self, widget: W) -> Checkout<W> {
        Checkout::new(
            self.inner.api.clone(),
            Arc::clone(&self.inner.auth),
            Arc::clone(&self.inner.cart),
            self.inner.config.checkout.clone(),
            widget,
        )
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Restore the persisted session and load the per-user stores.
    #[instrument(skip(self))]
    pub async fn start(&self) -> bool {
        let restored = self.inner.auth.hydrate();
        self.reload().await;
        restored
    }

    /// Reload the cart and wishlist for the current session.
    pub async fn reload(&self) {
        tokio::join!(self.inner.cart.load(), self.inner.wishlist.load());
    }

    /// Sign in, then load the account's cart and wishlist.
    ///
    /// # Errors
    ///
    /// Same as [`AuthStore::login`]; the stores are untouched on failure.
    pub async fn login(&self, email: &str, password: &SecretString, role: Role) -> Result<User> {
        let user = self.inner.auth.login(email, password, role).await?;
        self.reload().await;
        Ok(user)
    }

    /// Create an account, sign in and load its (empty) stores.
    ///
    /// # Errors
    ///
    /// Same as [`AuthStore::register`].
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
        role: Role,
    ) -> Result<User> {
        let user = self
            .inner
            .auth
            .register(name, email, password, role)
            .await?;
        self.reload().await;
        Ok(user)
    }

    /// Sign out and drop the per-user stores.
    ///
    /// # Errors
    ///
    /// Same as [`AuthStore::logout`]; the stores are reset regardless.
    pub fn logout(&self) -> Result<()> {
        let result = self.inner.auth.logout();
        self.inner.cart.reset();
        self.inner.wishlist.reset();
        result
    }

    /// Reset the per-user stores whenever the session ends, including a
    /// forced sign-out after the backend refuses the token.
    #[must_use = "dropping the handle does not stop the watcher"]
    pub fn spawn_session_watcher(&self) -> JoinHandle<()> {
        let mut changes = self.inner.auth.subscribe();
        let cart = Arc::clone(&self.inner.cart);
        let wishlist = Arc::clone(&self.inner.wishlist);
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let authenticated = *changes.borrow_and_update();
                if !authenticated {
                    debug!("Session ended; resetting cart and wishlist");
                    cart.reset();
                    wishlist.reset();
                }
            }
        })
    }
}
