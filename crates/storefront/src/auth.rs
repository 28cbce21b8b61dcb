//! Auth store: who is signed in, persisted across restarts.
//!
//! The store is either anonymous or holds a [`Session`]. Every transition
//! writes through to durable storage, and observers can watch the
//! authenticated flag to reload per-user state.

use std::sync::{Arc, PoisonError, RwLock};

use akario_core::{Email, Role, User};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::api::types::{AuthPayload, ProfileUpdate};
use crate::error::{Result, StorefrontError};
use crate::notify::{NotificationKind, Notifier};
use crate::session::{Session, SessionStorage};

/// Holds the current session and keeps durable storage in step with it.
pub struct AuthStore {
    api: ApiClient,
    storage: Arc<dyn SessionStorage>,
    notifier: Arc<Notifier>,
    session: RwLock<Option<Session>>,
    authenticated: watch::Sender<bool>,
}

impl AuthStore {
    /// Create an anonymous store. Call [`AuthStore::hydrate`] to pick up a
    /// persisted session.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn SessionStorage>, notifier: Arc<Notifier>) -> Self {
        let (authenticated, _) = watch::channel(false);
        Self {
            api,
            storage,
            notifier,
            session: RwLock::new(None),
            authenticated,
        }
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// The current session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.session().map(|s| s.user)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.user.role)
    }

    /// The bearer token, unless the session has none.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
            .filter(|t| !t.expose_secret().is_empty())
    }

    /// Watch the authenticated flag.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    fn replace(&self, session: Option<Session>) {
        let authenticated = session.is_some();
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
        self.authenticated.send_replace(authenticated);
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Restore the persisted session.
    ///
    /// Anything short of a complete, parseable session leaves the store
    /// anonymous and silently purges whatever partial state was stored.
    /// Returns whether a session was restored.
    #[instrument(skip(self))]
    pub fn hydrate(&self) -> bool {
        match Session::load(self.storage.as_ref()) {
            Ok(Some(session)) => {
                info!(user_id = %session.user.id, role = %session.user.role, "Session restored");
                self.replace(Some(session));
                return true;
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Session storage unreadable"),
        }

        if let Err(e) = Session::purge(self.storage.as_ref()) {
            warn!(error = %e, "Failed to purge partial session");
        }
        self.replace(None);
        false
    }

    /// Sign in and persist the session. Clears the gateway cache.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed email, `Network` if the backend
    /// is unreachable, `Rejected` with the backend's message if it refuses,
    /// and `Storage` if the session cannot be persisted.
    #[instrument(skip(self, password), fields(email = %email, role = %role))]
    pub async fn login(&self, email: &str, password: &SecretString, role: Role) -> Result<User> {
        let email = Email::parse(email).map_err(|e| StorefrontError::Validation(e.to_string()))?;
        let response = self.api.login(email.as_str(), password, role).await;
        self.accept_auth_response(&response, "Login failed")
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Same as [`AuthStore::login`].
    #[instrument(skip(self, password), fields(email = %email, role = %role))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
        role: Role,
    ) -> Result<User> {
        if name.trim().is_empty() {
            return Err(StorefrontError::Validation("Name is required".to_string()));
        }
        let email = Email::parse(email).map_err(|e| StorefrontError::Validation(e.to_string()))?;
        let response = self
            .api
            .register(name.trim(), email.as_str(), password, role)
            .await;
        self.accept_auth_response(&response, "Registration failed")
    }

    fn accept_auth_response(
        &self,
        response: &crate::api::ApiResponse,
        fallback: &str,
    ) -> Result<User> {
        if response.is_transport_failure() {
            return Err(StorefrontError::Network);
        }
        if !response.success {
            // 401 here means bad credentials, not an expired session
            return Err(StorefrontError::Rejected {
                status: response.status,
                message: response.message().unwrap_or(fallback).to_string(),
            });
        }
        let payload: AuthPayload = response.decode()?;
        let user = payload.data.clone();
        self.establish(payload.data, payload.token)?;
        Ok(user)
    }

    /// Adopt a session obtained elsewhere and persist it.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the session cannot be written; the store stays
    /// unchanged in that case.
    pub fn establish(&self, user: User, token: impl Into<String>) -> Result<()> {
        let session = Session::new(user, token);
        session.save(self.storage.as_ref())?;
        info!(user_id = %session.user.id, role = %session.user.role, "Signed in");
        self.replace(Some(session));
        Ok(())
    }

    /// Sign out: forget the session in memory and in storage.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the stored keys cannot be removed. The in-memory
    /// session is cleared regardless.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        self.replace(None);
        info!("Signed out");
        Session::purge(self.storage.as_ref())?;
        Ok(())
    }

    /// Forced sign-out after the backend refused the session token.
    pub fn expire(&self) {
        if !self.is_authenticated() {
            return;
        }
        warn!("Backend rejected the session token; signing out");
        if let Err(e) = self.logout() {
            warn!(error = %e, "Failed to purge expired session");
        }
        self.notifier.show_modal(
            "Session expired",
            "Your session has expired. Please log in again.",
            NotificationKind::Warning,
        );
    }

    /// Update the signed-in account's profile and adopt the returned user.
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired` when anonymous, `Unauthorized` (after a
    /// forced sign-out) if the token is refused, and the response's error
    /// otherwise.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let Some(token) = self.token() else {
            return Err(StorefrontError::LoginRequired);
        };
        let response = self.api.update_profile(update, &token).await;
        if response.is_unauthorized() {
            self.expire();
        }
        let user: User = response.into_result()?.decode_data()?;
        self.establish(user.clone(), token.expose_secret())?;
        Ok(user)
    }
}
