//! User-facing notifications: short-lived toasts and a single modal.
//!
//! The [`Notifier`] is an owned object created with the application context
//! and handed to every store through an `Arc`, so tests get a fresh one per
//! store instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A toast. Expires on its own after the notifier's TTL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub raised_at: Instant,
}

/// The blocking dialog. At most one exists; a new one replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub open: bool,
}

/// Queue of toasts plus the current modal.
#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    next_id: AtomicU64,
    toasts: Mutex<Vec<Notification>>,
    modal: Mutex<Option<Modal>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

impl Notifier {
    /// Create a notifier whose toasts live for `ttl`.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: AtomicU64::new(0),
            toasts: Mutex::new(Vec::new()),
            modal: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Raise a toast. Returns its id.
    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        self.notify_at(message, kind, Instant::now())
    }

    /// Raise a toast stamped with `now`.
    pub fn notify_at(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        now: Instant,
    ) -> u64 {
        let message = message.into();
        log(kind, "toast", &message);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        self.prune(&mut toasts, now);
        toasts.push(Notification {
            id,
            message,
            kind,
            raised_at: now,
        });
        id
    }

    fn prune(&self, toasts: &mut Vec<Notification>, now: Instant) {
        toasts.retain(|t| now.saturating_duration_since(t.raised_at) < self.ttl);
    }

    /// Remove a toast before it expires. Returns whether it was still there.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        let before = toasts.len();
        toasts.retain(|t| t.id != id);
        toasts.len() != before
    }

    /// Live toasts in arrival order.
    pub fn active(&self) -> Vec<Notification> {
        self.active_at(Instant::now())
    }

    /// Live toasts as of `now`; expired ones are dropped.
    pub fn active_at(&self, now: Instant) -> Vec<Notification> {
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        self.prune(&mut toasts, now);
        toasts.clone()
    }

    /// Open a modal, replacing any current one.
    pub fn show_modal(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) {
        let modal = Modal {
            title: title.into(),
            message: message.into(),
            kind,
            open: true,
        };
        log(kind, &modal.title, &modal.message);
        *self.modal.lock().unwrap_or_else(PoisonError::into_inner) = Some(modal);
    }

    /// Close the current modal, keeping its content.
    pub fn close_modal(&self) {
        if let Some(modal) = self
            .modal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            modal.open = false;
        }
    }

    /// The current modal, open or closed.
    pub fn modal(&self) -> Option<Modal> {
        self.modal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current modal if it is open.
    pub fn open_modal(&self) -> Option<Modal> {
        self.modal().filter(|m| m.open)
    }
}

fn log(kind: NotificationKind, title: &str, message: &str) {
    match kind {
        NotificationKind::Success => info!(kind = %kind, title, message, "Notification"),
        NotificationKind::Error | NotificationKind::Warning => {
            warn!(kind = %kind, title, message, "Notification");
        }
    }
}
