//! Unified error handling for the storefront client.
//!
//! Every store operation returns `Result<T, StorefrontError>`. Read paths
//! mostly swallow failures into an empty state; the error type is what
//! write paths and the checkout flow hand back to the front end.

use akario_core::Role;
use thiserror::Error;

use crate::config::ConfigError;
use crate::session::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The backend could not be reached or answered with something that is
    /// not JSON.
    #[error("Network error")]
    Network,

    /// The backend answered and refused the request.
    #[error("{message}")]
    Rejected {
        status: Option<u16>,
        message: String,
    },

    /// The backend refused the session token.
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// A response arrived but did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The operation needs a signed-in session.
    #[error("Login required")]
    LoginRequired,

    /// The session's role may not perform the operation.
    #[error("Access denied for role {0}")]
    AccessDenied(Role),

    /// Input failed client-side validation.
    #[error("{0}")]
    Validation(String),

    /// The payment provider or verification step failed.
    #[error("Payment failed: {0}")]
    Payment(String),

    /// Durable session storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StorefrontError {
    /// Whether the failure happened before the backend could answer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Message suitable for a notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } | Self::Validation(message) => message.clone(),
            Self::Payment(message) => message.clone(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorefrontError::Rejected {
            status: Some(400),
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(StorefrontError::Network.to_string(), "Network error");
        assert_eq!(
            StorefrontError::AccessDenied(Role::Seller).to_string(),
            "Access denied for role seller"
        );
    }

    #[test]
    fn test_user_message() {
        let err = StorefrontError::Payment("Card declined".to_string());
        assert_eq!(err.to_string(), "Payment failed: Card declined");
        assert_eq!(err.user_message(), "Card declined");
        assert!(StorefrontError::Network.is_transport());
        assert!(!StorefrontError::Unauthorized.is_transport());
    }
}
