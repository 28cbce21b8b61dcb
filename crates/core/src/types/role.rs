//! Account roles.

use serde::{Deserialize, Serialize};

/// Role attached to every account by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shopper. The only role allowed to buy.
    #[default]
    User,
    /// Manages their own product listings and answers contact messages.
    Seller,
    /// Manages users and the whole catalog.
    Admin,
}

impl Role {
    /// Roles that run the store side: product listings and contact inboxes.
    pub const STAFF: &'static [Self] = &[Self::Seller, Self::Admin];

    /// Whether this role may fill a cart or wishlist.
    #[must_use]
    pub const fn can_purchase(&self) -> bool {
        matches!(self, Self::User)
    }

    /// Whether this role may create, edit or delete products.
    #[must_use]
    pub fn can_manage_products(&self) -> bool {
        Self::STAFF.contains(self)
    }

    /// Landing page for this role.
    #[must_use]
    pub const fn dashboard_path(&self) -> &'static str {
        match self {
            Self::User => "/user/dashboard",
            Self::Seller => "/seller/dashboard",
            Self::Admin => "/admin/dashboard",
        }
    }

    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known role.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected user, seller or admin)")]
pub struct RoleParseError(pub String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_users_purchase() {
        assert!(Role::User.can_purchase());
        assert!(!Role::Seller.can_purchase());
        assert!(!Role::Admin.can_purchase());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Seller".parse::<Role>().unwrap(), Role::Seller);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Seller).unwrap(), "\"seller\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
