//! Role-based access to dashboard pages.

use akario_core::Role;

use crate::auth::AuthStore;
use crate::error::{Result, StorefrontError};

/// Decision for one page visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Anonymous visitor; send them to the login page.
    LoginRequired { message: String },
    /// Signed in with a role the page does not allow; send them to their
    /// own dashboard.
    Redirect {
        role: Role,
        to: &'static str,
        message: String,
    },
}

impl Access {
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// The decision as an operation error.
    ///
    /// # Errors
    ///
    /// `LoginRequired` for anonymous sessions, `AccessDenied` for other roles.
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Granted => Ok(()),
            Self::LoginRequired { .. } => Err(StorefrontError::LoginRequired),
            Self::Redirect { role, .. } => Err(StorefrontError::AccessDenied(role)),
        }
    }
}

/// Decide whether the current session may open a page reserved for
/// `allowed` roles.
#[must_use]
pub fn authorize(auth: &AuthStore, allowed: &[Role]) -> Access {
    check(auth.role(), allowed)
}

fn check(role: Option<Role>, allowed: &[Role]) -> Access {
    match role {
        None => Access::LoginRequired {
            message: "Please log in to access this page".to_string(),
        },
        Some(role) if allowed.contains(&role) => Access::Granted,
        Some(role) => Access::Redirect {
            role,
            to: role.dashboard_path(),
            message: format!(
                "You don't have permission to access this page. You are logged in as {role}."
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_must_log_in() {
        assert!(matches!(
            check(None, &[Role::User]),
            Access::LoginRequired { .. }
        ));
    }

    #[test]
    fn test_allowed_role_granted() {
        assert!(check(Some(Role::Admin), &[Role::Admin, Role::Seller]).is_granted());
    }

    #[test]
    fn test_decision_as_error() {
        assert!(check(Some(Role::Admin), Role::STAFF).into_result().is_ok());
        assert!(matches!(
            check(None, Role::STAFF).into_result(),
            Err(StorefrontError::LoginRequired)
        ));
        assert!(matches!(
            check(Some(Role::User), Role::STAFF).into_result(),
            Err(StorefrontError::AccessDenied(Role::User))
        ));
    }

    #[test]
    fn test_other_role_redirected_to_own_dashboard() {
        assert_eq!(
            check(Some(Role::Seller), &[Role::Admin]),
            Access::Redirect {
                role: Role::Seller,
                to: "/seller/dashboard",
                message: "You don't have permission to access this page. You are logged in as seller."
                    .to_string(),
            }
        );
    }
}
