//! Account identity returned by login and registration.

use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::role::Role;

/// The signed-in account, as returned under `data` by the auth endpoints and
/// persisted alongside the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Decoding failure for a user document without any id.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("user record has neither `_id` nor `id`")]
pub struct MissingUserId;

#[derive(Deserialize)]
struct UserRecord {
    #[serde(rename = "_id", default)]
    mongo_id: Option<UserId>,
    #[serde(default)]
    id: Option<UserId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Role,
}

impl TryFrom<UserRecord> for User {
    type Error = MissingUserId;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.mongo_id.or(record.id).ok_or(MissingUserId)?,
            name: record.name.unwrap_or_default(),
            email: record.email.unwrap_or_default(),
            role: record.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_backend_user() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Meera",
            "email": "meera@example.com",
            "role": "seller",
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(user.id.as_str(), "u1");
        assert_eq!(user.role, Role::Seller);
    }

    #[test]
    fn test_missing_role_defaults_to_user() {
        let user: User = serde_json::from_value(json!({"id": "u2"})).unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_roundtrip_through_storage_format() {
        let user = User {
            id: UserId::new("u3"),
            name: "Kabir".into(),
            email: "kabir@example.com".into(),
            role: Role::Admin,
        };
        let stored = serde_json::to_string(&user).unwrap();
        assert!(stored.contains("\"_id\":\"u3\""));
        assert_eq!(serde_json::from_str::<User>(&stored).unwrap(), user);
    }
}
