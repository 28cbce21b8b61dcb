//! Request and response payloads for the backend REST API.
//!
//! Catalog, cart and wishlist documents decode straight into the
//! `akario-core` types; this module holds the payloads that only the
//! gateway and the dashboards care about.

use akario_core::{ContactId, Discount, PaymentOrderId, Price, Role, User, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Auth Types
// =============================================================================

/// Successful login or registration body: `{token, data: User}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    #[serde(alias = "user")]
    pub data: User,
}

/// Fields accepted by `PUT /api/users/profile`. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// =============================================================================
// Product Management Types
// =============================================================================

/// Body for creating or updating a product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A product photo sent as the multipart `file` field.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Admin Types
// =============================================================================

/// Account row in the admin user and seller listings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_blocked: bool,
}

/// Admin audit trail entry from `GET /api/activities`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Activity {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub admin: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

// =============================================================================
// Contact Types
// =============================================================================

/// Body for `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// A contact message as listed for its author or for sellers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: ContactId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Present once a seller has replied.
    #[serde(default)]
    pub response: Option<ContactReply>,
}

/// A seller's reply to a contact message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactReply {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// Payment Types
// =============================================================================

/// Provider order created by `POST /api/payment/order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: PaymentOrderId,
    /// Amount as the provider reports it, in minor units.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
}

/// Signed fields returned by the payment widget and checked by
/// `POST /api/payment/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_auth_payload_accepts_user_alias() {
        let payload: AuthPayload = serde_json::from_value(json!({
            "token": "t",
            "user": {"_id": "u1", "name": "A", "email": "a@example.com", "role": "user"}
        }))
        .unwrap();
        assert_eq!(payload.data.id.as_str(), "u1");
    }

    #[test]
    fn test_profile_update_omits_unset_fields() {
        let update = ProfileUpdate {
            name: Some("Asha".into()),
            ..ProfileUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"name": "Asha"}));
    }

    #[test]
    fn test_user_summary_blocked_flag() {
        let row: UserSummary = serde_json::from_value(json!({
            "_id": "u9", "name": "B", "email": "b@example.com", "role": "seller", "isBlocked": true
        }))
        .unwrap();
        assert!(row.is_blocked);
        assert_eq!(row.role, Role::Seller);
    }

    #[test]
    fn test_contact_record_with_reply() {
        let record: ContactRecord = serde_json::from_value(json!({
            "_id": "c1",
            "subject": "Late delivery",
            "response": {"name": "Shop", "message": "On its way"}
        }))
        .unwrap();
        assert_eq!(record.response.unwrap().message, "On its way");
    }

    #[test]
    fn test_payment_order_integer_amount() {
        let order: PaymentOrder =
            serde_json::from_value(json!({"id": "order_1", "amount": 108_000, "currency": "INR"}))
                .unwrap();
        assert_eq!(order.amount, Decimal::from(108_000));
    }
}
