//! The uniform result of every gateway call.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::StorefrontError;

const NETWORK_ERROR: &str = "Network error";

/// Outcome of a backend call.
///
/// Transport problems never surface as Rust errors from the gateway; they
/// come back as an unsuccessful response without a status, so callers
/// handle "the backend said no" and "the backend was unreachable" through
/// the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// The body's boolean `success` when present, else the HTTP outcome.
    pub success: bool,
    /// HTTP status, absent on transport failure.
    pub status: Option<u16>,
    /// Parsed JSON body.
    pub payload: Value,
}

impl ApiResponse {
    /// The response reported when the backend could not be reached or sent
    /// something other than JSON.
    #[must_use]
    pub fn network_error() -> Self {
        Self {
            success: false,
            status: None,
            payload: json!({ "success": false, "message": NETWORK_ERROR }),
        }
    }

    /// Build from an HTTP status and parsed body.
    #[must_use]
    pub fn from_http(status: u16, payload: Value) -> Self {
        let http_ok = (200..300).contains(&status);
        let success = payload
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(http_ok);
        Self {
            success,
            status: Some(status),
            payload,
        }
    }

    /// Whether the request never got an answer.
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        self.status.is_none()
    }

    /// Whether the backend refused the session token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    /// The backend's `message` (or `error`) text.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.payload
            .get("message")
            .or_else(|| self.payload.get("error"))
            .and_then(Value::as_str)
    }

    /// The `data` member of the body.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.payload.get("data")
    }

    /// Decode the `data` member.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Decode` if `data` is missing or has the
    /// wrong shape.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, StorefrontError> {
        let data = self
            .data()
            .ok_or_else(|| StorefrontError::Decode("response has no data".to_string()))?;
        T::deserialize(data).map_err(|e| StorefrontError::Decode(e.to_string()))
    }

    /// Decode the first present member among `fields`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Decode` if none is present or the first
    /// present one has the wrong shape.
    pub fn decode_first<T: DeserializeOwned>(&self, fields: &[&str]) -> Result<T, StorefrontError> {
        let value = fields
            .iter()
            .find_map(|f| self.payload.get(*f).filter(|v| !v.is_null()))
            .ok_or_else(|| {
                StorefrontError::Decode(format!("response has none of {}", fields.join(", ")))
            })?;
        T::deserialize(value).map_err(|e| StorefrontError::Decode(e.to_string()))
    }

    /// Decode a list from the first present member among `fields`; an empty
    /// list when none is present.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Decode` if the member is not a list of `T`.
    pub fn decode_list<T: DeserializeOwned>(
        &self,
        fields: &[&str],
    ) -> Result<Vec<T>, StorefrontError> {
        let Some(value) = fields
            .iter()
            .find_map(|f| self.payload.get(*f).filter(|v| !v.is_null()))
        else {
            return Ok(Vec::new());
        };
        Vec::<T>::deserialize(value).map_err(|e| StorefrontError::Decode(e.to_string()))
    }

    /// Decode the whole body.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Decode` if the body has the wrong shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StorefrontError> {
        T::deserialize(&self.payload).map_err(|e| StorefrontError::Decode(e.to_string()))
    }

    /// The error this response stands for, whether or not it succeeded.
    #[must_use]
    pub fn to_error(&self) -> StorefrontError {
        if self.is_transport_failure() {
            StorefrontError::Network
        } else if self.is_unauthorized() {
            StorefrontError::Unauthorized
        } else {
            StorefrontError::Rejected {
                status: self.status,
                message: self.message().unwrap_or("Request failed").to_string(),
            }
        }
    }

    /// Pass successful responses through and turn failures into errors.
    ///
    /// # Errors
    ///
    /// Returns the error from [`ApiResponse::to_error`] when unsuccessful.
    pub fn into_result(self) -> Result<Self, StorefrontError> {
        if self.success {
            Ok(self)
        } else {
            Err(self.to_error())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_shape() {
        let response = ApiResponse::network_error();
        assert!(!response.success);
        assert!(response.is_transport_failure());
        assert_eq!(response.message(), Some("Network error"));
        assert!(matches!(response.to_error(), StorefrontError::Network));
    }

    #[test]
    fn test_body_success_overrides_status() {
        let response = ApiResponse::from_http(200, json!({"success": false, "message": "No"}));
        assert!(!response.success);
        assert!(matches!(
            response.to_error(),
            StorefrontError::Rejected { status: Some(200), ref message } if message == "No"
        ));

        let response = ApiResponse::from_http(404, json!({"success": true}));
        assert!(response.success);
    }

    #[test]
    fn test_status_used_without_body_flag() {
        assert!(ApiResponse::from_http(201, json!({"data": []})).success);
        assert!(!ApiResponse::from_http(500, json!({})).success);
    }

    #[test]
    fn test_unauthorized() {
        let response = ApiResponse::from_http(401, json!({"message": "jwt expired"}));
        assert!(response.is_unauthorized());
        assert!(matches!(
            response.into_result(),
            Err(StorefrontError::Unauthorized)
        ));
    }

    #[test]
    fn test_error_message_falls_back_to_error_field() {
        let response = ApiResponse::from_http(400, json!({"error": "Out of stock"}));
        assert_eq!(response.message(), Some("Out of stock"));
    }

    #[test]
    fn test_decode_list_missing_is_empty() {
        let response = ApiResponse::from_http(200, json!({"success": true, "users": [1, 2]}));
        assert_eq!(response.decode_list::<u8>(&["data", "users"]).unwrap(), [1, 2]);
        assert!(response.decode_list::<u8>(&["sellers"]).unwrap().is_empty());
        assert!(response.decode_list::<String>(&["users"]).is_err());
    }

    #[test]
    fn test_decode_first() {
        let response = ApiResponse::from_http(200, json!({"users": [1, 2], "data": null}));
        let values: Vec<u8> = response.decode_first(&["data", "users"]).unwrap();
        assert_eq!(values, vec![1, 2]);
        assert!(response.decode_data::<Vec<u8>>().is_err());
    }
}
