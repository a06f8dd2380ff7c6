use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

/// Outcome of one dispatched PBX API call.
///
/// The PBX wraps nothing: a successful call answers with an arbitrary
/// JSON document. Failures at the HTTP or body level come back as values
/// rather than errors so callers working through many resources can
/// inspect each outcome and continue; only connectivity and
/// authentication problems surface as [`ApiError`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Parsed JSON body of a successful exchange; an empty body parses
    /// to an empty JSON object
    Success(Value),

    /// The server answered with an HTTP error status after the expiry
    /// recovery protocol ran its course
    Failure {
        status: u16,
        message: String,
        body: String,
    },

    /// Success status, but the body was not valid JSON
    Malformed { content: String },
}

impl ApiResponse {
    /// Classify a finished HTTP exchange
    pub(crate) fn from_http(status: StatusCode, text: String) -> Self {
        if status.is_client_error() || status.is_server_error() {
            return ApiResponse::Failure {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("HTTP error")
                    .to_string(),
                body: text,
            };
        }
        Self::from_body(&text)
    }

    /// Parse a response body on a successful status
    pub(crate) fn from_body(text: &str) -> Self {
        if text.trim().is_empty() {
            return ApiResponse::Success(Value::Object(Map::new()));
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => ApiResponse::Success(value),
            Err(_) => ApiResponse::Malformed {
                content: text.to_string(),
            },
        }
    }

    /// Check if the call succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }

    /// Error description for failed calls, `None` on success
    pub fn error(&self) -> Option<&str> {
        match self {
            ApiResponse::Success(_) => None,
            ApiResponse::Failure { message, .. } => Some(message),
            ApiResponse::Malformed { .. } => Some("Invalid JSON response"),
        }
    }

    /// Get the parsed body of a successful call
    pub fn value(&self) -> Option<&Value> {
        match self {
            ApiResponse::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Get the parsed body when it is a JSON object
    pub fn object(&self) -> Option<&Map<String, Value>> {
        self.value().and_then(Value::as_object)
    }

    /// Get a field from a successful object body
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.object().and_then(|map| map.get(key))
    }

    /// Get a string field from a successful object body
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Apply unmarshals a successful body into the provided type.
    ///
    /// Failure and malformed outcomes become [`ApiError::Request`] here,
    /// for callers that prefer `?` over branching on the enum.
    pub fn apply<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        match self {
            ApiResponse::Success(value) => Ok(serde_json::from_value(value.clone())?),
            ApiResponse::Failure {
                status, message, ..
            } => Err(ApiError::Request {
                status: *status,
                message: format!("HTTP {}: {}", status, message),
            }),
            ApiResponse::Malformed { .. } => Err(ApiError::Request {
                status: 200,
                message: "Invalid JSON response".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_empty_body_parses_to_empty_object() {
        let response = ApiResponse::from_http(StatusCode::OK, String::new());
        assert_eq!(response, ApiResponse::Success(json!({})));

        let response = ApiResponse::from_body("  \n");
        assert_eq!(response, ApiResponse::Success(json!({})));
    }

    #[test]
    fn test_error_status_becomes_failure() {
        let response = ApiResponse::from_http(StatusCode::NOT_FOUND, "missing".to_string());
        assert!(!response.is_success());
        assert_eq!(
            response,
            ApiResponse::Failure {
                status: 404,
                message: "Not Found".to_string(),
                body: "missing".to_string(),
            }
        );
        assert_eq!(response.error(), Some("Not Found"));
    }

    #[test]
    fn test_invalid_json_becomes_malformed() {
        let response = ApiResponse::from_http(StatusCode::OK, "<html>busy</html>".to_string());
        assert_eq!(response.error(), Some("Invalid JSON response"));
        match response {
            ApiResponse::Malformed { content } => assert_eq!(content, "<html>busy</html>"),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_array_bodies_are_still_success() {
        let response = ApiResponse::from_body(r#"[{"extension": "2000"}]"#);
        assert!(response.is_success());
        assert_eq!(response.object(), None);
    }

    #[test]
    fn test_field_access_on_object_body() {
        let response = ApiResponse::from_body(r#"{"status": "success", "count": 3}"#);
        assert_eq!(response.get_str("status"), Some("success"));
        assert_eq!(response.get("count"), Some(&json!(3)));
        assert_eq!(response.get("missing"), None);
    }

    #[test]
    fn test_apply_unmarshals_success() {
        #[derive(Debug, Deserialize)]
        struct Extension {
            name: String,
            extension: String,
        }

        let response = ApiResponse::from_body(r#"{"name": "John Doe", "extension": "2000"}"#);
        let ext: Extension = response.apply().expect("apply failed");

        assert_eq!(ext.name, "John Doe");
        assert_eq!(ext.extension, "2000");
    }

    #[test]
    fn test_apply_promotes_failure_to_error() {
        let response = ApiResponse::Failure {
            status: 500,
            message: "Internal Server Error".to_string(),
            body: String::new(),
        };

        match response.apply::<Value>() {
            Err(ApiError::Request { status, message }) => {
                assert_eq!(status, 500);
                assert!(message.contains("Internal Server Error"));
            }
            other => panic!("expected Request error, got {:?}", other),
        }
    }
}
