use thiserror::Error;

/// Main error type for PBX API operations
///
/// Only session-level problems surface here: missing or rejected
/// credentials, unknown operation names, and transport failures.
/// Per-request HTTP and application failures come back as
/// [`ApiResponse`](crate::response::ApiResponse) values instead, so
/// callers iterating over many resources can inspect and continue.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials or tokens are missing, or the authentication
    /// endpoint answered with something other than JSON
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// A dynamically dispatched operation name did not match any of the
    /// recognized verb prefixes
    #[error("unknown operation: {name}")]
    UnknownOperation { name: String },

    /// A request failure promoted to an error by the caller
    #[error("request failed: {message}")]
    Request { status: u16, message: String },

    /// HTTP client error (connectivity, TLS, or an error status on the
    /// authentication endpoints)
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl ApiError {
    /// Create a new authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        ApiError::Authentication {
            message: message.into(),
        }
    }

    /// Check if this error is an authentication failure
    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication { .. })
    }

    /// Check if this error is a network-level connectivity failure
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Http(e) if e.is_connect() || e.is_timeout())
    }
}

/// Result type for PBX API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_error() {
        let error = ApiError::authentication("no refresh token available");
        assert!(error.is_authentication());
        assert_eq!(
            error.to_string(),
            "authentication failed: no refresh token available"
        );
    }

    #[test]
    fn test_unknown_operation_names_offender() {
        let error = ApiError::UnknownOperation {
            name: "foo_bar".to_string(),
        };
        assert!(!error.is_authentication());
        assert_eq!(error.to_string(), "unknown operation: foo_bar");
    }

    #[test]
    fn test_request_error_display() {
        let error = ApiError::Request {
            status: 404,
            message: "HTTP 404: Not Found".to_string(),
        };
        assert_eq!(error.to_string(), "request failed: HTTP 404: Not Found");
    }
}
