use serde_json::{Map, Value};

/// Token holds the bearer token pair issued by the PBX authentication
/// endpoint. Either half may be missing when the server omits it from
/// its reply; renewal requires both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token {
    /// Access token sent as the `Authorization` bearer value
    pub access_token: Option<String>,

    /// Refresh token presented when renewing an expired access token
    pub refresh_token: Option<String>,
}

impl Token {
    /// Create a new Token from an access/refresh pair
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Token {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// Check if both halves are present, meaning renewal is possible
    pub fn is_renewable(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    /// Value for the `Authorization` header when an access token is held
    pub fn bearer(&self) -> Option<String> {
        self.access_token
            .as_ref()
            .map(|token| format!("Bearer {}", token))
    }

    /// Extract the token pair from an authentication or renewal response
    /// body; fields the server left out become `None`
    pub fn from_body(body: &Map<String, Value>) -> Self {
        Token {
            access_token: body
                .get("access_token")
                .and_then(Value::as_str)
                .map(str::to_owned),
            refresh_token: body
                .get("refresh_token")
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }
}
