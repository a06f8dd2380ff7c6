use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::client::{create_pbx_client, Config};
use crate::error::{ApiError, Result};
use crate::operation::{Call, Operation, Verb};
use crate::response::ApiResponse;
use crate::token::Token;

/// A session against one PBX server.
///
/// The session owns the bearer token state and performs blocking HTTP
/// calls with transparent recovery from token expiry: a 401 answer, or
/// the legacy `status: "expired"` body some endpoints send on 200,
/// triggers one token renewal and one resend of the original request.
///
/// Token renewal mutates session state without internal locking; a
/// session shared across threads must be serialized externally.
pub struct Session {
    /// HTTP client
    client: Client,
    /// Configuration
    config: Config,
    /// Current token pair
    token: Token,
}

impl Session {
    /// Create a session for the given host with default settings
    /// (HTTPS, certificate verification off)
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_config(Config::new(host))
    }

    /// Create a session with custom configuration
    pub fn with_config(config: Config) -> Self {
        let client = create_pbx_client(config.verify_tls);
        Session {
            client,
            config,
            token: Token::default(),
        }
    }

    /// The session configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The current token pair
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Resolve an endpoint path against the session's base URL
    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.config.base_url())?;
        Ok(base.join(path)?)
    }

    /// Authenticate with the PBX and store the issued token pair.
    ///
    /// Returns the full parsed response body; an empty body yields an
    /// empty map and leaves the session without tokens. A body that is
    /// not a JSON object fails hard with an authentication error
    /// carrying a snippet of the raw response, as do HTTP error
    /// statuses on the endpoint itself; nothing else on the session
    /// works without a token, so there is no soft path here.
    pub fn authenticate(&mut self, username: &str, password: &str) -> Result<Map<String, Value>> {
        let url = self.endpoint("authenticate")?;
        let response = self
            .client
            .post(url)
            .form(&[("user", username), ("password", password)])
            .send()?
            .error_for_status()?;

        let text = response.text()?;
        let body = parse_credential_body(&text)?;

        self.token = Token::from_body(&body);
        if self.token.access_token.is_some() {
            debug!(host = %self.config.host, "authenticated against PBX");
        }
        Ok(body)
    }

    /// Exchange the current token pair for a fresh one.
    ///
    /// The PBX only honors renewal when both tokens are presented, so a
    /// session that never authenticated fails hard. When the server
    /// answers `status: "authorized"` both tokens are replaced; any
    /// other answer is returned untouched and the session keeps its
    /// current tokens, which the caller must treat as a failed renewal.
    pub fn renew_token(&mut self) -> Result<ApiResponse> {
        let (access, refresh) = match (&self.token.access_token, &self.token.refresh_token) {
            (Some(access), Some(refresh)) => (access.clone(), refresh.clone()),
            _ => {
                return Err(ApiError::authentication(
                    "no refresh token or access token available, authenticate first",
                ))
            }
        };

        let url = self.endpoint("authenticate/renewtoken")?;
        let mut request = self.client.get(url).query(&[
            ("refresh_token", refresh.as_str()),
            ("access_token", access.as_str()),
        ]);
        if let Some(bearer) = self.token.bearer() {
            request = request.header("Authorization", bearer);
        }
        let response = request.send()?.error_for_status()?;
        let text = response.text()?;

        let parsed = ApiResponse::from_body(&text);
        if parsed.get_str("status") == Some("authorized") {
            if let Some(body) = parsed.object() {
                self.token = Token::from_body(body);
            }
            debug!("access token renewed");
        } else {
            warn!("token renewal was not authorized by the server");
        }
        Ok(parsed)
    }

    /// Dispatch one CRUD call against a named resource.
    ///
    /// This is the generic primitive behind the verb wrappers: the path
    /// comes from the resource name plus the envelope's id segment, the
    /// body from the envelope's payload with the reload flag merged into
    /// a copy, and every request carries a JSON content type and the
    /// current bearer token.
    ///
    /// Expiry recovery: a 401, or a 200 whose body reports
    /// `status: "expired"`, triggers one [`renew_token`](Self::renew_token)
    /// and one resend. The two checks are mutually exclusive and at most
    /// one resend happens per call; whatever the resend returns is
    /// final, so a second rejection comes back as
    /// [`ApiResponse::Failure`].
    pub fn request(&mut self, verb: Verb, resource: &str, call: Call) -> Result<ApiResponse> {
        let path = call.path(resource);
        let url = self.endpoint(&path)?;
        let body = call.body_for(verb);

        let (status, text) = self.exchange(verb, &url, body.as_ref(), &call.query)?;

        if status == StatusCode::UNAUTHORIZED {
            debug!(resource = %path, "server answered 401, renewing token");
            self.renew_token()?;
            let (status, text) = self.exchange(verb, &url, body.as_ref(), &call.query)?;
            return Ok(ApiResponse::from_http(status, text));
        }

        if status == StatusCode::OK && body_reports_expired(&text) {
            debug!(resource = %path, "server reports an expired token, renewing");
            self.renew_token()?;
            let (status, text) = self.exchange(verb, &url, body.as_ref(), &call.query)?;
            return Ok(ApiResponse::from_http(status, text));
        }

        Ok(ApiResponse::from_http(status, text))
    }

    /// Run one HTTP exchange and read the full body
    fn exchange(
        &self,
        verb: Verb,
        url: &Url,
        body: Option<&Map<String, Value>>,
        query: &[(String, String)],
    ) -> Result<(StatusCode, String)> {
        let mut request = self
            .client
            .request(verb.method(), url.clone())
            .header("Content-Type", "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(bearer) = self.token.bearer() {
            request = request.header("Authorization", bearer);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let start = Instant::now();
        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;

        debug!(
            method = %verb.method(),
            url = %url,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pbx api exchange"
        );
        Ok((status, text))
    }

    /// Fetch all records of a resource, or one record when an id is
    /// given, optionally restricting the returned fields
    pub fn get(&mut self, resource: &str, id: Option<&str>, fields: &[&str]) -> Result<ApiResponse> {
        let mut call = Call::new();
        if let Some(id) = id {
            call = call.id(id);
        }
        if !fields.is_empty() {
            call = call.fields(fields.iter().copied());
        }
        self.request(Verb::Get, resource, call)
    }

    /// Create a record; with `reload` on, the PBX applies the
    /// configuration change immediately
    pub fn create(
        &mut self,
        resource: &str,
        data: &Map<String, Value>,
        reload: bool,
    ) -> Result<ApiResponse> {
        self.request(Verb::Create, resource, Call::new().data(data).reload(reload))
    }

    /// Update an existing record
    pub fn update(
        &mut self,
        resource: &str,
        id: &str,
        data: &Map<String, Value>,
        reload: bool,
    ) -> Result<ApiResponse> {
        self.request(
            Verb::Update,
            resource,
            Call::new().id(id).data(data).reload(reload),
        )
    }

    /// Delete one or more records; several ids collapse into a single
    /// comma separated path segment
    pub fn delete(&mut self, resource: &str, ids: &[&str], reload: bool) -> Result<ApiResponse> {
        self.request(
            Verb::Delete,
            resource,
            Call::new().ids(ids.iter().copied()).reload(reload),
        )
    }

    /// Search a resource for a term, optionally restricting the
    /// returned fields
    pub fn search(&mut self, resource: &str, term: &str, fields: &[&str]) -> Result<ApiResponse> {
        let mut call = Call::new();
        if !fields.is_empty() {
            call = call.fields(fields.iter().copied());
        }
        self.request(Verb::Get, &format!("{}/search/{}", resource, term), call)
    }

    /// Resolve a conventional operation name such as `get_extensions`
    /// or `delete_ringgroups` and dispatch it.
    ///
    /// Behaves exactly like [`request`](Self::request) with the parsed
    /// verb and resource; names outside the four verb prefixes fail
    /// with [`ApiError::UnknownOperation`].
    pub fn invoke(&mut self, name: &str, call: Call) -> Result<ApiResponse> {
        let operation: Operation = name.parse()?;
        self.request(operation.verb, &operation.resource, call)
    }
}

/// Parse the body of an authentication response: empty bodies count as
/// empty, anything that is not a JSON object is a hard failure
fn parse_credential_body(text: &str) -> Result<Map<String, Value>> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ApiError::authentication(format!(
            "server returned a non-JSON response: {}",
            snippet(text)
        ))),
    }
}

/// Legacy signaling convention: some endpoints answer 200 with a body
/// whose `status` field reads `"expired"` instead of a proper 401
fn body_reports_expired(text: &str) -> bool {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => value.get("status").and_then(Value::as_str) == Some("expired"),
        Err(_) => false,
    }
}

/// Truncate diagnostic output to its first 200 characters
fn snippet(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
