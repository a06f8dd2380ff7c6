use reqwest::blocking::{Client, ClientBuilder};
use std::time::Duration;

/// Create the HTTP client used for PBX API requests
/// with connection pooling and conservative timeouts.
///
/// Certificate verification is scoped to the session that owns the client:
/// PBX installs commonly serve self-signed certificates, so verification
/// stays off unless the configuration asks for it.
pub fn create_pbx_client(verify_tls: bool) -> Client {
    ClientBuilder::new()
        .danger_accept_invalid_certs(!verify_tls)
        .pool_max_idle_per_host(50)
        .timeout(Duration::from_secs(300)) // 5 minutes
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client")
}

/// Configuration for a PBX API session
#[derive(Debug, Clone)]
pub struct Config {
    /// Host name or IP of the PBX server, optionally with a port
    pub host: String,
    /// Use HTTPS when true, plain HTTP otherwise
    pub use_tls: bool,
    /// Verify TLS certificates; off by default for self-signed deployments
    pub verify_tls: bool,
}

impl Config {
    /// Create a configuration for the given host with default settings
    /// (HTTPS on, certificate verification off)
    pub fn new(host: impl Into<String>) -> Self {
        Config {
            host: host.into(),
            use_tls: true,
            verify_tls: false,
        }
    }

    /// Choose between HTTPS and plain HTTP
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Enable TLS certificate verification
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Get the base URL for API requests: `{scheme}://{host}/pbxapi/`
    ///
    /// Trailing slashes on the host are stripped so the path prefix
    /// resolves the same way regardless of how the host was written.
    pub fn base_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}/pbxapi/", scheme, self.host.trim_end_matches('/'))
    }
}
