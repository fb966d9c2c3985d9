//! JSON-RPC endpoint configuration.
//!
//! The endpoint URL is read once at startup. Hosted providers usually embed
//! the API key in the URL path or query, so the `Debug` output keeps only
//! scheme, host, and port.

use url::Url;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to a JSON-RPC endpoint.
#[derive(Clone)]
pub struct RpcConfig {
    /// Full endpoint URL, e.g. `https://mainnet.infura.io/v3/<key>`.
    pub url: Url,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcConfig")
            .field("url", &redacted(&self.url))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl RpcConfig {
    /// Configuration for `url` with the default timeout.
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_url("url", url)?,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ETH_RPC_URL` (required)
    /// - `ETH_RPC_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("ETH_RPC_URL").map_err(|_| ConfigError::MissingUrl)?;
        if raw.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let timeout_secs = match std::env::var("ETH_RPC_TIMEOUT_SECS") {
            Ok(s) => s
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidTimeout(s))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            url: parse_url("ETH_RPC_URL", raw.trim())?,
            timeout_secs,
        })
    }

    /// Endpoint rendering safe for logs.
    pub fn redacted_url(&self) -> String {
        redacted(&self.url)
    }
}

fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(
            var.to_string(),
            format!("unsupported scheme {other:?}; expected http or https"),
        )),
    }
}

fn redacted(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    let hidden = (url.path() != "/" && !url.path().is_empty()) || url.query().is_some();
    let suffix = if hidden { "/[REDACTED]" } else { "/" };
    format!("{}://{host}{port}{suffix}", url.scheme())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ETH_RPC_URL environment variable is required")]
    MissingUrl,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("ETH_RPC_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),
}
