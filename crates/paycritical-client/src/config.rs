//! Paycritical gateway client configuration.
//!
//! A gateway is configured with exactly two values: the credential sent in
//! the `Authorization` header and the base URL of the POS API. Both are set
//! once and never change for the lifetime of a [`crate::PaymentGateway`].

use url::Url;
use zeroize::Zeroizing;

/// Sandbox POS API, used when `PAYCRITICAL_BASE_URL` is not set.
pub const SANDBOX_BASE_URL: &str = "https://tr05sbx.paycritical.com";

/// Configuration for connecting to the Paycritical gateway.
///
/// Custom `Debug` implementation redacts the `api_key` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Credential sent verbatim as the `Authorization` header. It already
    /// carries its scheme prefix, e.g. `Basic b09Ca2Vl...`.
    pub api_key: Zeroizing<String>,
    /// Base URL of the POS API, e.g. <https://tr05sbx.paycritical.com>.
    pub base_url: Url,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GatewayConfig {
    /// Build a configuration from an explicit credential and base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] for an empty credential,
    /// [`ConfigError::InvalidUrl`] if `base_url` does not parse and
    /// [`ConfigError::UnsupportedBaseUrl`] if it cannot carry a path
    /// (e.g. `mailto:` or `data:` URLs).
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self, ConfigError> {
        let api_key = Zeroizing::new(api_key.into());
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let base_url = parse_base_url("base_url", base_url)?;
        Ok(Self { api_key, base_url })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PAYCRITICAL_API_KEY` (required, including the scheme prefix)
    /// - `PAYCRITICAL_BASE_URL` (default: `https://tr05sbx.paycritical.com`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key =
            std::env::var("PAYCRITICAL_API_KEY").map_err(|_| ConfigError::MissingApiKey)?;
        let raw = std::env::var("PAYCRITICAL_BASE_URL")
            .unwrap_or_else(|_| SANDBOX_BASE_URL.to_string());

        let api_key = Zeroizing::new(api_key);
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self {
            api_key,
            base_url: parse_base_url("PAYCRITICAL_BASE_URL", &raw)?,
        })
    }
}

fn parse_base_url(source: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(source.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::UnsupportedBaseUrl(url.to_string()));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PAYCRITICAL_API_KEY is required")]
    MissingApiKey,
    #[error("API key contains characters that are not valid in an HTTP header")]
    InvalidApiKey,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("base URL {0} cannot carry a request path")]
    UnsupportedBaseUrl(String),
}
