//! Client configuration
//!
//! `ClientConfig` holds everything needed to construct a client: the
//! identifying User-Agent, the instance base URL, timeouts, rate limit
//! handling and caching switches. It can be built in code with
//! [`ClientConfig::builder`] or loaded from YAML/JSON.
//!
//! ```yaml
//! application:
//!   name: my-app
//!   version: 1.0.0
//! handle_rate_limits: true
//! max_rate_limit_retries: 5
//! ```

use crate::error::{Error, Result};
use crate::http::{RateLimitHeaders, ThrottleConfig};
use crate::types::HttpAgent;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default BeatSaver instance
pub const DEFAULT_BASE_URL: &str = "https://beatsaver.com";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Client Config
// ============================================================================

/// Configuration for a [`BeatSaver`](crate::BeatSaver) client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application making the requests (first User-Agent product)
    pub application: HttpAgent,

    /// Additional agents appended to the User-Agent
    #[serde(default)]
    pub agents: Vec<HttpAgent>,

    /// Base URL of the instance (API lives under `/api/`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sleep until the limit resets on HTTP 429 instead of failing
    #[serde(default)]
    pub handle_rate_limits: bool,

    /// Maximum number of rate limit waits per request (unbounded when unset)
    #[serde(default)]
    pub max_rate_limit_retries: Option<u32>,

    /// Disable ETag caching
    #[serde(default)]
    pub disable_caching: bool,

    /// Names of the rate limit response headers
    #[serde(default)]
    pub rate_limit_headers: RateLimitHeaders,

    /// Optional client-side request throttle
    #[serde(default)]
    pub throttle: Option<ThrottleConfig>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    /// Create a config with defaults for the given application
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            application: HttpAgent::new(name, version),
            agents: Vec::new(),
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            handle_rate_limits: false,
            max_rate_limit_retries: None,
            disable_caching: false,
            rate_limit_headers: RateLimitHeaders::default(),
            throttle: None,
        }
    }

    /// Create a new config builder
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::new(name, version),
        }
    }

    /// Parse a config from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; `.json` is parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Check that the config can produce a working client
    pub fn validate(&self) -> Result<()> {
        if !self.application.is_valid() {
            return Err(Error::config(
                "application name and version must both be set",
            ));
        }

        if let Some(agent) = self.agents.iter().find(|a| !a.is_valid()) {
            return Err(Error::config(format!(
                "agent '{agent}' must specify both name and version"
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than zero"));
        }

        self.api_base()?;
        Ok(())
    }

    /// Composed User-Agent: application, this library, then extra agents
    pub fn user_agent(&self) -> String {
        let mut parts = vec![self.application.to_string(), HttpAgent::library().to_string()];
        parts.extend(self.agents.iter().map(ToString::to_string));
        parts.join(" ")
    }

    /// Root URL that request paths are joined onto
    pub fn api_base(&self) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/"))?)
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether ETag caching is enabled
    pub fn caching_enabled(&self) -> bool {
        !self.disable_caching
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ClientConfig`]
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Append an extra User-Agent product
    #[must_use]
    pub fn agent(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.config.agents.push(HttpAgent::new(name, version));
        self
    }

    /// Set the instance base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout (rounded up to whole seconds)
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self.config.timeout_secs = secs.max(1);
        self
    }

    /// Sleep and retry on HTTP 429
    #[must_use]
    pub fn handle_rate_limits(mut self, enabled: bool) -> Self {
        self.config.handle_rate_limits = enabled;
        self
    }

    /// Cap the number of rate limit waits per request
    #[must_use]
    pub fn max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.config.max_rate_limit_retries = Some(retries);
        self
    }

    /// Disable ETag caching
    #[must_use]
    pub fn disable_caching(mut self) -> Self {
        self.config.disable_caching = true;
        self
    }

    /// Override the rate limit header names
    #[must_use]
    pub fn rate_limit_headers(mut self, headers: RateLimitHeaders) -> Self {
        self.config.rate_limit_headers = headers;
        self
    }

    /// Throttle outgoing requests on the client side
    #[must_use]
    pub fn throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.config.throttle = Some(throttle);
        self
    }

    /// Build and validate the config
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
