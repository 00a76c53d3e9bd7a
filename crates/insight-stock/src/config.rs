//! Configuration for the analysis backend client

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the backend base URL
pub const ENV_API_BASE_URL: &str = "INSIGHT_API_BASE_URL";

/// Environment variable overriding the request timeout, in seconds
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "INSIGHT_REQUEST_TIMEOUT_SECS";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Configuration for talking to the analysis backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockConfig {
    /// Base URL of the backend (scheme + host, optional path prefix)
    pub api_base_url: Url,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            // Narrative generation on the backend is slow
            request_timeout: Duration::from_secs(60),
            user_agent: format!("insight/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn default_base_url() -> Url {
    // Constant input; parsing cannot fail.
    Url::parse(DEFAULT_API_BASE_URL).unwrap_or_else(|_| unreachable!("valid default URL"))
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Apply overrides from process environment variables
    pub fn with_env(self) -> Result<Self> {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_lookup<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = parse_base_url(raw.trim())?;
        }

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS).filter(|v| !v.trim().is_empty()) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                StockError::Config(format!("{ENV_REQUEST_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"))
            })?;
            self.request_timeout = Duration::from_secs(secs);
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.api_base_url.scheme(), "http" | "https") {
            return Err(StockError::Config(format!(
                "api_base_url must use http or https, got '{}'",
                self.api_base_url.scheme()
            )));
        }

        if self.api_base_url.cannot_be_a_base() {
            return Err(StockError::Config(format!(
                "api_base_url '{}' cannot be used as a base URL",
                self.api_base_url
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse a user-supplied base URL
pub fn parse_base_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| StockError::Config(format!("invalid api_base_url '{raw}': {e}")))
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    api_base_url: Option<Url>,
    request_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl StockConfigBuilder {
    /// Set the backend base URL
    pub fn api_base_url(mut self, url: Url) -> Self {
        self.api_base_url = Some(url);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            api_base_url: self.api_base_url.unwrap_or(defaults.api_base_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.user_agent.starts_with("insight/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .api_base_url(Url::parse("https://analytics.example.com/prefix/").unwrap())
            .request_timeout(Duration::from_secs(5))
            .user_agent("tests")
            .build()
            .unwrap();

        assert_eq!(config.api_base_url.host_str(), Some("analytics.example.com"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "tests");
    }

    #[test]
    fn test_validation_rejects_non_http_scheme() {
        let config = StockConfig {
            api_base_url: Url::parse("ftp://example.com").unwrap(),
            ..Default::default()
        };

        assert!(matches!(config.validate(), Err(StockError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let result = StockConfig::builder()
            .request_timeout(Duration::ZERO)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = StockConfig::default()
            .with_lookup(lookup_from(&[
                (ENV_API_BASE_URL, "http://10.0.0.5:9000"),
                (ENV_REQUEST_TIMEOUT_SECS, "15"),
            ]))
            .unwrap();

        assert_eq!(config.api_base_url.port(), Some(9000));
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_lookup_rejects_bad_timeout() {
        let result = StockConfig::default()
            .with_lookup(lookup_from(&[(ENV_REQUEST_TIMEOUT_SECS, "soon")]));

        match result {
            Err(StockError::Config(msg)) => assert!(msg.contains("soon")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_without_variables_keeps_defaults() {
        let config = StockConfig::default().with_lookup(|_| None).unwrap();
        assert_eq!(config, StockConfig::default());
    }
}
