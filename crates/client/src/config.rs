use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Base URL used when `CATALOG_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Environment variable holding the catalog service base URL
pub const API_URL_VAR: &str = "CATALOG_API_URL";
/// Environment variable holding an optional request timeout in seconds
pub const TIMEOUT_VAR: &str = "CATALOG_API_TIMEOUT_SECS";

/// Errors raised while building a client from configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid catalog API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid value for CATALOG_API_TIMEOUT_SECS: '{0}'")]
    InvalidTimeout(String),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Where the catalog service lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads the configuration from the environment, loading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of a variable, if set
    ///
    /// # Returns
    /// The configuration, or an error if the timeout is not a whole number of seconds
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(API_URL_VAR)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) if !raw.trim().is_empty() => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
                Some(Duration::from_secs(secs))
            }
            _ => None,
        };

        Ok(Self { base_url, timeout })
    }

    /// Parses the base URL, rejecting URLs that cannot carry path segments
    pub fn parse_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: self.base_url.clone(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_vars(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_reads_variables() {
        let config = ClientConfig::from_vars(lookup(&[
            (API_URL_VAR, " https://catalog.example.edu/api "),
            (TIMEOUT_VAR, "15"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://catalog.example.edu/api");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_invalid_timeout() {
        let result = ClientConfig::from_vars(lookup(&[(TIMEOUT_VAR, "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(v)) if v == "soon"));
    }

    #[test]
    fn test_parse_base_url() {
        assert!(ClientConfig::default().parse_base_url().is_ok());
        assert!(ClientConfig::new("not a url").parse_base_url().is_err());
        assert!(ClientConfig::new("mailto:registrar@example.edu").parse_base_url().is_err());
    }
}
