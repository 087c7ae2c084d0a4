//! Client configuration
//!
//! The service base URL has exactly one source per run. Resolution order:
//! explicit value (`--api-url`), the `STADIX_API_URL` environment variable,
//! the config file, then [`DEFAULT_BASE_URL`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the configured base URL
pub const API_URL_ENV: &str = "STADIX_API_URL";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the statistics service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Service root, without the `/api/v1` prefix
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("stadix/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> ClientResult<Self> {
        toml::from_str(toml_str).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> ClientResult<String> {
        toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> ClientResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    /// `<config dir>/stadix/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stadix").join("config.toml"))
    }

    /// Resolve the configuration for this run from the process environment
    pub fn resolve(explicit_url: Option<&str>, config_path: Option<&Path>) -> ClientResult<Self> {
        let env_url = std::env::var(API_URL_ENV).ok();
        Self::resolve_with(explicit_url, env_url.as_deref(), config_path)
    }

    /// Resolve from explicit sources.
    ///
    /// An explicitly named config file must exist; the default location is
    /// optional.
    pub fn resolve_with(
        explicit_url: Option<&str>,
        env_url: Option<&str>,
        config_path: Option<&Path>,
    ) -> ClientResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::load(path)?,
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::load(&path)?,
                _ => Self::default(),
            },
        };

        let override_url = explicit_url
            .or(env_url)
            .map(str::trim)
            .filter(|url| !url.is_empty());
        if let Some(url) = override_url {
            tracing::debug!(base_url = url, "base URL overridden");
            config.base_url = url.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the settings and return the parsed base URL
    pub fn validate(&self) -> ClientResult<Url> {
        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ClientError::Config(
                "base_url must not carry a query or fragment".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip_with_defaults() {
        let config = ClientConfig::from_toml("base_url = \"https://stats.example.org\"").unwrap();
        assert_eq!(config.base_url, "https://stats.example.org");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        let toml = config.to_toml().unwrap();
        assert_eq!(ClientConfig::from_toml(&toml).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(ClientConfig::new("not a url").validate().is_err());
        assert!(ClientConfig::new("ftp://example.org").validate().is_err());
        assert!(ClientConfig::new("http://example.org/?q=1").validate().is_err());

        let mut config = ClientConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
