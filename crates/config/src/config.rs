//! Core configuration struct and loading logic.
//!
//! This module provides the [`Config`] struct, which describes one Sentry
//! datasource: where the API lives, which organization to query, and how to
//! authenticate and paginate.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::pagination::PaginationConfig;
use crate::persistence::{find_config_file, read_config_file, write_config_file};

/// Base URL of the hosted Sentry service.
pub const DEFAULT_SENTRY_URL: &str = "https://sentry.io";

/// Settings for one Sentry datasource.
///
/// # Examples
///
/// ```
/// use sentry_config::{Config, PaginationConfig};
///
/// let config = Config::default();
/// assert_eq!(config.url, "https://sentry.io");
/// assert!(config.org_slug.is_empty());
///
/// let config = Config {
///     url: "https://sentry.example.com".to_string(),
///     org_slug: "acme".to_string(),
///     auth_token: Some("sntrys_xxx".to_string()),
///     tls_skip_verify: false,
///     pagination: PaginationConfig::with_max_pages(20),
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Sentry instance, without the `/api/0` suffix.
    #[serde(default = "default_url")]
    pub url: String,

    /// Default organization slug for every query.
    #[serde(default)]
    pub org_slug: String,

    /// Auth token for the Sentry API.
    ///
    /// When unset, `SENTRY_AUTH_TOKEN` is consulted instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Accept invalid TLS certificates (self-hosted instances only).
    #[serde(default)]
    pub tls_skip_verify: bool,

    /// Pagination limits.
    #[serde(default)]
    pub pagination: PaginationConfig,
}

fn default_url() -> String {
    DEFAULT_SENTRY_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: default_url(),
            org_slug: String::new(),
            auth_token: None,
            tls_skip_verify: false,
            pagination: PaginationConfig::default(),
        }
    }
}

impl Config {
    /// Creates a configuration for an organization on hosted Sentry.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentry_config::Config;
    ///
    /// let config = Config::for_organization("acme");
    /// assert_eq!(config.org_slug, "acme");
    /// assert_eq!(config.url, "https://sentry.io");
    /// ```
    #[must_use]
    pub fn for_organization(org_slug: impl Into<String>) -> Self {
        Self {
            org_slug: org_slug.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from the default file locations.
    ///
    /// Searches for configuration files in the following order:
    ///
    /// 1. Local: `./sentry-query.json5` or `./sentry-query.json`
    /// 2. User: `~/.config/sentry-query/config.json5` or `~/.config/sentry-query/config.json`
    ///
    /// If no configuration file is found, returns a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is found but cannot be
    /// read, parsed, or validated.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// loaded values fail [`Config::validate`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sentry_config::Config;
    ///
    /// # fn example() -> sentry_config::Result<()> {
    /// let config = Config::load_from("sentry-query.json5")?;
    /// println!("querying {}", config.org_slug);
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config: Config = read_config_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        write_config_file(path, self)
    }

    /// Validates the configuration.
    ///
    /// The URL must be an `http://` or `https://` URL and the page ceiling
    /// must be within range. An empty organization slug is accepted here;
    /// queries report it individually.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] or
    /// [`ConfigError::InvalidPagination`].
    ///
    /// # Examples
    ///
    /// ```
    /// use sentry_config::Config;
    ///
    /// let mut config = Config::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.url = "sentry.io".to_string();
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let url = self.url.trim();
        let has_host = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .is_some_and(|rest| !rest.is_empty());
        if !has_host {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }

        self.pagination.validate()
    }

    /// Returns the base URL with any trailing slash removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentry_config::Config;
    ///
    /// let config = Config {
    ///     url: "https://sentry.example.com/".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(config.base_url(), "https://sentry.example.com");
    /// ```
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.url, DEFAULT_SENTRY_URL);
        assert!(config.org_slug.is_empty());
        assert!(config.auth_token.is_none());
        assert!(!config.tls_skip_verify);
        assert_eq!(config.pagination, PaginationConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_accepts_http_and_https() {
        for url in ["https://sentry.io", "http://localhost:9000", "https://s.example.com/"] {
            let config = Config {
                url: url.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "{url} should be valid");
        }
    }

    #[test]
    fn validate_rejects_bad_urls() {
        for url in ["", "sentry.io", "ftp://sentry.io", "https://"] {
            let config = Config {
                url: url.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidUrl(_))),
                "{url:?} should be rejected"
            );
        }
    }

    #[test]
    fn validate_invalid_pagination() {
        let config = Config {
            pagination: PaginationConfig::with_max_pages(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPagination { .. })
        ));
    }

    #[test]
    fn base_url_strips_trailing_slashes() {
        let config = Config {
            url: "https://sentry.example.com//".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "https://sentry.example.com");
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json5");
        std::fs::write(
            &path,
            r#"
            {
                // self-hosted instance
                url: "https://sentry.example.com",
                org_slug: "acme",
                auth_token: "sntrys_test",
                tls_skip_verify: true,
                pagination: { max_pages: 5 },
            }
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.url, "https://sentry.example.com");
        assert_eq!(config.org_slug, "acme");
        assert_eq!(config.auth_token.as_deref(), Some("sntrys_test"));
        assert!(config.tls_skip_verify);
        assert_eq!(config.pagination.max_pages, 5);
    }

    #[test]
    fn load_from_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"url": "sentry.io"}"#).unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let original = Config {
            auth_token: Some("sntrys_xxx".to_string()),
            pagination: PaginationConfig::with_max_pages(42),
            ..Config::for_organization("acme")
        };

        original.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn auth_token_not_serialized_when_none() {
        let config = Config::for_organization("acme");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("auth_token"));
    }
}
