//! The page-fetching seam between the client and the network.
//!
//! Everything above this module speaks in request targets (an API path with
//! its query string, or an absolute next-page URL) and [`Page`]s. The
//! [`Transport`] trait is the only place that touches HTTP, so the rest of
//! the crate can be exercised against canned pages.

use std::future::Future;

use reqwest::header::LINK;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::pagination::next_page_target;

/// One upstream response: the raw body and the advertised next page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// The response body, usually JSON.
    pub body: Vec<u8>,
    /// The next-page target from the `Link` header, if there are more results.
    pub next: Option<String>,
}

impl Page {
    /// Creates a page with no successor.
    #[must_use]
    pub fn last(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            next: None,
        }
    }

    /// Creates a page followed by `next`.
    #[must_use]
    pub fn with_next(body: impl Into<Vec<u8>>, next: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            next: Some(next.into()),
        }
    }
}

/// Fetches a single page for a request target.
///
/// A target is either an API path such as
/// `/api/0/organizations/acme/projects/` or an absolute URL taken from a
/// previous page's `next`.
pub trait Transport: Send + Sync {
    /// Fetches the page at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the upstream answers with
    /// a non-success status.
    fn get(&self, target: &str) -> impl Future<Output = Result<Page>> + Send;
}

/// Error body returned by Sentry alongside non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// [`Transport`] backed by `reqwest`.
///
/// # Security
///
/// The auth token is kept in a [`SecretString`] and only exposed while
/// building the `Authorization` header.
///
/// # Examples
///
/// ```no_run
/// use secrecy::SecretString;
/// use sentry_client::HttpTransport;
///
/// # fn example() -> sentry_client::Result<()> {
/// let token = SecretString::from("sntrys_xxx".to_string());
/// let transport = HttpTransport::new("https://sentry.io", Some(token), false)?;
/// assert_eq!(transport.base_url(), "https://sentry.io");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl HttpTransport {
    /// Creates a transport for the Sentry instance at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Instance URL without the `/api/0` suffix
    /// * `token` - Auth token sent as a bearer token, if any
    /// * `tls_skip_verify` - Accept invalid certificates (self-hosted only)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    #[instrument(skip(token), fields(authenticated = token.is_some()))]
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        tls_skip_verify: bool,
    ) -> Result<Self> {
        if tls_skip_verify {
            warn!("TLS certificate verification is disabled");
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("sentry-query/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(tls_skip_verify)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Returns the instance URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns whether requests carry an auth token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Resolves a target to the URL to request.
    fn url_for(&self, target: &str) -> String {
        if target.starts_with("https://") || target.starts_with("http://") {
            target.to_string()
        } else {
            format!("{}{}", self.base_url, target)
        }
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self))]
    async fn get(&self, target: &str) -> Result<Page> {
        let url = self.url_for(target);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page_target);
        let body = response.bytes().await?.to_vec();

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .map(|body| body.detail);
            warn!(status = status.as_u16(), detail = ?detail, "Sentry request failed");
            return Err(Error::Status {
                status: status.as_u16(),
                detail,
            });
        }

        debug!(bytes = body.len(), has_next = next.is_some(), "fetched page");
        Ok(Page { body, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpTransport {
        HttpTransport::new("https://sentry.example.com/", None, false).unwrap()
    }

    #[test]
    fn base_url_trailing_slash_is_removed() {
        assert_eq!(transport().base_url(), "https://sentry.example.com");
    }

    #[test]
    fn paths_are_joined_to_base_url() {
        assert_eq!(
            transport().url_for("/api/0/organizations/acme/projects/"),
            "https://sentry.example.com/api/0/organizations/acme/projects/"
        );
    }

    #[test]
    fn absolute_targets_are_used_as_given() {
        let next = "https://sentry.io/api/0/organizations/acme/projects/?&cursor=100:1:0";
        assert_eq!(transport().url_for(next), next);
    }

    #[test]
    fn authentication_state() {
        assert!(!transport().is_authenticated());

        let token = SecretString::from("sntrys_fake".to_string());
        let transport = HttpTransport::new("https://sentry.io", Some(token), false).unwrap();
        assert!(transport.is_authenticated());
    }

    #[test]
    fn debug_output_hides_token() {
        let token = SecretString::from("sntrys_very_secret".to_string());
        let transport = HttpTransport::new("https://sentry.io", Some(token), false).unwrap();
        assert!(!format!("{transport:?}").contains("sntrys_very_secret"));
    }

    #[test]
    fn page_constructors() {
        assert_eq!(Page::last("[]").next, None);
        assert_eq!(
            Page::with_next("[]", "/next").next.as_deref(),
            Some("/next")
        );
    }
}
