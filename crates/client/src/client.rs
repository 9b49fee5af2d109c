//! Sentry API client implementation.
//!
//! This module provides the [`SentryClient`] struct, which owns the transport,
//! the organization defaults, and the per-datasource project cache.

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::cache::TtlCache;
use crate::error::Result;
use crate::pagination::collect_pages;
use crate::projects::SentryProject;
use crate::transport::{HttpTransport, Transport};

/// Default page ceiling for paginated listings.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Connection settings for a [`SentryClient`].
///
/// # Examples
///
/// ```
/// use sentry_client::ClientOptions;
///
/// let options = ClientOptions::new("https://sentry.io", "acme").with_max_pages(10);
/// assert_eq!(options.org_slug, "acme");
/// assert_eq!(options.max_pages, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Instance URL without the `/api/0` suffix.
    pub base_url: String,
    /// Organization used when a call does not name one.
    pub org_slug: String,
    /// Page ceiling for paginated listings.
    pub max_pages: u32,
}

impl ClientOptions {
    /// Creates options with the default page ceiling.
    #[must_use]
    pub fn new(base_url: impl Into<String>, org_slug: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            org_slug: org_slug.into(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Sets the page ceiling.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// Sentry API client.
///
/// Each client carries its own project cache, so two datasources pointing
/// at different organizations never share cached projects.
///
/// # Examples
///
/// ```no_run
/// use secrecy::SecretString;
/// use sentry_client::{ClientOptions, SentryClient};
///
/// # async fn example() -> sentry_client::Result<()> {
/// let token = SecretString::from("sntrys_xxx".to_string());
/// let client = SentryClient::new(ClientOptions::new("https://sentry.io", "acme"), Some(token), false)?;
///
/// let projects = client.get_projects("", true, false).await?;
/// println!("{} projects", projects.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SentryClient<T = HttpTransport> {
    transport: T,
    base_url: String,
    org_slug: String,
    max_pages: u32,
    pub(crate) projects: TtlCache<Vec<SentryProject>>,
}

impl SentryClient<HttpTransport> {
    /// Creates a client talking to Sentry over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        options: ClientOptions,
        token: Option<SecretString>,
        tls_skip_verify: bool,
    ) -> Result<Self> {
        let transport = HttpTransport::new(&options.base_url, token, tls_skip_verify)?;
        Ok(Self::with_transport(transport, options))
    }
}

impl<T: Transport> SentryClient<T> {
    /// Creates a client on top of an existing transport.
    #[must_use]
    pub fn with_transport(transport: T, options: ClientOptions) -> Self {
        Self {
            transport,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            org_slug: options.org_slug,
            max_pages: options.max_pages,
            projects: TtlCache::new(),
        }
    }

    /// Returns the instance URL, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the configured organization slug.
    #[must_use]
    pub fn org_slug(&self) -> &str {
        &self.org_slug
    }

    /// Returns the page ceiling for paginated listings.
    #[must_use]
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the full request string for a target, as shown to users.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentry_client::{ClientOptions, SentryClient};
    ///
    /// # fn main() -> sentry_client::Result<()> {
    /// let client = SentryClient::new(ClientOptions::new("https://sentry.io/", "acme"), None, false)?;
    /// assert_eq!(
    ///     client.request_string("/api/0/organizations/acme/issues/?limit=100"),
    ///     "https://sentry.io/api/0/organizations/acme/issues/?limit=100"
    /// );
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn request_string(&self, target: &str) -> String {
        format!("{}{}", self.base_url, target)
    }

    /// Fetches a single page and decodes its body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode
    /// as `R`.
    #[instrument(skip(self))]
    pub async fn fetch<R: DeserializeOwned>(&self, target: &str) -> Result<R> {
        let page = self.transport.get(target).await?;
        Ok(serde_json::from_slice(&page.body)?)
    }

    /// Fetches a single page of a listing, with its next-page target.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a JSON
    /// array of `R`.
    pub async fn fetch_page<R: DeserializeOwned>(
        &self,
        target: &str,
    ) -> Result<(Vec<R>, Option<String>)> {
        let page = self.transport.get(target).await?;
        let records = serde_json::from_slice(&page.body)?;
        Ok((records, page.next))
    }

    /// Fetches every page of a listing, starting at `target`.
    ///
    /// # Errors
    ///
    /// Returns the first page failure, or
    /// [`Error::PageLimitExceeded`](crate::Error::PageLimitExceeded) when
    /// the listing does not end within [`max_pages`](Self::max_pages) pages.
    #[instrument(skip(self), fields(max_pages = self.max_pages))]
    pub async fn fetch_all<R: DeserializeOwned>(&self, target: &str) -> Result<Vec<R>> {
        let this = self;
        let records = collect_pages(target.to_string(), self.max_pages, move |next| async move {
            this.fetch_page(&next).await
        })
        .await?;
        debug!(count = records.len(), "fetched all pages");
        Ok(records)
    }
}
