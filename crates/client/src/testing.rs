//! Test support: a [`Transport`] that serves canned pages.
//!
//! Available to this crate's tests and, with the `test-util` feature, to
//! other crates.
//!
//! # Examples
//!
//! ```
//! use sentry_client::testing::MockTransport;
//! use sentry_client::{ClientOptions, SentryClient};
//!
//! # async fn example() -> sentry_client::Result<()> {
//! let transport = MockTransport::new().with_json(
//!     "/api/0/organizations/acme/projects/",
//!     serde_json::json!([{ "id": "1", "slug": "web", "name": "Web" }]),
//! );
//! let client = SentryClient::with_transport(transport, ClientOptions::new("https://sentry.io", "acme"));
//!
//! let projects = client.get_projects("", false, false).await?;
//! assert_eq!(projects[0].slug, "web");
//! assert_eq!(client.transport().request_count(), 1);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};
use crate::transport::{Page, Transport};

#[derive(Debug, Clone)]
enum Route {
    Page(Page),
    Failure { status: u16, detail: Option<String> },
}

/// A [`Transport`] answering from a fixed routing table.
///
/// A target is matched exactly first, then by its path alone (the part
/// before `?`). Unrouted targets fail with a `404` status. Every requested
/// target is recorded, in order.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Creates a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `page` for `target`.
    #[must_use]
    pub fn with_page(mut self, target: impl Into<String>, page: Page) -> Self {
        self.routes.insert(target.into(), Route::Page(page));
        self
    }

    /// Serves `body` as a single last page for `target`.
    #[must_use]
    pub fn with_json(self, target: impl Into<String>, body: serde_json::Value) -> Self {
        self.with_page(target, Page::last(body.to_string()))
    }

    /// Answers `target` with an error status.
    #[must_use]
    pub fn with_failure(mut self, target: impl Into<String>, status: u16, detail: Option<&str>) -> Self {
        self.routes.insert(
            target.into(),
            Route::Failure {
                status,
                detail: detail.map(str::to_string),
            },
        );
        self
    }

    /// Returns every requested target, in request order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of requests served so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn route(&self, target: &str) -> Option<&Route> {
        self.routes.get(target).or_else(|| {
            let path = target.split_once('?').map_or(target, |(path, _)| path);
            self.routes.get(path)
        })
    }
}

impl Transport for MockTransport {
    async fn get(&self, target: &str) -> Result<Page> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(target.to_string());

        match self.route(target) {
            Some(Route::Page(page)) => Ok(page.clone()),
            Some(Route::Failure { status, detail }) => Err(Error::Status {
                status: *status,
                detail: detail.clone(),
            }),
            None => Err(Error::Status {
                status: 404,
                detail: Some(format!("no route for {target}")),
            }),
        }
    }
}
