//! Executed-query records.

use serde::{Deserialize, Serialize};

/// The request that was actually sent upstream for a query.
///
/// Attached to results and errors for display only; nothing in the query
/// pipeline reads it back.
///
/// # Examples
///
/// ```
/// use sentry_protocol::ExecutedQuery;
///
/// let executed = ExecutedQuery::new(
///     "https://sentry.io",
///     "acme",
///     "/api/0/organizations/acme/events/?per_page=100",
/// );
/// assert_eq!(
///     executed.request_string,
///     "https://sentry.io/api/0/organizations/acme/events/?per_page=100"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutedQuery {
    /// The full request URL (base URL followed by the request target).
    pub request_string: String,
    /// The Sentry base URL the request was sent to.
    pub base_url: String,
    /// The organization the request was scoped to.
    pub organization_slug: String,
}

impl ExecutedQuery {
    /// Builds the record for a request target sent to `base_url`.
    #[must_use]
    pub fn new(base_url: &str, organization_slug: &str, target: &str) -> Self {
        Self {
            request_string: format!("{}{target}", base_url.trim_end_matches('/')),
            base_url: base_url.to_string(),
            organization_slug: organization_slug.to_string(),
        }
    }
}
