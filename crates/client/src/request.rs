//! Request compilation primitives shared by the query kinds.
//!
//! A compiled request is an API path plus an ordered multimap of query
//! parameters. Its [`target`](CompiledRequest::target) is the opaque string
//! handed to the transport and reported back to the user as the executed
//! query.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in query parameter keys and values.
///
/// Colons stay readable so that timestamps and search syntax such as
/// `is:unresolved` survive verbatim.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b':');

/// Characters escaped in path segments such as organization and team slugs.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Largest page size Sentry accepts.
pub const MAX_LIMIT: i64 = 100;

/// Timestamp layout for `start`/`end` parameters.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Clamps a requested result limit to what Sentry accepts.
///
/// Values below 1 or above [`MAX_LIMIT`] become [`MAX_LIMIT`].
///
/// # Examples
///
/// ```
/// use sentry_client::request::clamp_limit;
///
/// assert_eq!(clamp_limit(0), 100);
/// assert_eq!(clamp_limit(25), 25);
/// assert_eq!(clamp_limit(500), 100);
/// ```
#[must_use]
pub fn clamp_limit(limit: i64) -> i64 {
    if (1..=MAX_LIMIT).contains(&limit) {
        limit
    } else {
        MAX_LIMIT
    }
}

/// Formats a timestamp as `YYYY-MM-DDTHH:MM:SS`, without a zone suffix.
#[must_use]
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Query parameters, sorted by key when encoded.
///
/// Values added under the same key keep their insertion order.
///
/// # Examples
///
/// ```
/// use sentry_client::request::QueryParams;
///
/// let mut params = QueryParams::new();
/// params.set("query", "is:unresolved level:error");
/// params.add("project", "2");
/// params.add("project", "1");
///
/// assert_eq!(
///     params.encode(),
///     "project=2&project=1&query=is:unresolved%20level:error"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all values of `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    /// Appends `value` to the values of `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Appends every value of `values` under `key`.
    pub fn extend<I, S>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.add(key, value);
        }
    }

    /// Returns the values of `key` in insertion order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the first value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// Returns `true` if `key` has at least one value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        !self.get_all(key).is_empty()
    }

    /// Iterates over `(key, value)` pairs in encoding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |v| (key.as_str(), v.as_str())))
    }

    /// Encodes the parameters as a query string, without the leading `?`.
    #[must_use]
    pub fn encode(&self) -> String {
        self.iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, QUERY_VALUE),
                    utf8_percent_encode(value, QUERY_VALUE)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A compiled upstream request.
///
/// # Examples
///
/// ```
/// use sentry_client::request::{CompiledRequest, QueryParams};
///
/// let mut params = QueryParams::new();
/// params.set("limit", "100");
///
/// let request = CompiledRequest::new("/api/0/organizations/acme/issues/", params);
/// assert_eq!(request.target(), "/api/0/organizations/acme/issues/?limit=100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRequest {
    path: String,
    params: QueryParams,
}

impl CompiledRequest {
    /// Creates a request for `path` with `params`.
    #[must_use]
    pub fn new(path: impl Into<String>, params: QueryParams) -> Self {
        Self {
            path: path.into(),
            params,
        }
    }

    /// Returns the API path, without query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the query parameters.
    #[must_use]
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Returns the request target: the path, `?`, and the encoded parameters.
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}?{}", self.path, self.params.encode())
    }
}

/// Returns `/api/0/organizations/{org}/{resource}/`, with `org` encoded.
pub(crate) fn organization_path(org: &str, resource: &str) -> String {
    format!("/api/0/organizations/{}/{resource}/", encode_segment(org))
}

/// Returns `/api/0/teams/{org}/{team}/projects/`, with both slugs encoded.
pub(crate) fn team_projects_path(org: &str, team: &str) -> String {
    format!(
        "/api/0/teams/{}/{}/projects/",
        encode_segment(org),
        encode_segment(team)
    )
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}
