//! Issue queries (`/api/0/organizations/{org}/issues/`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::SentryClient;
use crate::error::Result;
use crate::request::{CompiledRequest, QueryParams, clamp_limit, format_time, organization_path};
use crate::transport::Transport;

/// The project an issue belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueProject {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// A grouped issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SentryIssue {
    pub id: String,
    pub short_id: String,
    pub title: String,
    pub culprit: String,
    pub permalink: String,
    pub level: String,
    pub status: String,
    pub platform: String,
    pub project: IssueProject,
    #[serde(rename = "type")]
    pub issue_type: String,
    /// Event count; Sentry reports it as a string.
    pub count: String,
    pub user_count: i64,
    pub num_comments: i64,
    pub is_bookmarked: bool,
    pub is_public: bool,
    pub has_seen: bool,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    /// Issue-type specific metadata, kept as returned.
    pub metadata: serde_json::Value,
}

/// Parameters of an issue query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetIssuesInput {
    pub organization_slug: String,
    pub project_ids: Vec<String>,
    pub environments: Vec<String>,
    /// Sentry search expression, e.g. `is:unresolved`.
    pub query: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Sort key; omitted from the request when empty.
    pub sort: String,
    /// Requested limit, clamped by [`effective_limit`](Self::effective_limit).
    pub limit: i64,
}

impl GetIssuesInput {
    /// Returns the limit sent upstream.
    #[must_use]
    pub fn effective_limit(&self) -> i64 {
        clamp_limit(self.limit)
    }

    /// Compiles the query into an upstream request.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use sentry_client::GetIssuesInput;
    ///
    /// let input = GetIssuesInput {
    ///     organization_slug: "acme".to_string(),
    ///     project_ids: vec!["1".to_string()],
    ///     environments: vec![],
    ///     query: "is:unresolved".to_string(),
    ///     from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ///     to: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
    ///     sort: String::new(),
    ///     limit: 0,
    /// };
    ///
    /// assert_eq!(
    ///     input.to_request().target(),
    ///     "/api/0/organizations/acme/issues/?end=2024-01-02T00:00:00&limit=100&project=1&query=is:unresolved&start=2024-01-01T00:00:00"
    /// );
    /// ```
    #[must_use]
    pub fn to_request(&self) -> CompiledRequest {
        let mut params = QueryParams::new();
        params.set("query", &self.query);
        params.set("start", format_time(&self.from));
        params.set("end", format_time(&self.to));
        if !self.sort.is_empty() {
            params.set("sort", &self.sort);
        }
        params.set("limit", self.effective_limit().to_string());
        params.extend("project", &self.project_ids);
        params.extend("environment", &self.environments);

        CompiledRequest::new(organization_path(&self.organization_slug, "issues"), params)
    }
}

impl<T: Transport> SentryClient<T> {
    /// Runs a compiled issue request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self, request), fields(path = request.path()))]
    pub async fn fetch_issues(&self, request: &CompiledRequest) -> Result<Vec<SentryIssue>> {
        let issues: Vec<SentryIssue> = self.fetch(&request.target()).await?;
        debug!(count = issues.len(), "fetched issues");
        Ok(issues)
    }

    /// Compiles and runs an issue query.
    ///
    /// # Errors
    ///
    /// See [`fetch_issues`](Self::fetch_issues).
    pub async fn get_issues(&self, input: &GetIssuesInput) -> Result<Vec<SentryIssue>> {
        self.fetch_issues(&input.to_request()).await
    }
}
