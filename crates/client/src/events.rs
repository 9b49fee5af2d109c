//! Discover event queries (`/api/0/organizations/{org}/events/`).
//!
//! Every event query requests the same fixed projection, see
//! [`EVENT_FIELDS`], so that rows always decode into [`SentryEvent`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::SentryClient;
use crate::error::Result;
use crate::request::{CompiledRequest, QueryParams, clamp_limit, format_time, organization_path};
use crate::transport::Transport;

/// Columns requested for every event query, in request order.
pub const EVENT_FIELDS: [&str; 12] = [
    "id",
    "title",
    "project",
    "project.id",
    "release",
    "count()",
    "epm()",
    "last_seen()",
    "failure_rate()",
    "level",
    "event.type",
    "platform",
];

/// The events endpoint response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentryEvents {
    pub data: Vec<SentryEvent>,
    /// Column metadata (types and units), kept as returned.
    pub meta: serde_json::Map<String, serde_json::Value>,
}

/// One row of the fixed event projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentryEvent {
    pub id: String,
    pub title: String,
    pub project: String,
    #[serde(rename = "project.id")]
    pub project_id: i64,
    pub release: Option<String>,
    #[serde(rename = "count()")]
    pub count: i64,
    #[serde(rename = "epm()")]
    pub events_per_minute: f64,
    #[serde(rename = "last_seen()")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(rename = "failure_rate()")]
    pub failure_rate: f64,
    pub level: String,
    #[serde(rename = "event.type")]
    pub event_type: String,
    pub platform: String,
}

/// Parameters of an event query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetEventsInput {
    pub organization_slug: String,
    pub project_ids: Vec<String>,
    pub environments: Vec<String>,
    /// Discover search expression.
    pub query: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Sort key, e.g. `-count()`; omitted when empty.
    pub sort: String,
    /// Requested page size, clamped by [`effective_limit`](Self::effective_limit).
    pub limit: i64,
}

impl GetEventsInput {
    /// Returns the `per_page` value sent upstream.
    #[must_use]
    pub fn effective_limit(&self) -> i64 {
        clamp_limit(self.limit)
    }

    /// Compiles the query into an upstream request.
    #[must_use]
    pub fn to_request(&self) -> CompiledRequest {
        let mut params = QueryParams::new();
        params.set("query", &self.query);
        params.set("start", format_time(&self.from));
        params.set("end", format_time(&self.to));
        if !self.sort.is_empty() {
            params.set("sort", &self.sort);
        }
        params.set("per_page", self.effective_limit().to_string());
        params.extend("field", EVENT_FIELDS);
        params.extend("project", &self.project_ids);
        params.extend("environment", &self.environments);

        CompiledRequest::new(organization_path(&self.organization_slug, "events"), params)
    }
}

impl<T: Transport> SentryClient<T> {
    /// Runs a compiled event request and returns its rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self, request), fields(path = request.path()))]
    pub async fn fetch_events(&self, request: &CompiledRequest) -> Result<Vec<SentryEvent>> {
        let events: SentryEvents = self.fetch(&request.target()).await?;
        debug!(count = events.data.len(), "fetched events");
        Ok(events.data)
    }

    /// Compiles and runs an event query.
    ///
    /// # Errors
    ///
    /// See [`fetch_events`](Self::fetch_events).
    pub async fn get_events(&self, input: &GetEventsInput) -> Result<Vec<SentryEvent>> {
        self.fetch_events(&input.to_request()).await
    }
}
