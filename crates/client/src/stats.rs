//! Usage statistics queries (`/api/0/organizations/{org}/stats_v2/`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::SentryClient;
use crate::error::Result;
use crate::request::{CompiledRequest, QueryParams, format_time, organization_path};
use crate::transport::Transport;

/// The stats endpoint response.
///
/// `intervals` holds the bucket start times; every series in every group has
/// one value per interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsV2Response {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub intervals: Vec<DateTime<Utc>>,
    pub groups: Vec<StatsGroup>,
}

/// One group of a stats response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsGroup {
    /// Group-by dimension values, empty when the query is not grouped.
    pub by: BTreeMap<String, serde_json::Value>,
    /// Total per field over the whole range.
    pub totals: BTreeMap<String, f64>,
    /// Values per field, one per interval.
    pub series: BTreeMap<String, Vec<f64>>,
}

/// Parameters of a stats query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetStatsV2Input {
    pub organization_slug: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub project_ids: Vec<String>,
    /// Data categories, e.g. `error` or `transaction`.
    pub category: Vec<String>,
    /// Aggregates, e.g. `sum(quantity)`.
    pub fields: Vec<String>,
    /// Group-by dimensions, e.g. `outcome`.
    pub group_by: Vec<String>,
    pub outcome: Vec<String>,
    pub reason: Vec<String>,
}

impl GetStatsV2Input {
    /// Compiles the query into an upstream request.
    ///
    /// Every list becomes a repeated parameter; empty lists are omitted.
    #[must_use]
    pub fn to_request(&self) -> CompiledRequest {
        let mut params = QueryParams::new();
        params.set("start", format_time(&self.from));
        params.set("end", format_time(&self.to));
        params.extend("project", &self.project_ids);
        params.extend("category", &self.category);
        params.extend("field", &self.fields);
        params.extend("groupBy", &self.group_by);
        params.extend("outcome", &self.outcome);
        params.extend("reason", &self.reason);

        CompiledRequest::new(organization_path(&self.organization_slug, "stats_v2"), params)
    }
}

impl<T: Transport> SentryClient<T> {
    /// Runs a compiled stats request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self, request), fields(path = request.path()))]
    pub async fn fetch_stats_v2(&self, request: &CompiledRequest) -> Result<StatsV2Response> {
        let stats: StatsV2Response = self.fetch(&request.target()).await?;
        debug!(
            intervals = stats.intervals.len(),
            groups = stats.groups.len(),
            "fetched stats"
        );
        Ok(stats)
    }

    /// Compiles and runs a stats query.
    ///
    /// # Errors
    ///
    /// See [`fetch_stats_v2`](Self::fetch_stats_v2).
    pub async fn get_stats_v2(&self, input: &GetStatsV2Input) -> Result<StatsV2Response> {
        self.fetch_stats_v2(&input.to_request()).await
    }
}
