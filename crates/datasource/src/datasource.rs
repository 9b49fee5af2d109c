//! Query orchestration.
//!
//! Every query of a batch runs through the same pipeline, one query at a
//! time:
//!
//! 1. Decode the query description
//! 2. Check that an organization is configured
//! 3. Reject unknown query types
//! 4. Resolve project slugs to IDs (best effort)
//! 5. Compile the upstream request
//! 6. Fetch and convert the response into a [`Frame`]
//!
//! Steps 1 to 3 never touch the network. Failures from step 5 onwards carry
//! the full request string that was (or would have been) sent.

use sentry_client::resolve::resolve_project_ids;
use sentry_client::{
    CompiledRequest, GetEventsInput, GetIssuesInput, GetStatsV2Input, HttpTransport, SentryClient,
    Transport,
};
use sentry_protocol::{
    DataQuery, ExecutedQuery, QueryDataRequest, QueryType, SentryQuery, TimeRange,
};
use tracing::{debug, instrument, warn};

use crate::error::{QueryError, Result};
use crate::frame::{Frame, FrameMeta, Records, stats_to_records};
use crate::response::{DataResponse, QueryDataResponse, QueryFailure};

/// A configured Sentry datasource.
///
/// # Examples
///
/// ```no_run
/// use sentry_client::{ClientOptions, SentryClient};
/// use sentry_datasource::Datasource;
/// use sentry_protocol::{QueryDataRequest, TimeRange};
///
/// # async fn example() -> sentry_client::Result<()> {
/// let client = SentryClient::new(ClientOptions::new("https://sentry.io", "acme"), None, false)?;
/// let datasource = Datasource::new(client);
///
/// let request = QueryDataRequest::from_descriptions(
///     vec![serde_json::json!({ "queryType": "issues", "issuesQuery": "is:unresolved" })],
///     TimeRange::last(chrono::Duration::hours(24)),
/// );
/// let response = datasource.query_data(&request).await;
/// println!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Datasource<T = HttpTransport> {
    client: SentryClient<T>,
}

impl<T: Transport> Datasource<T> {
    /// Creates a datasource around a client.
    #[must_use]
    pub fn new(client: SentryClient<T>) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    #[must_use]
    pub fn client(&self) -> &SentryClient<T> {
        &self.client
    }

    /// Runs every query of a batch, in order.
    ///
    /// Each query gets its own response; a failing query does not affect the
    /// others. When two queries share a reference ID, the first one is kept
    /// and the later one is not run.
    #[instrument(skip(self, request), fields(queries = request.queries.len()))]
    pub async fn query_data(&self, request: &QueryDataRequest) -> QueryDataResponse {
        let mut response = QueryDataResponse::default();
        for query in &request.queries {
            if response.responses.contains_key(&query.ref_id) {
                warn!(ref_id = %query.ref_id, "duplicate reference ID, query skipped");
                continue;
            }
            let result = self.run_query(query).await;
            response.responses.insert(query.ref_id.clone(), result);
        }
        response
    }

    /// Runs a single query.
    #[instrument(skip(self, query), fields(ref_id = %query.ref_id))]
    pub async fn run_query(&self, query: &DataQuery) -> DataResponse {
        let result = self.execute(query).await;
        if let Err(failure) = &result {
            warn!(
                error = %failure.error,
                executed = %failure.executed_query_string,
                "query failed"
            );
        }
        result.into()
    }

    async fn execute(&self, query: &DataQuery) -> std::result::Result<Frame, QueryFailure> {
        let description = SentryQuery::from_json(&query.json).map_err(QueryFailure::before_request)?;

        let org = self.client.org_slug();
        if org.is_empty() {
            return Err(QueryFailure::before_request(
                QueryError::InvalidOrganizationSlug,
            ));
        }
        if let QueryType::Other(name) = &description.query_type {
            return Err(QueryFailure::before_request(QueryError::UnknownQueryType {
                query_type: name.clone(),
            }));
        }

        let project_ids = resolve_project_ids(&self.client, org, &description.project_ids).await;
        let resolved = SentryQuery {
            project_ids,
            ..description
        };

        let (kind, request) = compile(org, &resolved, &query.time_range)
            .map_err(QueryFailure::before_request)?;
        let executed = ExecutedQuery::new(self.client.base_url(), org, &request.target());
        debug!(kind, executed = %executed.request_string, "running query");

        let records = self
            .fetch_records(&resolved.query_type, &request)
            .await
            .map_err(|e| QueryFailure::new(e, executed.request_string.clone()))?;
        debug!(count = records.len(), "query succeeded");

        Ok(Frame {
            name: Frame::name_for(kind, &query.ref_id),
            records,
            meta: FrameMeta {
                executed,
                query: resolved,
            },
        })
    }

    async fn fetch_records(&self, query_type: &QueryType, request: &CompiledRequest) -> Result<Records> {
        match query_type {
            QueryType::Issues => Ok(Records::Issues(self.client.fetch_issues(request).await?)),
            QueryType::Events => Ok(Records::Events(self.client.fetch_events(request).await?)),
            QueryType::StatsV2 => {
                let stats = self.client.fetch_stats_v2(request).await?;
                Ok(Records::Stats(stats_to_records(&stats)?))
            }
            QueryType::Other(name) => Err(QueryError::UnknownQueryType {
                query_type: name.clone(),
            }),
        }
    }
}

/// Compiles a resolved query into its frame label and upstream request.
fn compile(
    org: &str,
    query: &SentryQuery,
    range: &TimeRange,
) -> Result<(&'static str, CompiledRequest)> {
    let compiled = match &query.query_type {
        QueryType::Issues => (
            "Issues",
            GetIssuesInput {
                organization_slug: org.to_string(),
                project_ids: query.project_ids.clone(),
                environments: query.environments.clone(),
                query: query.issues_query.clone(),
                from: range.from,
                to: range.to,
                sort: query.issues_sort.clone(),
                limit: query.issues_limit,
            }
            .to_request(),
        ),
        QueryType::Events => (
            "Events",
            GetEventsInput {
                organization_slug: org.to_string(),
                project_ids: query.project_ids.clone(),
                environments: query.environments.clone(),
                query: query.events_query.clone(),
                from: range.from,
                to: range.to,
                sort: query.events_sort.clone(),
                limit: query.events_limit,
            }
            .to_request(),
        ),
        QueryType::StatsV2 => (
            "Stats",
            GetStatsV2Input {
                organization_slug: org.to_string(),
                from: range.from,
                to: range.to,
                project_ids: query.project_ids.clone(),
                category: query.stats_category.clone(),
                fields: query.stats_fields.clone(),
                group_by: query.stats_group_by.clone(),
                outcome: query.stats_outcome.clone(),
                reason: query.stats_reason.clone(),
            }
            .to_request(),
        ),
        QueryType::Other(name) => {
            return Err(QueryError::UnknownQueryType {
                query_type: name.clone(),
            });
        }
    };
    Ok(compiled)
}
