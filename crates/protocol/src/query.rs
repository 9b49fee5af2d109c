//! Query description types.
//!
//! This module defines the declarative query model that the host sends for
//! each panel query: which kind of Sentry data to fetch, which projects and
//! environments to scope it to, and the kind-specific filters.

use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

/// The kind of data a query asks for.
///
/// Serialized as the host's `queryType` string. Values other than the three
/// known kinds are kept verbatim in [`QueryType::Other`] so that decoding
/// succeeds and dispatch can report them as unknown.
///
/// # Examples
///
/// ```
/// use sentry_protocol::QueryType;
///
/// let kind: QueryType = serde_json::from_str(r#""statsV2""#).unwrap();
/// assert_eq!(kind, QueryType::StatsV2);
///
/// let other: QueryType = serde_json::from_str(r#""metrics""#).unwrap();
/// assert_eq!(other, QueryType::Other("metrics".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QueryType {
    /// Grouped issues (`/issues/`).
    Issues,
    /// Discover events (`/events/`).
    Events,
    /// Usage statistics (`/stats_v2/`).
    StatsV2,
    /// Any other discriminator, including an absent one.
    Other(String),
}

impl QueryType {
    /// Returns the wire name of this query type.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentry_protocol::QueryType;
    ///
    /// assert_eq!(QueryType::Events.as_str(), "events");
    /// assert_eq!(QueryType::Other("foo".into()).as_str(), "foo");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Issues => "issues",
            Self::Events => "events",
            Self::StatsV2 => "statsV2",
            Self::Other(name) => name,
        }
    }

    /// Returns `true` for the query types this datasource can execute.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl Default for QueryType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for QueryType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "issues" => Self::Issues,
            "events" => Self::Events,
            "statsV2" => Self::StatsV2,
            _ => Self::Other(value),
        }
    }
}

impl From<QueryType> for String {
    fn from(value: QueryType) -> Self {
        match value {
            QueryType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query description as sent by the host.
///
/// Every field is optional on the wire and takes its zero value when absent
/// or `null`.
/// Project identifiers may be numeric IDs or project slugs; slugs are
/// resolved to IDs before the upstream request is compiled.
///
/// # Examples
///
/// ```
/// use sentry_protocol::{QueryType, SentryQuery};
///
/// let query: SentryQuery = serde_json::from_str(
///     r#"{"queryType": "events", "projectIds": ["10", "web"], "eventsLimit": 25}"#,
/// )
/// .unwrap();
///
/// assert_eq!(query.query_type, QueryType::Events);
/// assert_eq!(query.project_ids, vec!["10", "web"]);
/// assert_eq!(query.events_limit, 25);
/// assert!(query.environments.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SentryQuery {
    /// Which kind of data to fetch.
    #[serde(deserialize_with = "null_as_default")]
    pub query_type: QueryType,
    /// Project IDs or slugs, in the order given by the user.
    #[serde(deserialize_with = "null_as_default")]
    pub project_ids: Vec<String>,
    /// Environment names.
    #[serde(deserialize_with = "null_as_default")]
    pub environments: Vec<String>,

    /// Search expression for issue queries.
    #[serde(deserialize_with = "null_as_default")]
    pub issues_query: String,
    /// Sort key for issue queries (empty for the upstream default).
    #[serde(deserialize_with = "null_as_default")]
    pub issues_sort: String,
    /// Maximum number of issues.
    #[serde(deserialize_with = "null_as_default")]
    pub issues_limit: i64,

    /// Search expression for event queries.
    #[serde(deserialize_with = "null_as_default")]
    pub events_query: String,
    /// Sort key for event queries (empty for the upstream default).
    #[serde(deserialize_with = "null_as_default")]
    pub events_sort: String,
    /// Maximum number of events.
    #[serde(deserialize_with = "null_as_default")]
    pub events_limit: i64,

    /// Stats: data categories (`error`, `transaction`, ...).
    #[serde(deserialize_with = "null_as_default")]
    pub stats_category: Vec<String>,
    /// Stats: aggregate fields (`sum(quantity)`, ...).
    #[serde(deserialize_with = "null_as_default")]
    pub stats_fields: Vec<String>,
    /// Stats: group-by dimensions.
    #[serde(deserialize_with = "null_as_default")]
    pub stats_group_by: Vec<String>,
    /// Stats: outcome filter.
    #[serde(deserialize_with = "null_as_default")]
    pub stats_outcome: Vec<String>,
    /// Stats: reason filter.
    #[serde(deserialize_with = "null_as_default")]
    pub stats_reason: Vec<String>,
}

impl SentryQuery {
    /// Creates an empty query of the given type.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentry_protocol::{QueryType, SentryQuery};
    ///
    /// let query = SentryQuery::new(QueryType::Issues);
    /// assert_eq!(query.query_type, QueryType::Issues);
    /// assert!(query.project_ids.is_empty());
    /// ```
    #[must_use]
    pub fn new(query_type: QueryType) -> Self {
        Self {
            query_type,
            ..Self::default()
        }
    }

    /// Decodes a query description from the host's JSON model.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is not a JSON object, or when a present
    /// field has the wrong JSON type, for example a string where a list of
    /// project IDs is expected.
    pub fn from_json(value: &serde_json::Value) -> serde_json::Result<Self> {
        // Derived structs also accept sequences, filling fields by position.
        let unexpected = match value {
            serde_json::Value::Object(_) => return Self::deserialize(value),
            serde_json::Value::Null => Unexpected::Unit,
            serde_json::Value::Bool(b) => Unexpected::Bool(*b),
            serde_json::Value::Number(_) => Unexpected::Other("number"),
            serde_json::Value::String(s) => Unexpected::Str(s),
            serde_json::Value::Array(_) => Unexpected::Seq,
        };
        Err(serde_json::Error::invalid_type(unexpected, &"a query object"))
    }
}

/// Deserializes `null` as the field's zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_type_default_is_empty_other() {
        assert_eq!(QueryType::default(), QueryType::Other(String::new()));
        assert!(!QueryType::default().is_known());
    }

    #[test]
    fn query_type_known_names() {
        assert_eq!(QueryType::from("issues".to_string()), QueryType::Issues);
        assert_eq!(QueryType::from("events".to_string()), QueryType::Events);
        assert_eq!(QueryType::from("statsV2".to_string()), QueryType::StatsV2);
        // Matching is exact.
        assert_eq!(
            QueryType::from("Events".to_string()),
            QueryType::Other("Events".to_string())
        );
    }

    #[test]
    fn decode_empty_object_uses_zero_values() {
        let query = SentryQuery::from_json(&serde_json::json!({})).expect("decode");
        assert_eq!(query, SentryQuery::default());
        assert_eq!(query.issues_limit, 0);
    }

    #[test]
    fn decode_all_fields() {
        let query = SentryQuery::from_json(&serde_json::json!({
            "queryType": "statsV2",
            "projectIds": ["1", "frontend"],
            "environments": ["production"],
            "issuesQuery": "is:unresolved",
            "issuesSort": "freq",
            "issuesLimit": 10,
            "eventsQuery": "level:error",
            "eventsSort": "-count()",
            "eventsLimit": 50,
            "statsCategory": ["error"],
            "statsFields": ["sum(quantity)"],
            "statsGroupBy": ["outcome"],
            "statsOutcome": ["accepted"],
            "statsReason": ["none"],
        }))
        .expect("decode");

        assert_eq!(query.query_type, QueryType::StatsV2);
        assert_eq!(query.project_ids, vec!["1", "frontend"]);
        assert_eq!(query.environments, vec!["production"]);
        assert_eq!(query.issues_query, "is:unresolved");
        assert_eq!(query.issues_sort, "freq");
        assert_eq!(query.issues_limit, 10);
        assert_eq!(query.events_query, "level:error");
        assert_eq!(query.events_sort, "-count()");
        assert_eq!(query.events_limit, 50);
        assert_eq!(query.stats_category, vec!["error"]);
        assert_eq!(query.stats_fields, vec!["sum(quantity)"]);
        assert_eq!(query.stats_group_by, vec!["outcome"]);
        assert_eq!(query.stats_outcome, vec!["accepted"]);
        assert_eq!(query.stats_reason, vec!["none"]);
    }

    #[test]
    fn decode_ignores_host_fields() {
        let query = SentryQuery::from_json(&serde_json::json!({
            "refId": "A",
            "datasource": { "uid": "abc" },
            "queryType": "issues",
        }))
        .expect("decode");
        assert_eq!(query.query_type, QueryType::Issues);
    }

    #[test]
    fn decode_rejects_wrong_types() {
        assert!(SentryQuery::from_json(&serde_json::json!({ "projectIds": "10" })).is_err());
        assert!(SentryQuery::from_json(&serde_json::json!({ "eventsLimit": "ten" })).is_err());
        assert!(SentryQuery::from_json(&serde_json::json!({ "queryType": 3 })).is_err());
        assert!(SentryQuery::from_json(&serde_json::json!([])).is_err());
    }

    #[test]
    fn decode_rejects_non_objects() {
        let positional = SentryQuery::from_json(&serde_json::json!(["issues", ["web"]]));
        assert!(positional.unwrap_err().to_string().contains("expected a query object"));
        assert!(SentryQuery::from_json(&serde_json::Value::Null).is_err());
        assert!(SentryQuery::from_json(&serde_json::json!("issues")).is_err());
        assert!(SentryQuery::from_json(&serde_json::json!(3)).is_err());
    }

    #[test]
    fn decode_null_fields_as_zero_values() {
        let query = SentryQuery::from_json(&serde_json::json!({
            "queryType": "events",
            "projectIds": null,
            "environments": null,
            "eventsQuery": null,
            "eventsLimit": null,
            "statsFields": null,
        }))
        .expect("decode");

        assert_eq!(query, SentryQuery::new(QueryType::Events));

        let query = SentryQuery::from_json(&serde_json::json!({ "queryType": null })).expect("decode");
        assert_eq!(query.query_type, QueryType::default());
    }

    #[test]
    fn serialize_uses_host_field_names() {
        let mut query = SentryQuery::new(QueryType::StatsV2);
        query.stats_group_by = vec!["category".to_string()];

        let json = serde_json::to_value(&query).expect("serialize");
        assert_eq!(json["queryType"], "statsV2");
        assert_eq!(json["statsGroupBy"][0], "category");
    }
}
