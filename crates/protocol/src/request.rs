//! Host request envelope types.
//!
//! A host request carries one or more queries, each with a reference ID,
//! the raw query JSON and the dashboard time range it applies to.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A closed-open time interval `[from, to)`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use sentry_protocol::TimeRange;
///
/// let range = TimeRange::new(
///     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
/// );
/// assert_eq!(range.duration().num_hours(), 24);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start.
    pub from: DateTime<Utc>,
    /// Exclusive end.
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a time range.
    #[must_use]
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Creates a range ending now and spanning `duration` back.
    #[must_use]
    pub fn last(duration: chrono::Duration) -> Self {
        let to = Utc::now();
        Self {
            from: to - duration,
            to,
        }
    }

    /// Returns the length of the range.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.to - self.from
    }
}

/// One query of a host request.
///
/// The query body is kept as raw JSON so that a malformed description is
/// reported per query instead of failing the whole request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuery {
    /// Host-assigned reference ID (`A`, `B`, ...), unique within a request.
    pub ref_id: String,
    /// The raw query description.
    pub json: serde_json::Value,
    /// The time range to query.
    pub time_range: TimeRange,
}

impl DataQuery {
    /// Creates a data query.
    #[must_use]
    pub fn new(ref_id: impl Into<String>, json: serde_json::Value, time_range: TimeRange) -> Self {
        Self {
            ref_id: ref_id.into(),
            json,
            time_range,
        }
    }
}

/// A batch of queries submitted together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDataRequest {
    /// The queries, processed in order.
    pub queries: Vec<DataQuery>,
}

impl QueryDataRequest {
    /// Creates a request from a list of queries.
    #[must_use]
    pub fn new(queries: Vec<DataQuery>) -> Self {
        Self { queries }
    }

    /// Builds a request from bare query descriptions.
    ///
    /// Each description may carry its own `refId`; descriptions without one
    /// are assigned `A`, `B`, ... by position, skipping IDs already claimed
    /// by another description.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentry_protocol::{QueryDataRequest, TimeRange};
    ///
    /// let range = TimeRange::last(chrono::Duration::hours(1));
    /// let request = QueryDataRequest::from_descriptions(
    ///     vec![
    ///         serde_json::json!({ "queryType": "issues" }),
    ///         serde_json::json!({ "refId": "errors", "queryType": "events" }),
    ///     ],
    ///     range,
    /// );
    ///
    /// assert_eq!(request.queries[0].ref_id, "A");
    /// assert_eq!(request.queries[1].ref_id, "errors");
    /// ```
    #[must_use]
    pub fn from_descriptions(descriptions: Vec<serde_json::Value>, time_range: TimeRange) -> Self {
        let explicit_ref_id =
            |json: &serde_json::Value| json.get("refId").and_then(serde_json::Value::as_str).map(str::to_string);
        let mut taken: HashSet<String> = descriptions.iter().filter_map(explicit_ref_id).collect();

        let queries = descriptions
            .into_iter()
            .enumerate()
            .map(|(index, json)| {
                let ref_id = explicit_ref_id(&json).unwrap_or_else(|| {
                    let ref_id = (index..)
                        .map(default_ref_id)
                        .find(|candidate| !taken.contains(candidate))
                        .unwrap_or_default();
                    taken.insert(ref_id.clone());
                    ref_id
                });
                DataQuery::new(ref_id, json, time_range)
            })
            .collect();
        Self { queries }
    }
}

/// Returns the spreadsheet-style reference ID for a position: `A`..`Z`,
/// then `AA`, `AB`, ...
fn default_ref_id(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn range() -> TimeRange {
        TimeRange::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn default_ref_ids() {
        assert_eq!(default_ref_id(0), "A");
        assert_eq!(default_ref_id(25), "Z");
        assert_eq!(default_ref_id(26), "AA");
        assert_eq!(default_ref_id(27), "AB");
        assert_eq!(default_ref_id(51), "AZ");
        assert_eq!(default_ref_id(52), "BA");
    }

    #[test]
    fn from_descriptions_keeps_order_and_range() {
        let request = QueryDataRequest::from_descriptions(
            vec![
                serde_json::json!({ "queryType": "issues" }),
                serde_json::json!({ "queryType": "events" }),
                serde_json::json!({ "refId": 7 }),
            ],
            range(),
        );

        assert_eq!(request.queries.len(), 3);
        assert_eq!(request.queries[0].ref_id, "A");
        assert_eq!(request.queries[1].ref_id, "B");
        // A non-string refId falls back to the positional one.
        assert_eq!(request.queries[2].ref_id, "C");
        assert!(request.queries.iter().all(|q| q.time_range == range()));
    }

    #[test]
    fn default_ref_ids_skip_explicit_ones() {
        let request = QueryDataRequest::from_descriptions(
            vec![
                serde_json::json!({ "refId": "B", "queryType": "issues" }),
                serde_json::json!({ "queryType": "bogus" }),
                serde_json::json!({ "queryType": "events" }),
                serde_json::json!({ "refId": "C" }),
            ],
            range(),
        );

        let ids: Vec<_> = request.queries.iter().map(|q| q.ref_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "D", "E", "C"]);
    }

    #[test]
    fn time_range_last_ends_now() {
        let before = Utc::now();
        let range = TimeRange::last(chrono::Duration::minutes(30));
        assert!(range.to >= before);
        assert_eq!(range.duration(), chrono::Duration::minutes(30));
    }

    #[test]
    fn data_query_json_field_names() {
        let query = DataQuery::new("A", serde_json::json!({}), range());
        let json = serde_json::to_value(&query).expect("serialize");
        assert_eq!(json["refId"], "A");
        assert!(json["timeRange"]["from"].is_string());
    }
}
