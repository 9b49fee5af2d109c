//! Result frames.
//!
//! A frame is the ordered record set of one successful query together with
//! the request that produced it. Issue and event rows are passed through as
//! decoded; stats responses are flattened into one row per interval.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sentry_client::{SentryEvent, SentryIssue, StatsV2Response};
use sentry_protocol::{ExecutedQuery, SentryQuery};

use crate::error::{QueryError, Result};

/// The records of a frame, typed by query kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Records {
    Issues(Vec<SentryIssue>),
    Events(Vec<SentryEvent>),
    Stats(Vec<StatsRecord>),
}

impl Records {
    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Issues(records) => records.len(),
            Self::Events(records) => records.len(),
            Self::Stats(records) => records.len(),
        }
    }

    /// Returns `true` if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One interval of a stats response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsRecord {
    /// Start of the interval.
    pub timestamp: DateTime<Utc>,
    /// Value of every series for this interval, by series name.
    pub values: BTreeMap<String, f64>,
}

/// What a frame was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMeta {
    pub executed: ExecutedQuery,
    /// The query after project slugs were resolved.
    pub query: SentryQuery,
}

/// The result of one successful query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// `<Kind> (<refId>)`, e.g. `Events (A)`.
    pub name: String,
    pub records: Records,
    pub meta: FrameMeta,
}

impl Frame {
    /// Returns the frame name for a query kind label and reference ID.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentry_datasource::Frame;
    ///
    /// assert_eq!(Frame::name_for("Stats", "B"), "Stats (B)");
    /// ```
    #[must_use]
    pub fn name_for(kind: &str, ref_id: &str) -> String {
        format!("{kind} ({ref_id})")
    }
}

/// Flattens a stats response into one record per interval.
///
/// Each series becomes a value column named after its field, followed by the
/// group's dimensions when the query is grouped:
/// `sum(quantity) {category=error, outcome=accepted}`.
///
/// # Errors
///
/// Returns [`QueryError::Conversion`] when a series does not have exactly one
/// value per interval, or when two series end up with the same name.
///
/// # Examples
///
/// ```
/// use sentry_client::StatsV2Response;
/// use sentry_datasource::frame::stats_to_records;
///
/// let stats: StatsV2Response = serde_json::from_value(serde_json::json!({
///     "intervals": ["2024-01-01T00:00:00Z", "2024-01-01T01:00:00Z"],
///     "groups": [{
///         "by": { "outcome": "accepted" },
///         "series": { "sum(quantity)": [3, 4] }
///     }]
/// }))
/// .unwrap();
///
/// let records = stats_to_records(&stats).unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].values["sum(quantity) {outcome=accepted}"], 4.0);
/// ```
pub fn stats_to_records(stats: &StatsV2Response) -> Result<Vec<StatsRecord>> {
    let mut records: Vec<StatsRecord> = stats
        .intervals
        .iter()
        .map(|timestamp| StatsRecord {
            timestamp: *timestamp,
            values: BTreeMap::new(),
        })
        .collect();
    let mut names = HashSet::new();

    for group in &stats.groups {
        let labels = group_labels(&group.by);
        for (field, series) in &group.series {
            let name = format!("{field}{labels}");
            if series.len() != records.len() {
                return Err(QueryError::Conversion {
                    reason: format!(
                        "series {name:?} has {} values for {} intervals",
                        series.len(),
                        records.len()
                    ),
                });
            }
            if !names.insert(name.clone()) {
                return Err(QueryError::Conversion {
                    reason: format!("duplicate series {name:?}"),
                });
            }
            for (record, value) in records.iter_mut().zip(series) {
                record.values.insert(name.clone(), *value);
            }
        }
    }

    Ok(records)
}

/// Renders group dimensions as ` {k=v, ...}`, or nothing when ungrouped.
fn group_labels(by: &BTreeMap<String, serde_json::Value>) -> String {
    if by.is_empty() {
        return String::new();
    }
    let labels: Vec<String> = by
        .iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => format!("{key}={s}"),
            other => format!("{key}={other}"),
        })
        .collect();
    format!(" {{{}}}", labels.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stats(value: serde_json::Value) -> StatsV2Response {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn ungrouped_series_use_field_names() {
        let records = stats_to_records(&stats(serde_json::json!({
            "intervals": ["2024-01-01T00:00:00Z", "2024-01-01T06:00:00Z"],
            "groups": [{
                "by": {},
                "series": { "sum(quantity)": [1, 2], "sum(times_seen)": [5, 6] }
            }]
        })))
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(records[0].values["sum(quantity)"], 1.0);
        assert_eq!(records[1].values["sum(times_seen)"], 6.0);
    }

    #[test]
    fn grouped_series_carry_sorted_labels() {
        let records = stats_to_records(&stats(serde_json::json!({
            "intervals": ["2024-01-01T00:00:00Z"],
            "groups": [
                { "by": { "outcome": "accepted", "category": "error" }, "series": { "sum(quantity)": [10] } },
                { "by": { "outcome": "filtered", "category": "error" }, "series": { "sum(quantity)": [2] } },
                { "by": { "project": 42 }, "series": { "sum(quantity)": [7] } }
            ]
        })))
        .unwrap();

        let names: Vec<_> = records[0].values.keys().cloned().collect();
        assert_eq!(
            names,
            vec![
                "sum(quantity) {category=error, outcome=accepted}",
                "sum(quantity) {category=error, outcome=filtered}",
                "sum(quantity) {project=42}",
            ]
        );
    }

    #[test]
    fn length_mismatch_is_a_conversion_failure() {
        let result = stats_to_records(&stats(serde_json::json!({
            "intervals": ["2024-01-01T00:00:00Z", "2024-01-01T01:00:00Z"],
            "groups": [{ "series": { "sum(quantity)": [1] } }]
        })));
        assert!(matches!(result, Err(QueryError::Conversion { .. })));
    }

    #[test]
    fn duplicate_series_is_a_conversion_failure() {
        let result = stats_to_records(&stats(serde_json::json!({
            "intervals": [],
            "groups": [
                { "series": { "sum(quantity)": [] } },
                { "series": { "sum(quantity)": [] } }
            ]
        })));
        assert!(matches!(result, Err(QueryError::Conversion { .. })));
    }

    #[test]
    fn no_intervals_no_records() {
        let records = stats_to_records(&StatsV2Response::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn records_len() {
        assert!(Records::Issues(vec![]).is_empty());
        assert_eq!(Records::Events(vec![SentryEvent::default()]).len(), 1);
    }
}
