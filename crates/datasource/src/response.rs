//! Per-query and batch responses.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::QueryError;
use crate::frame::Frame;

/// Why a query failed, with the upstream request computed so far.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFailure {
    pub error: QueryError,
    /// The full upstream request string, or empty if the query failed
    /// before a request was compiled.
    pub executed_query_string: String,
}

impl QueryFailure {
    /// Creates a failure for `error` after `executed_query_string` was built.
    #[must_use]
    pub fn new(error: impl Into<QueryError>, executed_query_string: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            executed_query_string: executed_query_string.into(),
        }
    }

    /// Creates a failure that happened before any request was compiled.
    #[must_use]
    pub fn before_request(error: impl Into<QueryError>) -> Self {
        Self::new(error, String::new())
    }
}

/// The outcome of one query: frames on success, a failure otherwise.
#[derive(Debug, Default, Serialize)]
pub struct DataResponse {
    pub frames: Vec<Frame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<QueryFailure>,
}

impl DataResponse {
    /// Creates a successful response with a single frame.
    #[must_use]
    pub fn success(frame: Frame) -> Self {
        Self {
            frames: vec![frame],
            error: None,
        }
    }

    /// Creates a failed response without frames.
    #[must_use]
    pub fn failure(failure: QueryFailure) -> Self {
        Self {
            frames: Vec::new(),
            error: Some(failure),
        }
    }

    /// Returns `true` if the query failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl From<Result<Frame, QueryFailure>> for DataResponse {
    fn from(result: Result<Frame, QueryFailure>) -> Self {
        match result {
            Ok(frame) => Self::success(frame),
            Err(failure) => Self::failure(failure),
        }
    }
}

/// The responses of a batch, keyed by reference ID.
#[derive(Debug, Default, Serialize)]
pub struct QueryDataResponse {
    pub responses: BTreeMap<String, DataResponse>,
}

impl QueryDataResponse {
    /// Returns the response for `ref_id`.
    #[must_use]
    pub fn get(&self, ref_id: &str) -> Option<&DataResponse> {
        self.responses.get(ref_id)
    }
}
