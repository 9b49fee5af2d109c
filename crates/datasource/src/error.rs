//! Error types for query execution.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Errors that end a single query.
///
/// A failing query never affects the other queries of its batch.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The datasource has no organization configured.
    #[error("invalid organization slug")]
    InvalidOrganizationSlug,

    /// The query description is not valid query JSON.
    #[error("failed to decode query: {0}")]
    Decode(#[from] serde_json::Error),

    /// The `queryType` is none of the supported kinds.
    #[error("unknown query type")]
    UnknownQueryType {
        /// The discriminator as sent, possibly empty.
        query_type: String,
    },

    /// The upstream request failed.
    #[error(transparent)]
    Upstream(#[from] sentry_client::Error),

    /// The upstream response could not be turned into records.
    #[error("failed to convert response: {reason}")]
    Conversion {
        /// What was wrong with the response.
        reason: String,
    },
}

impl QueryError {
    /// Returns a stable, machine-readable name for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidOrganizationSlug => "invalidOrganizationSlug",
            Self::Decode(_) => "decode",
            Self::UnknownQueryType { .. } => "unknownQueryType",
            Self::Upstream(_) => "upstream",
            Self::Conversion { .. } => "conversion",
        }
    }
}

impl Serialize for QueryError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("QueryError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// A specialized Result type for query execution.
pub type Result<T> = std::result::Result<T, QueryError>;
