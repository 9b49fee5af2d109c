//! Error types for Sentry API operations.
//!
//! This module defines the errors that can occur while talking to the Sentry
//! REST API: transport failures, non-success statuses, undecodable bodies and
//! runaway pagination.

/// Errors that can occur during Sentry API operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Sentry answered with a non-success status.
    ///
    /// `detail` carries Sentry's own error message when the body had one.
    #[error("Sentry API returned {status}{}", format_detail(.detail.as_deref()))]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The `detail` message from the response body, if any.
        detail: Option<String>,
    },

    /// A response body could not be decoded.
    #[error("failed to decode Sentry response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A listing still advertised a next page after `max_pages` pages.
    #[error("pagination did not finish within {max_pages} pages")]
    PageLimitExceeded {
        /// The page ceiling that was reached.
        max_pages: u32,
    },

    /// A team listing was requested without a team slug.
    #[error("invalid team slug")]
    InvalidTeamSlug,
}

fn format_detail(detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

/// A specialized Result type for Sentry API operations.
pub type Result<T> = std::result::Result<T, Error>;
