//! Shared protocol types for sentry-query.
//!
//! This crate defines the contract between the visualization host and the
//! Sentry datasource: what a query looks like, how queries are batched, and
//! how the executed upstream request is reported back.
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`query`]: The declarative [`SentryQuery`] description and [`QueryType`]
//! - [`request`]: Host request envelope ([`QueryDataRequest`], [`DataQuery`], [`TimeRange`])
//! - [`executed`]: The [`ExecutedQuery`] record attached to results
//!
//! # Examples
//!
//! Decoding a query sent by the host:
//!
//! ```
//! use sentry_protocol::{QueryType, SentryQuery};
//!
//! let query = SentryQuery::from_json(&serde_json::json!({
//!     "queryType": "issues",
//!     "projectIds": ["my-project"],
//!     "issuesQuery": "is:unresolved",
//! }))
//! .unwrap();
//!
//! assert_eq!(query.query_type, QueryType::Issues);
//! assert_eq!(query.issues_limit, 0);
//! ```

pub mod executed;
pub mod query;
pub mod request;

// Re-export primary types at crate root for convenience
pub use executed::ExecutedQuery;
pub use query::{QueryType, SentryQuery};
pub use request::{DataQuery, QueryDataRequest, TimeRange};
