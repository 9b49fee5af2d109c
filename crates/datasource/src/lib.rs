//! Sentry datasource for sentry-query.
//!
//! This crate turns host query batches into Sentry API calls and their
//! results into frames. It sits on top of [`sentry_client`] and speaks the
//! host contract defined in [`sentry_protocol`].
//!
//! # Overview
//!
//! - [`Datasource`]: Runs query batches, one query at a time
//! - [`Frame`] and [`Records`]: Typed record sets with the executed request
//! - [`DataResponse`] and [`QueryDataResponse`]: Per-query and batch results
//! - [`QueryError`]: Why a query failed
//!
//! # Examples
//!
//! ```no_run
//! use sentry_client::{ClientOptions, SentryClient};
//! use sentry_datasource::Datasource;
//! use sentry_protocol::{DataQuery, TimeRange};
//!
//! # async fn example() -> sentry_client::Result<()> {
//! let client = SentryClient::new(ClientOptions::new("https://sentry.io", "acme"), None, false)?;
//! let datasource = Datasource::new(client);
//!
//! let query = DataQuery::new(
//!     "A",
//!     serde_json::json!({ "queryType": "events", "projectIds": ["web"], "eventsLimit": 20 }),
//!     TimeRange::last(chrono::Duration::hours(6)),
//! );
//!
//! let response = datasource.run_query(&query).await;
//! match &response.error {
//!     Some(failure) => eprintln!("{} ({})", failure.error, failure.executed_query_string),
//!     None => println!("{} rows", response.frames[0].records.len()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod datasource;
pub mod error;
pub mod frame;
pub mod response;

pub use datasource::Datasource;
pub use error::{QueryError, Result};
pub use frame::{Frame, FrameMeta, Records, StatsRecord};
pub use response::{DataResponse, QueryDataResponse, QueryFailure};
