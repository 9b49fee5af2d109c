//! Sentry API client for sentry-query.
//!
//! This crate talks to the Sentry REST API on behalf of the datasource:
//! it compiles query descriptions into upstream requests, follows paginated
//! listings, and keeps a short-lived cache of project metadata.
//!
//! # Overview
//!
//! - [`SentryClient`]: The API client, generic over its [`Transport`]
//! - [`TtlCache`]: In-memory cache with per-entry expiry
//! - [`pagination`]: Cursor-following fetch loop and `Link` header parsing
//! - [`resolve`]: Best-effort project slug to ID resolution
//! - [`GetIssuesInput`], [`GetEventsInput`], [`GetStatsV2Input`]: Query
//!   compilers for the three query kinds
//! - [`Error`]: Error types for Sentry API operations
//!
//! # Authentication
//!
//! Requests carry the auth token as a bearer token. Tokens are held in a
//! [`secrecy::SecretString`] so they never show up in debug output or logs.
//!
//! # Examples
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use secrecy::SecretString;
//! use sentry_client::{ClientOptions, GetEventsInput, SentryClient, resolve::resolve_project_ids};
//!
//! # async fn example() -> sentry_client::Result<()> {
//! let token = SecretString::from("sntrys_xxx".to_string());
//! let client = SentryClient::new(ClientOptions::new("https://sentry.io", "acme"), Some(token), false)?;
//!
//! let projects = resolve_project_ids(&client, "acme", &["web".to_string()]).await;
//! let input = GetEventsInput {
//!     organization_slug: "acme".to_string(),
//!     project_ids: projects,
//!     environments: vec!["production".to_string()],
//!     query: "level:error".to_string(),
//!     from: Utc::now() - Duration::hours(24),
//!     to: Utc::now(),
//!     sort: "-count()".to_string(),
//!     limit: 50,
//! };
//!
//! for event in client.get_events(&input).await? {
//!     println!("{} {}", event.count, event.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod events;
pub mod issues;
pub mod pagination;
pub mod projects;
pub mod request;
pub mod resolve;
pub mod stats;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod transport;

pub use cache::TtlCache;
pub use client::{ClientOptions, DEFAULT_MAX_PAGES, SentryClient};
pub use error::{Error, Result};
pub use events::{EVENT_FIELDS, GetEventsInput, SentryEvent, SentryEvents};
pub use issues::{GetIssuesInput, IssueProject, SentryIssue};
pub use projects::{PROJECTS_CACHE_KEY, PROJECTS_CACHE_TTL, SentryProject, SentryTeam};
pub use request::{CompiledRequest, QueryParams};
pub use stats::{GetStatsV2Input, StatsGroup, StatsV2Response};
pub use transport::{HttpTransport, Page, Transport};
