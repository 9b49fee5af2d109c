//! Configuration management for sentry-query.
//!
//! This crate handles loading, validating, and persisting the settings of a
//! Sentry datasource.
//!
//! # Overview
//!
//! - [`config`]: Core configuration struct and loading logic
//! - [`pagination`]: Page ceiling for paginated listings
//! - [`auth`]: Auth token resolution
//! - [`persistence`]: Config file reading and writing
//! - [`error`]: Error types for configuration operations
//!
//! # Configuration Sources (Priority)
//!
//! 1. Local config (`./sentry-query.json5` or `./sentry-query.json`)
//! 2. User config (`~/.config/sentry-query/config.json5` or `~/.config/sentry-query/config.json`)
//! 3. Built-in defaults
//!
//! The auth token additionally falls back to the `SENTRY_AUTH_TOKEN`
//! environment variable, see [`auth::resolve_token`].
//!
//! # Examples
//!
//! ```json5
//! {
//!   url: "https://sentry.io",
//!   org_slug: "acme",
//!   // falls back to SENTRY_AUTH_TOKEN when omitted
//!   auth_token: "sntrys_xxx",
//!   pagination: { max_pages: 50 },
//! }
//! ```
//!
//! ```no_run
//! use sentry_config::Config;
//!
//! # fn example() -> sentry_config::Result<()> {
//! let config = Config::load()?;
//! println!("{} at {}", config.org_slug, config.base_url());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod pagination;
pub mod persistence;

pub use config::Config;
pub use error::{ConfigError, Result};
pub use pagination::PaginationConfig;
