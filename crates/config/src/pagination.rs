//! Pagination limits for list endpoints.
//!
//! Sentry list endpoints return a cursor to the next page in the `Link`
//! header. The datasource follows cursors until the upstream reports no more
//! results, but never more than [`PaginationConfig::max_pages`] pages for a
//! single listing, so that a cursor that cycles cannot keep a query running
//! forever.

use serde::{Deserialize, Serialize};

/// Default maximum number of pages followed per listing.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Minimum allowed page ceiling.
pub const MIN_MAX_PAGES: u32 = 1;

/// Maximum allowed page ceiling.
pub const MAX_MAX_PAGES: u32 = 10_000;

/// Configuration for following paginated listings.
///
/// # Examples
///
/// ```
/// use sentry_config::PaginationConfig;
///
/// let config = PaginationConfig::default();
/// assert_eq!(config.max_pages, 100);
///
/// let config = PaginationConfig::with_max_pages(20);
/// assert_eq!(config.max_pages, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// The maximum number of pages fetched for one listing.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl PaginationConfig {
    /// Creates a pagination configuration with the given page ceiling.
    #[must_use]
    pub fn with_max_pages(max_pages: u32) -> Self {
        Self { max_pages }
    }

    /// Validates the page ceiling.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_pages` is outside
    /// [`MIN_MAX_PAGES`]..=[`MAX_MAX_PAGES`].
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_pages < MIN_MAX_PAGES {
            return Err(crate::ConfigError::InvalidPagination {
                reason: format!(
                    "max_pages {} is below minimum of {}",
                    self.max_pages, MIN_MAX_PAGES
                ),
            });
        }

        if self.max_pages > MAX_MAX_PAGES {
            return Err(crate::ConfigError::InvalidPagination {
                reason: format!(
                    "max_pages {} exceeds maximum of {}",
                    self.max_pages, MAX_MAX_PAGES
                ),
            });
        }

        Ok(())
    }
}
