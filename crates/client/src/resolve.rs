//! Project slug to ID resolution.
//!
//! Queries may name projects either by numeric ID or by slug, while Sentry's
//! query endpoints only accept IDs. Resolution is best effort: when the
//! project listing cannot be fetched, identifiers are returned unchanged and
//! the upstream request decides what to make of them.

use std::collections::HashMap;

use tracing::{debug, instrument, warn};

use crate::client::SentryClient;
use crate::transport::Transport;

/// Returns `true` if `id` is a numeric project ID rather than a slug.
///
/// # Examples
///
/// ```
/// use sentry_client::resolve::is_numeric_id;
///
/// assert!(is_numeric_id("42"));
/// assert!(is_numeric_id("-1"));
/// assert!(!is_numeric_id("web"));
/// assert!(!is_numeric_id(""));
/// ```
#[must_use]
pub fn is_numeric_id(id: &str) -> bool {
    id.parse::<i64>().is_ok()
}

/// Replaces project slugs in `ids` by their numeric IDs.
///
/// Numeric identifiers pass through untouched, and slugs unknown to the
/// organization are kept as given. The listing is only fetched when at
/// least one slug is present, through the client's project cache.
///
/// A failed listing is logged and all identifiers are returned unchanged.
#[instrument(skip(client, ids), fields(count = ids.len()))]
pub async fn resolve_project_ids<T: Transport>(
    client: &SentryClient<T>,
    org: &str,
    ids: &[String],
) -> Vec<String> {
    if ids.iter().all(|id| is_numeric_id(id)) {
        return ids.to_vec();
    }

    let projects = match client.get_projects(org, true, false).await {
        Ok(projects) => projects,
        Err(e) => {
            warn!(error = %e, "could not list projects, keeping slugs unresolved");
            return ids.to_vec();
        }
    };

    let slug_to_id: HashMap<&str, &str> = projects
        .iter()
        .map(|project| (project.slug.as_str(), project.id.as_str()))
        .collect();

    let resolved: Vec<String> = ids
        .iter()
        .map(|id| match slug_to_id.get(id.as_str()) {
            Some(project_id) if !is_numeric_id(id) => (*project_id).to_string(),
            _ => id.clone(),
        })
        .collect();
    debug!(?resolved, "resolved project identifiers");
    resolved
}
