//! Project listings with a read-through cache.
//!
//! Projects change rarely but are needed on almost every query to turn
//! slugs into numeric IDs, so listings are cached per client for
//! [`PROJECTS_CACHE_TTL`].
//!
//! # Cache keys
//!
//! A lookup uses [`PROJECTS_CACHE_KEY`] for single-page listings and
//! `"projects-pagination"` for paginated ones, but every fetch stores its
//! result under [`PROJECTS_CACHE_KEY`]. A paginated fetch therefore serves
//! later single-page lookups, while paginated lookups always go upstream.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::SentryClient;
use crate::error::{Error, Result};
use crate::request::{organization_path, team_projects_path};
use crate::transport::Transport;

/// Key under which project listings are stored.
pub const PROJECTS_CACHE_KEY: &str = "projects";

/// Suffix of the lookup key for paginated listings.
const PAGINATION_SUFFIX: &str = "-pagination";

/// How long a project listing stays cached.
pub const PROJECTS_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// A team reference embedded in a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentryTeam {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// A Sentry project, as listed by the organization and team endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SentryProject {
    /// Numeric project ID, as a string.
    pub id: String,
    /// URL-safe project name, unique within the organization.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Owning team, on instances that still report a single team.
    pub team: Option<SentryTeam>,
    /// Teams with access to the project.
    pub teams: Vec<SentryTeam>,
    /// Environments seen by the project.
    pub environments: Vec<String>,
    pub has_access: bool,
    pub is_bookmarked: bool,
    pub is_member: bool,
    pub date_created: Option<DateTime<Utc>>,
}

impl<T: Transport> SentryClient<T> {
    /// Lists an organization's projects through the project cache.
    ///
    /// # Arguments
    ///
    /// * `org` - Organization slug; empty for the client's organization
    /// * `with_pagination` - Follow every page instead of reading only the first
    /// * `bypass_cache` - Skip the lookup; the result is still stored
    ///
    /// # Errors
    ///
    /// Returns an error if any page cannot be fetched or decoded. Nothing is
    /// cached in that case.
    #[instrument(skip(self, org), fields(org = %self.effective_org(org)))]
    pub async fn get_projects(
        &self,
        org: &str,
        with_pagination: bool,
        bypass_cache: bool,
    ) -> Result<Vec<SentryProject>> {
        if !bypass_cache {
            let key = lookup_key(with_pagination);
            if let Some(projects) = self.projects.get(&key) {
                debug!(key = %key, count = projects.len(), "project cache hit");
                return Ok(projects);
            }
        }

        let target = organization_path(self.effective_org(org), "projects");
        let projects: Vec<SentryProject> = if with_pagination {
            self.fetch_all(&target).await?
        } else {
            self.fetch(&target).await?
        };

        debug!(count = projects.len(), "caching projects");
        self.projects
            .set(PROJECTS_CACHE_KEY, projects.clone(), PROJECTS_CACHE_TTL);
        Ok(projects)
    }

    /// Lists the projects of a team. Not cached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTeamSlug`] for an empty `team` before any
    /// request, or the fetch error.
    #[instrument(skip(self))]
    pub async fn get_teams_projects(&self, org: &str, team: &str) -> Result<Vec<SentryProject>> {
        if team.is_empty() {
            return Err(Error::InvalidTeamSlug);
        }
        let target = team_projects_path(self.effective_org(org), team);
        self.fetch(&target).await
    }

    fn effective_org<'a>(&'a self, org: &'a str) -> &'a str {
        if org.is_empty() { self.org_slug() } else { org }
    }
}

fn lookup_key(with_pagination: bool) -> String {
    if with_pagination {
        format!("{PROJECTS_CACHE_KEY}{PAGINATION_SUFFIX}")
    } else {
        PROJECTS_CACHE_KEY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientOptions;
    use crate::testing::MockTransport;
    use crate::transport::Page;

    const PROJECTS: &str = "/api/0/organizations/acme/projects/";

    fn client(transport: MockTransport) -> SentryClient<MockTransport> {
        SentryClient::with_transport(transport, ClientOptions::new("https://sentry.io", "acme"))
    }

    fn two_pages() -> MockTransport {
        MockTransport::new()
            .with_page(
                PROJECTS,
                Page::with_next(
                    r#"[{"id": "1", "slug": "web", "name": "Web"}]"#,
                    "https://sentry.io/api/0/organizations/acme/projects/?&cursor=0:100:0",
                ),
            )
            .with_page(
                "https://sentry.io/api/0/organizations/acme/projects/?&cursor=0:100:0",
                Page::last(r#"[{"id": "2", "slug": "api", "name": "API"}]"#),
            )
    }

    #[test]
    fn lookup_keys() {
        assert_eq!(lookup_key(false), "projects");
        assert_eq!(lookup_key(true), "projects-pagination");
    }

    #[test]
    fn decode_project() {
        let project: SentryProject = serde_json::from_value(serde_json::json!({
            "id": "42",
            "slug": "web",
            "name": "Web",
            "team": { "id": "7", "name": "Frontend", "slug": "frontend" },
            "teams": [{ "id": "7", "name": "Frontend", "slug": "frontend" }],
            "environments": ["production"],
            "hasAccess": true,
            "isBookmarked": false,
            "isMember": true,
            "dateCreated": "2023-05-01T12:00:00.000000Z",
            "platform": "javascript"
        }))
        .unwrap();

        assert_eq!(project.id, "42");
        assert_eq!(project.team.as_ref().map(|t| t.slug.as_str()), Some("frontend"));
        assert_eq!(project.teams.len(), 1);
        assert!(project.has_access);
        assert!(project.is_member);
        assert!(project.date_created.is_some());
    }

    #[tokio::test]
    async fn paginated_fetch_populates_base_key() {
        let client = client(two_pages());

        let projects = client.get_projects("", true, false).await.unwrap();
        let slugs: Vec<_> = projects.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["web", "api"]);
        assert_eq!(client.transport().request_count(), 2);

        // Stored under "projects", so a single-page lookup is a hit.
        let cached = client.get_projects("", false, false).await.unwrap();
        assert_eq!(cached, projects);
        assert_eq!(client.transport().request_count(), 2);

        // "projects-pagination" is never written, so this goes upstream.
        client.get_projects("", true, false).await.unwrap();
        assert_eq!(client.transport().request_count(), 4);
    }

    #[tokio::test]
    async fn single_page_fetch_is_cached() {
        let transport =
            MockTransport::new().with_json(PROJECTS, serde_json::json!([{ "id": "1", "slug": "web" }]));
        let client = client(transport);

        client.get_projects("", false, false).await.unwrap();
        client.get_projects("", false, false).await.unwrap();
        assert_eq!(client.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn bypass_cache_always_fetches_and_stores() {
        let transport =
            MockTransport::new().with_json(PROJECTS, serde_json::json!([{ "id": "1", "slug": "web" }]));
        let client = client(transport);

        client.get_projects("", false, true).await.unwrap();
        client.get_projects("", false, true).await.unwrap();
        assert_eq!(client.transport().request_count(), 2);

        // Results fetched while bypassing are still cached.
        client.get_projects("", false, false).await.unwrap();
        assert_eq!(client.transport().request_count(), 2);
    }

    #[tokio::test]
    async fn explicit_org_overrides_default() {
        let transport = MockTransport::new()
            .with_json("/api/0/organizations/other/projects/", serde_json::json!([]));
        let client = client(transport);

        client.get_projects("other", false, false).await.unwrap();
        assert_eq!(
            client.transport().requests(),
            vec!["/api/0/organizations/other/projects/"]
        );
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let transport = MockTransport::new().with_failure(PROJECTS, 500, None);
        let client = client(transport);

        assert!(client.get_projects("", false, false).await.is_err());
        assert!(client.projects.get(PROJECTS_CACHE_KEY).is_none());
    }

    #[tokio::test]
    async fn teams_projects() {
        let transport = MockTransport::new().with_json(
            "/api/0/teams/acme/frontend/projects/",
            serde_json::json!([{ "id": "3", "slug": "web" }]),
        );
        let client = client(transport);

        let projects = client.get_teams_projects("", "frontend").await.unwrap();
        assert_eq!(projects[0].id, "3");
        assert_eq!(
            client.transport().requests(),
            vec!["/api/0/teams/acme/frontend/projects/"]
        );
    }

    #[tokio::test]
    async fn slugs_are_encoded_on_the_wire() {
        let transport = MockTransport::new()
            .with_json("/api/0/organizations/a%2Fb/projects/", serde_json::json!([]))
            .with_json("/api/0/teams/a%2Fb/x%3Fy/projects/", serde_json::json!([]));
        let client = client(transport);

        client.get_projects("a/b", false, true).await.unwrap();
        client.get_teams_projects("a/b", "x?y").await.unwrap();
        assert_eq!(
            client.transport().requests(),
            vec![
                "/api/0/organizations/a%2Fb/projects/",
                "/api/0/teams/a%2Fb/x%3Fy/projects/"
            ]
        );
    }

    #[tokio::test]
    async fn teams_projects_requires_team_slug() {
        let client = client(MockTransport::new());

        let result = client.get_teams_projects("acme", "").await;
        assert!(matches!(result, Err(Error::InvalidTeamSlug)));
        assert_eq!(client.transport().request_count(), 0);
    }
}
