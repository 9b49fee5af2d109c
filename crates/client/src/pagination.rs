//! Cursor-following fetch loop.
//!
//! Sentry list endpoints return at most one page of results and advertise the
//! next page in the `Link` response header:
//!
//! ```text
//! <https://sentry.io/api/0/organizations/acme/projects/?&cursor=0:0:1>; rel="previous"; results="false"; cursor="0:0:1",
//! <https://sentry.io/api/0/organizations/acme/projects/?&cursor=0:100:0>; rel="next"; results="true"; cursor="0:100:0"
//! ```
//!
//! [`collect_pages`] follows those cursors and concatenates the pages in
//! order.

use std::future::Future;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Fetches pages starting at `start` until no next target is advertised.
///
/// `fetch_page` receives a request target and returns the page's records
/// together with the next target, if any. An absent or empty next target
/// ends the loop. Records are returned in page order.
///
/// # Errors
///
/// - The first page failure aborts the loop; records already collected are
///   discarded and the failure is returned unchanged.
/// - [`Error::PageLimitExceeded`] when `max_pages` pages have been fetched
///   and another page is still advertised.
///
/// # Examples
///
/// ```
/// use sentry_client::pagination::collect_pages;
///
/// # async fn example() -> sentry_client::Result<()> {
/// let records = collect_pages("/first".to_string(), 10, |target| async move {
///     Ok(match target.as_str() {
///         "/first" => (vec![1, 2], Some("/second".to_string())),
///         _ => (vec![3], None),
///     })
/// })
/// .await?;
///
/// assert_eq!(records, vec![1, 2, 3]);
/// # Ok(())
/// # }
/// ```
pub async fn collect_pages<R, F, Fut>(start: String, max_pages: u32, mut fetch_page: F) -> Result<Vec<R>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<(Vec<R>, Option<String>)>>,
{
    let mut records = Vec::new();
    let mut pages = 0u32;
    let mut target = Some(start);

    while let Some(current) = target.take().filter(|t| !t.is_empty()) {
        if pages >= max_pages {
            warn!(max_pages, next = %current, "page ceiling reached with more results advertised");
            return Err(Error::PageLimitExceeded { max_pages });
        }

        let (batch, next) = fetch_page(current).await?;
        pages += 1;
        debug!(page = pages, count = batch.len(), has_next = next.is_some(), "collected page");

        records.extend(batch);
        target = next;
    }

    Ok(records)
}

/// Extracts the next-page URL from a `Link` header value.
///
/// Returns the URL of the `rel="next"` entry, unless that entry reports
/// `results="false"`.
///
/// # Examples
///
/// ```
/// use sentry_client::pagination::next_page_target;
///
/// let link = r#"<https://sentry.io/api/0/projects/?&cursor=0:100:0>; rel="next"; results="true"; cursor="0:100:0""#;
/// assert_eq!(
///     next_page_target(link).as_deref(),
///     Some("https://sentry.io/api/0/projects/?&cursor=0:100:0")
/// );
///
/// let done = r#"<https://sentry.io/api/0/projects/?&cursor=0:200:0>; rel="next"; results="false"; cursor="0:200:0""#;
/// assert_eq!(next_page_target(done), None);
/// ```
#[must_use]
pub fn next_page_target(link_header: &str) -> Option<String> {
    link_entries(link_header)
        .filter_map(parse_link)
        .find(|link| link.rel == Some("next"))
        .filter(|link| link.results != Some("false"))
        .map(|link| link.url.to_string())
}

/// Splits a `Link` header on the commas that separate entries, ignoring
/// commas inside `<...>` URLs.
fn link_entries(header: &str) -> impl Iterator<Item = &str> {
    let mut in_url = false;
    header
        .split(move |c: char| match c {
            '<' => {
                in_url = true;
                false
            }
            '>' => {
                in_url = false;
                false
            }
            ',' => !in_url,
            _ => false,
        })
        .filter(|entry| !entry.trim().is_empty())
}

/// One entry of a `Link` header.
#[derive(Debug, PartialEq, Eq)]
struct Link<'a> {
    url: &'a str,
    rel: Option<&'a str>,
    results: Option<&'a str>,
}

fn parse_link(entry: &str) -> Option<Link<'_>> {
    let (url, params) = entry.trim().strip_prefix('<')?.split_once('>')?;

    let mut link = Link {
        url,
        rel: None,
        results: None,
    };
    for param in params.split(';') {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key.trim() {
            "rel" => link.rel = Some(value),
            "results" => link.results = Some(value),
            _ => {}
        }
    }

    Some(link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    type Pages = HashMap<String, (Vec<u32>, Option<String>)>;

    fn pages(entries: &[(&str, &[u32], Option<&str>)]) -> Pages {
        entries
            .iter()
            .map(|(target, records, next)| {
                (
                    (*target).to_string(),
                    (records.to_vec(), next.map(str::to_string)),
                )
            })
            .collect()
    }

    fn lookup(pages: &Pages, target: &str) -> Result<(Vec<u32>, Option<String>)> {
        pages.get(target).cloned().ok_or(Error::Status {
            status: 404,
            detail: None,
        })
    }

    #[tokio::test]
    async fn concatenates_pages_in_order() {
        let pages = pages(&[
            ("/p1", &[1, 2], Some("/p2")),
            ("/p2", &[3, 4], Some("/p3")),
            ("/p3", &[5], None),
        ]);
        let mut requested = Vec::new();

        let records = collect_pages("/p1".to_string(), 10, |target| {
            requested.push(target.clone());
            let page = lookup(&pages, &target);
            async move { page }
        })
        .await
        .unwrap();

        assert_eq!(records, vec![1, 2, 3, 4, 5]);
        assert_eq!(requested, vec!["/p1", "/p2", "/p3"]);
    }

    #[tokio::test]
    async fn empty_next_target_ends_loop() {
        let pages = pages(&[("/p1", &[1], Some(""))]);

        let records = collect_pages("/p1".to_string(), 10, |target| {
            let page = lookup(&pages, &target);
            async move { page }
        })
        .await
        .unwrap();

        assert_eq!(records, vec![1]);
    }

    #[tokio::test]
    async fn failure_discards_collected_records() {
        let pages = pages(&[("/p1", &[1, 2], Some("/missing"))]);

        let result = collect_pages("/p1".to_string(), 10, |target| {
            let page = lookup(&pages, &target);
            async move { page }
        })
        .await;

        assert!(matches!(result, Err(Error::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn cycling_cursor_hits_page_ceiling() {
        let pages = pages(&[("/loop", &[1], Some("/loop"))]);
        let mut calls = 0;

        let result = collect_pages("/loop".to_string(), 3, |target| {
            calls += 1;
            let page = lookup(&pages, &target);
            async move { page }
        })
        .await;

        assert!(matches!(result, Err(Error::PageLimitExceeded { max_pages: 3 })));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn exactly_max_pages_is_allowed() {
        let pages = pages(&[("/p1", &[1], Some("/p2")), ("/p2", &[2], None)]);

        let records = collect_pages("/p1".to_string(), 2, |target| {
            let page = lookup(&pages, &target);
            async move { page }
        })
        .await
        .unwrap();

        assert_eq!(records, vec![1, 2]);
    }

    #[test]
    fn next_page_from_sentry_link_header() {
        let header = concat!(
            r#"<https://sentry.io/api/0/organizations/acme/projects/?&cursor=0:0:1>; rel="previous"; results="false"; cursor="0:0:1", "#,
            r#"<https://sentry.io/api/0/organizations/acme/projects/?&cursor=0:100:0>; rel="next"; results="true"; cursor="0:100:0""#,
        );
        assert_eq!(
            next_page_target(header).as_deref(),
            Some("https://sentry.io/api/0/organizations/acme/projects/?&cursor=0:100:0")
        );
    }

    #[test]
    fn commas_inside_urls_do_not_split_entries() {
        let header = concat!(
            r#"<https://sentry.io/api/0/x/?field=a,b&cursor=0:0:1>; rel="previous"; results="false", "#,
            r#"<https://sentry.io/api/0/x/?field=a,b;c&cursor=0:100:0>; rel="next"; results="true""#,
        );
        assert_eq!(
            next_page_target(header).as_deref(),
            Some("https://sentry.io/api/0/x/?field=a,b;c&cursor=0:100:0")
        );
    }

    #[test]
    fn no_next_page_when_results_false() {
        let header = concat!(
            r#"<https://sentry.io/api/0/x/?&cursor=0:0:1>; rel="previous"; results="true"; cursor="0:0:1", "#,
            r#"<https://sentry.io/api/0/x/?&cursor=0:200:0>; rel="next"; results="false"; cursor="0:200:0""#,
        );
        assert_eq!(next_page_target(header), None);
    }

    #[test]
    fn no_next_page_without_next_relation() {
        let header = r#"<https://sentry.io/api/0/x/?&cursor=0:0:1>; rel="previous"; results="true""#;
        assert_eq!(next_page_target(header), None);
        assert_eq!(next_page_target(""), None);
        assert_eq!(next_page_target("garbage"), None);
    }

    #[test]
    fn next_page_without_results_param() {
        let header = r#"<https://example.com/page2>; rel="next""#;
        assert_eq!(
            next_page_target(header).as_deref(),
            Some("https://example.com/page2")
        );
    }
}
