// src/checker/http.rs
// =============================================================================
// This module checks if external URLs are alive by making HTTP requests.
//
// Key functionality:
// - Dedupes URLs (fragment ignored) so each resource is fetched once
// - Caps how many unique URLs get checked
// - Makes one GET at a time, sleeping between requests to stay polite
// - Turns status codes and transport errors into readable reasons
//
// Checks are strictly sequential. The cap means "the first N unique URLs in
// document order", and that only holds if nothing runs out of order.
//
// Rust concepts:
// - async/await: reqwest and tokio's sleep are async
// - Result<(), String>: A check either passes or gives a reason
// - HashSet: For first-seen deduplication
// =============================================================================

use crate::checker::link::{Finding, LinkRef};
use crate::checker::normalize::{external_form, request_url};
use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::{header, Client, StatusCode};
use std::collections::HashSet;
use std::time::Duration;

/// Identifies us to the servers we check.
pub const USER_AGENT: &str = concat!(
    "site-link-audit/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/vswaroop04/site-link-audit)"
);

/// Prefer HTML, accept anything.
pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Tuning for the external pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalOptions {
    /// Maximum number of unique URLs to check
    pub limit: usize,
    /// Pause between two consecutive requests
    pub delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ExternalOptions {
    fn default() -> Self {
        ExternalOptions {
            limit: 80,
            delay: Duration::from_millis(150),
            timeout: Duration::from_secs(8),
        }
    }
}

/// Outcome of the external pass.
#[derive(Debug, Default)]
pub struct ExternalReport {
    /// Unique URLs actually requested (never more than the limit)
    pub checked: usize,
    pub findings: Vec<Finding>,
}

/// Dedupes references by their external form, keeping the first reference
/// seen for each URL. Order is preserved.
pub fn dedup_external(refs: Vec<LinkRef>) -> Vec<(String, LinkRef)> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for link in refs {
        let url = external_form(&link.raw_url);
        if seen.insert(url.clone()) {
            unique.push((url, link));
        }
    }

    unique
}

/// Builds the HTTP client shared by every check.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("failed to create HTTP client")
}

/// Checks external references and returns the failures.
///
/// This is the main entry point for external checking. References are
/// deduped, capped at `options.limit`, then requested one by one.
pub async fn check_external(refs: Vec<LinkRef>, options: &ExternalOptions) -> Result<ExternalReport> {
    let mut targets = dedup_external(refs);
    targets.truncate(options.limit);

    if targets.is_empty() {
        return Ok(ExternalReport::default());
    }

    let client = build_client(options.timeout)?;
    let total = targets.len();
    let mut report = ExternalReport { checked: total, findings: Vec::new() };

    for (index, (url, link)) in targets.into_iter().enumerate() {
        info!("[{}/{}] GET {}", index + 1, total, url);

        if let Err(reason) = check_url(&client, &url).await {
            debug!("broken: {} ({})", url, reason);
            report.findings.push(Finding::external(format!("{}: {}", reason, url), link));
        }

        if index + 1 < total && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    Ok(report)
}

/// Requests a single URL. Ok(()) means the link is alive.
///
/// The error string is the human-readable reason, e.g. "HTTP 404".
pub async fn check_url(client: &Client, url: &str) -> std::result::Result<(), String> {
    let request = request_url(url).map_err(|e| format!("Error: invalid URL ({})", e))?;

    match client.get(request).header(header::ACCEPT, ACCEPT).send().await {
        Ok(response) => classify_status(response.status()),
        Err(e) => Err(describe_error(&e)),
    }
}

// Anything 2xx/3xx is alive. 403 and 429 usually mean the server
// refuses bots rather than that the page is gone, so say so.
fn classify_status(status: StatusCode) -> std::result::Result<(), String> {
    let code = status.as_u16();
    match code {
        200..=399 => Ok(()),
        403 | 429 => Err(format!(
            "HTTP {} (possibly blocked by bot protection or rate limiting)",
            code
        )),
        _ => Err(format!("HTTP {}", code)),
    }
}

// Network-level problems become "URL error: ...", everything else "Error: ..."
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "URL error: timed out".to_string()
    } else if error.is_redirect() {
        "URL error: too many redirects".to_string()
    } else if error.is_connect() {
        format!("URL error: {}", root_cause(error))
    } else {
        format!("Error: {}", error)
    }
}

// reqwest wraps the interesting part (DNS failure, connection refused, ...)
// a few sources deep
fn root_cause(error: &reqwest::Error) -> String {
    let mut cause: &dyn std::error::Error = error;
    while let Some(source) = cause.source() {
        cause = source;
    }
    cause.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::path::Path;
    use std::time::Instant;

    fn link(url: &str) -> LinkRef {
        LinkRef::new(Path::new("index.html"), "a", "href", url)
    }

    fn fast_options(limit: usize) -> ExternalOptions {
        ExternalOptions {
            limit,
            delay: Duration::ZERO,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_dedup_ignores_fragment() {
        let unique = dedup_external(vec![
            link("https://x.test/p#a"),
            link("https://x.test/p#b"),
            link("https://x.test/q"),
        ]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].0, "https://x.test/p");
        assert_eq!(unique[0].1.raw_url, "https://x.test/p#a");
        assert_eq!(unique[1].0, "https://x.test/q");
    }

    #[test]
    fn test_dedup_keeps_query() {
        let unique = dedup_external(vec![link("https://x.test/p?a=1"), link("https://x.test/p?a=2")]);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::OK).is_ok());
        assert!(classify_status(StatusCode::NOT_MODIFIED).is_ok());
        assert_eq!(classify_status(StatusCode::NOT_FOUND), Err("HTTP 404".to_string()));
        assert_eq!(classify_status(StatusCode::INTERNAL_SERVER_ERROR), Err("HTTP 500".to_string()));
        let forbidden = classify_status(StatusCode::FORBIDDEN).unwrap_err();
        assert!(forbidden.starts_with("HTTP 403 (possibly blocked"));
        let limited = classify_status(StatusCode::TOO_MANY_REQUESTS).unwrap_err();
        assert!(limited.starts_with("HTTP 429 (possibly blocked"));
    }

    #[tokio::test]
    async fn test_check_url_sends_identity_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/ok")
                    .header("user-agent", USER_AGENT)
                    .header("accept", ACCEPT);
                then.status(200).body("<html></html>");
            })
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        assert_eq!(check_url(&client, &server.url("/ok")).await, Ok(()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_check_url_follows_redirect() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/old");
                then.status(301).header("location", "/new");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/new");
                then.status(200);
            })
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        assert_eq!(check_url(&client, &server.url("/old")).await, Ok(()));
    }

    #[tokio::test]
    async fn test_check_url_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone");
                then.status(404);
            })
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        assert_eq!(check_url(&client, &server.url("/gone")).await, Err("HTTP 404".to_string()));
    }

    #[tokio::test]
    async fn test_check_url_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_millis(1500));
            })
            .await;

        let client = build_client(Duration::from_millis(200)).unwrap();
        let reason = check_url(&client, &server.url("/slow")).await.unwrap_err();
        assert_eq!(reason, "URL error: timed out");
    }

    #[tokio::test]
    async fn test_check_url_connection_refused() {
        let client = build_client(Duration::from_secs(5)).unwrap();
        let reason = check_url(&client, "http://127.0.0.1:1/").await.unwrap_err();
        assert!(reason.starts_with("URL error: "), "{reason}");
    }

    #[tokio::test]
    async fn test_check_external_dedupes_and_reports() {
        let server = MockServer::start_async().await;
        let ok = server
            .mock_async(|when, then| {
                when.method(GET).path("/ok");
                then.status(200);
            })
            .await;
        let missing = server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let refs = vec![
            link(&server.url("/ok#a")),
            link(&server.url("/missing")),
            link(&server.url("/ok#b")),
        ];
        let report = check_external(refs, &fast_options(80)).await.unwrap();

        assert_eq!(report.checked, 2);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].message, format!("HTTP 404: {}", server.url("/missing")));
        assert_eq!(report.findings[0].link.raw_url, server.url("/missing"));
        ok.assert_hits_async(1).await;
        missing.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_check_external_respects_limit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(500);
            })
            .await;

        let refs = vec![
            link(&server.url("/a")),
            link(&server.url("/b")),
            link(&server.url("/c")),
        ];
        let report = check_external(refs, &fast_options(2)).await.unwrap();

        assert_eq!(report.checked, 2);
        let broken: Vec<_> = report.findings.iter().map(|f| f.link.raw_url.clone()).collect();
        assert_eq!(broken, vec![server.url("/a"), server.url("/b")]);
        mock.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_zero_limit_makes_no_requests() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(404);
            })
            .await;

        let report = check_external(vec![link(&server.url("/a"))], &fast_options(0))
            .await
            .unwrap();

        assert_eq!(report.checked, 0);
        assert!(report.findings.is_empty());
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_delay_between_requests_only() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200);
            })
            .await;

        let options = ExternalOptions {
            delay: Duration::from_millis(200),
            ..fast_options(80)
        };
        let refs = vec![
            link(&server.url("/a")),
            link(&server.url("/b")),
            link(&server.url("/c")),
        ];

        let started = Instant::now();
        let report = check_external(refs, &options).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(report.checked, 3);
        mock.assert_hits_async(3).await;
        // Two gaps between three requests, none after the last
        assert!(elapsed >= Duration::from_millis(400), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_single_request_does_not_sleep() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200);
            })
            .await;

        let options = ExternalOptions {
            delay: Duration::from_secs(2),
            ..fast_options(80)
        };

        let started = Instant::now();
        let report = check_external(vec![link(&server.url("/only"))], &options).await.unwrap();

        assert_eq!(report.checked, 1);
        assert!(started.elapsed() < Duration::from_secs(1), "{:?}", started.elapsed());
    }
}
