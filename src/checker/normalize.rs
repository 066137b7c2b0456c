// src/checker/normalize.rs
// =============================================================================
// URL normalization and classification.
//
// A raw attribute value can be a local path ("docs/", "../img/a.png"), a
// remote URL ("https://example.com/x#top"), or something we never check
// ("mailto:me@example.com", "#section"). This module decides which, and
// produces the comparison forms the resolver and the HTTP checker use:
//
// - internal_form: path only, query and fragment dropped
// - external_form: scheme + host + path + query, fragment dropped
// - request_url:   ASCII-safe URL actually sent over the wire
//
// The comparison forms are plain string slicing and keep the URL as written.
// Only request_url goes through the `url` crate, which IDNA-encodes the host
// and percent-encodes the rest.
// =============================================================================

use url::Url;

// Prefixes that never point at a checkable resource (compared lowercased)
const IGNORABLE_PREFIXES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

const WEB_SCHEMES: &[&str] = &["http", "https"];

/// A URL cut into its five generic components.
///
/// Follows the usual "scheme://netloc/path?query#fragment" split without
/// validating anything. Missing parts are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitUrl<'a> {
    /// Lowercased scheme, empty if the URL has none
    pub scheme: String,
    pub netloc: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub fragment: &'a str,
}

impl<'a> SplitUrl<'a> {
    pub fn parse(url: &'a str) -> Self {
        let mut parts = SplitUrl::default();
        let mut rest = url;

        if let Some(colon) = url.find(':') {
            let candidate = &url[..colon];
            if is_scheme(candidate) {
                parts.scheme = candidate.to_ascii_lowercase();
                rest = &url[colon + 1..];
            }
        }

        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            parts.netloc = &after[..end];
            rest = &after[end..];
        }

        if let Some(hash) = rest.find('#') {
            parts.fragment = &rest[hash + 1..];
            rest = &rest[..hash];
        }

        if let Some(question) = rest.find('?') {
            parts.query = &rest[question + 1..];
            rest = &rest[..question];
        }

        parts.path = rest;
        parts
    }

    fn is_web(&self) -> bool {
        WEB_SCHEMES.contains(&self.scheme.as_str())
    }
}

// A scheme is a letter followed by letters, digits, '+', '-' or '.'
fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// Tabs and line breaks inside a URL are dropped before splitting
fn strip_line_breaks(url: &str) -> String {
    url.chars().filter(|c| !matches!(c, '\t' | '\r' | '\n')).collect()
}

/// Form used to look a reference up on disk.
///
/// URLs with any scheme are returned unchanged (they are never file paths);
/// everything else is reduced to its path.
pub fn internal_form(raw_url: &str) -> String {
    let url = raw_url.trim();
    let cleaned = strip_line_breaks(url);
    let parts = SplitUrl::parse(&cleaned);
    if parts.scheme.is_empty() {
        parts.path.to_string()
    } else {
        url.to_string()
    }
}

/// Form used to compare and dedupe remote URLs.
///
/// Non-web URLs are returned unchanged. The fragment never changes which
/// resource a server returns, so it is dropped.
pub fn external_form(raw_url: &str) -> String {
    let url = raw_url.trim();
    let cleaned = strip_line_breaks(url);
    let parts = SplitUrl::parse(&cleaned);
    if !parts.is_web() {
        return url.to_string();
    }

    let mut out = format!("{}://{}{}", parts.scheme, parts.netloc, parts.path);
    if !parts.query.is_empty() {
        out.push('?');
        out.push_str(parts.query);
    }
    out
}

/// ASCII-only URL for the outgoing request.
///
/// Returns an error for anything the `url` crate refuses to parse (bad
/// hostnames, invalid ports, ...).
pub fn request_url(url: &str) -> Result<Url, url::ParseError> {
    let mut parsed = Url::parse(url)?;
    parsed.set_fragment(None);
    Ok(parsed)
}

/// True for references that are never checked: empty values, same-page
/// anchors, and mailto:/tel:/javascript:/data: URLs.
pub fn is_ignorable(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() || url.starts_with('#') {
        return true;
    }

    let lower = url.to_ascii_lowercase();
    IGNORABLE_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

/// Where a reference gets routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefClass {
    /// Never checked and never counted
    Ignorable,
    /// http(s) URL, checked over the network
    External,
    /// Checked against the filesystem; holds the path to resolve
    Internal(String),
}

/// Classifies a raw URL as ignorable, external, or internal.
pub fn classify(raw_url: &str) -> RefClass {
    let form = internal_form(raw_url);
    if is_ignorable(&form) {
        return RefClass::Ignorable;
    }

    let parts = SplitUrl::parse(&form);
    if parts.is_web() {
        RefClass::External
    } else {
        RefClass::Internal(parts.path.to_string())
    }
}
