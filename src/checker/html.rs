// src/checker/html.rs
// =============================================================================
// This module extracts link references from raw HTML text.
//
// No DOM is built here. Two regular expressions scan the text instead:
// - TAG_RE finds every `<tag ...>` opening tag
// - ATTR_RE pulls `name=value` pairs out of the tag body
//
// Anything that doesn't match is skipped, so broken markup can never make the
// audit fail - it just contributes no references.
//
// Rust concepts:
// - LazyLock: Compile each regex once, on first use
// - Slices of tuples: A tiny read-only lookup table
// - Iterators: For splitting srcset candidate lists
// =============================================================================

use crate::checker::link::LinkRef;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

// Which attributes we care about, per tag.
// Tags missing from this table are ignored entirely.
const TAG_ATTRS: &[(&str, &[&str])] = &[
    ("a", &["href"]),
    ("img", &["src", "srcset"]),
    ("script", &["src"]),
    ("link", &["href"]),
    ("source", &["src", "srcset"]),
    ("video", &["src"]),
    ("audio", &["src"]),
    ("iframe", &["src"]),
];

// Attributes holding a comma-separated candidate list ("a.jpg 1x, b.jpg 2x")
const CANDIDATE_LIST_ATTRS: &[&str] = &["srcset"];

// <link rel=...> values that only warm up a connection and point at nothing
const RESOURCE_HINT_RELS: &[&str] = &["preconnect", "dns-prefetch"];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*([a-zA-Z][a-zA-Z0-9:-]*)\b([^>]*)>").expect("valid tag regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("valid attribute regex")
});

// "&name;", "&#39;", "&#x27;", plus the same forms missing their ";"
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[A-Za-z][A-Za-z0-9]*)(;?)").expect("valid entity regex")
});

// Named entities browsers still decode without a trailing ";"
const LEGACY_ENTITIES: &[&str] = &[
    "amp", "AMP", "lt", "LT", "gt", "GT", "quot", "QUOT", "nbsp", "copy", "COPY", "reg", "REG",
];

// Looks up the attributes to read for a (lowercased) tag name
fn attrs_for(tag: &str) -> Option<&'static [&'static str]> {
    TAG_ATTRS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, attrs)| *attrs)
}

// Parses the attribute list of one tag into a name -> value map.
//
// Names are lowercased and values are entity-decoded. If an attribute shows
// up twice, the later one wins.
fn parse_tag_attrs(tag_body: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();

    for caps in ATTR_RE.captures_iter(tag_body) {
        let Some(name) = caps.get(1) else { continue };
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());

        attrs.insert(name.as_str().to_ascii_lowercase(), decode_entities(value));
    }

    attrs
}

// Decodes character references in one pass, so "&amp;lt;" becomes "&lt;"
// and not "<". Numeric references decode with or without ";". A named
// reference without ";" decodes only through its longest legacy prefix:
// "&ampb=2" is "&b=2".
fn decode_entities(value: &str) -> String {
    ENTITY_RE
        .replace_all(value, |caps: &Captures| {
            let body = &caps[1];
            if !caps[2].is_empty() || body.starts_with('#') {
                return html_escape::decode_html_entities(&format!("&{};", body)).into_owned();
            }

            let legacy = LEGACY_ENTITIES
                .iter()
                .copied()
                .filter(|name| body.starts_with(*name))
                .max_by_key(|name| name.len());

            match legacy {
                Some(name) => format!(
                    "{}{}",
                    html_escape::decode_html_entities(&format!("&{};", name)),
                    &body[name.len()..]
                ),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

// True when a <link> tag is only a resource hint (preconnect, dns-prefetch)
fn is_resource_hint(attrs: &HashMap<String, String>) -> bool {
    attrs.get("rel").is_some_and(|rel| {
        rel.split_whitespace()
            .any(|r| RESOURCE_HINT_RELS.contains(&r.to_ascii_lowercase().as_str()))
    })
}

/// Extracts every checkable reference from an HTML document.
///
/// References come out in document order. A `srcset` value yields one
/// reference per candidate.
///
/// Example:
///   `<img src="a.png" srcset="b.png 1x, c.png 2x">` gives a.png, b.png, c.png
pub fn extract_links(html: &str, source_file: &Path) -> Vec<LinkRef> {
    let mut refs = Vec::new();

    for caps in TAG_RE.captures_iter(html) {
        let Some(name) = caps.get(1) else { continue };
        let tag = name.as_str().to_ascii_lowercase();

        let Some(wanted) = attrs_for(&tag) else { continue };

        let attrs = parse_tag_attrs(caps.get(2).map_or("", |m| m.as_str()));

        if tag == "link" && is_resource_hint(&attrs) {
            continue;
        }

        for attribute in wanted {
            if let Some(value) = attrs.get(*attribute) {
                refs.extend(expand_reference(source_file, &tag, attribute, value));
            }
        }
    }

    refs
}

/// Turns one attribute value into zero or more references.
///
/// Candidate-list attributes are split on commas and the first
/// whitespace-separated token of each entry is the URL. Everything else
/// yields the trimmed value, or nothing if it is empty.
pub fn expand_reference(source_file: &Path, tag: &str, attribute: &str, value: &str) -> Vec<LinkRef> {
    let raw = value.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    if CANDIDATE_LIST_ATTRS.contains(&attribute) {
        raw.split(',')
            .filter_map(|candidate| candidate.split_whitespace().next())
            .map(|url| LinkRef::new(source_file, tag, attribute, url))
            .collect()
    } else {
        vec![LinkRef::new(source_file, tag, attribute, raw)]
    }
}
