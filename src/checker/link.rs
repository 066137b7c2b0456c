// src/checker/link.rs
// =============================================================================
// The two records every stage of the audit passes around.
//
// - LinkRef: one reference found in a document (before any checking)
// - Finding: a LinkRef that failed its check, plus the reason
//
// Both are plain immutable values. A LinkRef that checks out is simply
// dropped; one that fails is moved into a Finding.
// =============================================================================

use serde::Serialize;
use std::path::PathBuf;

/// A single reference discovered in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    /// Path of the HTML document that contains the reference
    pub source_file: PathBuf,
    /// Lowercased tag name, e.g. "img"
    pub tag: String,
    /// Lowercased attribute name, e.g. "srcset"
    pub attribute: String,
    /// The URL exactly as written in the markup (after entity decoding)
    pub raw_url: String,
}

impl LinkRef {
    pub fn new(source_file: impl Into<PathBuf>, tag: &str, attribute: &str, raw_url: &str) -> Self {
        LinkRef {
            source_file: source_file.into(),
            tag: tag.to_string(),
            attribute: attribute.to_string(),
            raw_url: raw_url.to_string(),
        }
    }
}

/// Which check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A local file that does not exist
    Internal,
    /// A remote URL that did not answer successfully
    External,
}

/// A reference that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: FindingKind,
    /// Human-readable cause, e.g. "Not found: docs/index.html"
    pub message: String,
    pub link: LinkRef,
}

impl Finding {
    pub fn internal(message: String, link: LinkRef) -> Self {
        Finding { kind: FindingKind::Internal, message, link }
    }

    pub fn external(message: String, link: LinkRef) -> Self {
        Finding { kind: FindingKind::External, message, link }
    }
}
