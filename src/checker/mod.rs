// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - link: The LinkRef / Finding records shared by every stage
// - html: Extracts references from raw HTML text
// - normalize: Classifies URLs and builds their comparison forms
// - resolve: Checks internal references against the filesystem
// - http: Checks external references over the network
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

// Declare submodules (tells Rust to include these files)
mod html;
mod http;
mod link;
mod normalize;
mod resolve;

// Re-export public items from submodules
// This lets users write `checker::extract_links()` instead of
// `checker::html::extract_links()`
pub use html::extract_links;
pub use http::{check_external, ExternalOptions};
pub use link::{Finding, FindingKind, LinkRef};
pub use normalize::{classify, RefClass};
pub use resolve::{check_internal, resolve_target};
