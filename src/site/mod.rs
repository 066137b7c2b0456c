// src/site/mod.rs
// =============================================================================
// This module audits a static site directory.
//
// Features:
// - Scans the top-level *.html files of a directory
// - Checks internal references against the filesystem as it goes
// - Checks external references once at the end (optional)
// - Summarises everything in an AuditReport with an exit code
// =============================================================================

mod scan;

// Re-export the audit entry point and its types
pub use scan::{audit, AuditOptions, AuditReport};
