// src/site/scan.rs
// =============================================================================
// This module drives a whole audit of one site directory.
//
// How it works:
// 1. List the *.html files directly inside the root (sorted, no recursion)
// 2. Extract and classify every reference in each file
// 3. Check internal references right away, file by file
// 4. Collect external references and check them once, at the end
//
// The scan root is passed in explicitly everywhere, so tests can point the
// audit at any temporary directory.
// =============================================================================

use crate::checker::{
    check_external, check_internal, classify, extract_links, resolve_target, ExternalOptions,
    Finding, FindingKind, LinkRef, RefClass,
};
use anyhow::Result;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything the audit needs besides the root.
#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Also check http(s) URLs over the network
    pub check_external: bool,
    pub external: ExternalOptions,
}

/// Result of auditing one site.
#[derive(Debug, Default)]
pub struct AuditReport {
    /// Absolute scan root; source paths in findings live under it
    pub root: PathBuf,
    /// Internal references that were resolved and checked
    pub internal_checked: usize,
    /// Unique external URLs checked, or None if external checking was off
    pub external_checked: Option<usize>,
    /// All failures, internal ones first, each group in discovery order
    pub findings: Vec<Finding>,
}

impl AuditReport {
    pub fn findings_of(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    pub fn internal_broken(&self) -> usize {
        self.findings_of(FindingKind::Internal).count()
    }

    pub fn external_broken(&self) -> usize {
        self.findings_of(FindingKind::External).count()
    }

    /// Path of a document relative to the scan root, for display.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Process exit status for this report.
    ///
    /// 2 if any internal link is broken (always wins), 3 if external
    /// checking ran and found a broken link, 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.internal_broken() > 0 {
            2
        } else if self.external_checked.is_some() && self.external_broken() > 0 {
            3
        } else {
            0
        }
    }
}

/// Lists the HTML documents directly inside `root`, sorted by file name.
///
/// A missing or unreadable root yields an empty list.
pub fn html_files(root: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "html"))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}

/// Reads a document as text. Invalid UTF-8 is replaced, not fatal.
pub fn read_document(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            None
        }
    }
}

/// Audits every HTML document directly inside `root`.
///
/// Only a failure to set up the HTTP client can make this return an error;
/// broken links of any kind end up in the report.
pub async fn audit(root: &Path, options: &AuditOptions) -> Result<AuditReport> {
    let root = fs::canonicalize(root)
        .or_else(|_| std::path::absolute(root))
        .unwrap_or_else(|_| root.to_path_buf());

    let mut report = AuditReport { root, ..Default::default() };
    let mut external_refs: Vec<LinkRef> = Vec::new();

    let files = html_files(&report.root);
    info!("Scanning {} HTML file(s) in {}", files.len(), report.root.display());

    for file in &files {
        let Some(text) = read_document(file) else { continue };

        for link in extract_links(&text, file) {
            match classify(&link.raw_url) {
                RefClass::Ignorable => {
                    debug!("ignored: {}", link.raw_url);
                }
                RefClass::External => external_refs.push(link),
                RefClass::Internal(path) => {
                    let Some(target) = resolve_target(&report.root, &link.source_file, &path) else {
                        continue;
                    };
                    report.internal_checked += 1;
                    if let Some(finding) = check_internal(&report.root, &target, link) {
                        report.findings.push(finding);
                    }
                }
            }
        }
    }

    if options.check_external {
        info!("Checking external links ({} reference(s))", external_refs.len());
        let external = check_external(external_refs, &options.external).await?;
        report.external_checked = Some(external.checked);
        report.findings.extend(external.findings);
    } else if !external_refs.is_empty() {
        info!(
            "Skipping {} external reference(s); pass --check-external to check them",
            external_refs.len()
        );
    }

    Ok(report)
}
