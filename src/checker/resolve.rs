// src/checker/resolve.rs
// =============================================================================
// Maps internal references onto the filesystem and checks they exist.
//
// Rules, in order:
// 1. An empty path resolves to nothing (nothing to check)
// 2. "/x" is relative to the scan root, "x" to the referencing document
// 3. A path ending in "/" means "the index.html in that directory"
// 4. Symlinks and ".." are resolved against the real filesystem for the
//    part of the path that exists; the missing tail is folded lexically
//
// Existence is lenient the way static hosts are: "/blog" is fine if either
// "blog" or "blog.html" exists. Anything that lands outside the scan root is
// reported as missing.
// =============================================================================

use crate::checker::link::{Finding, LinkRef};
use log::debug;
use std::fs;
use std::path::{Component, Path, PathBuf};

const DIRECTORY_INDEX: &str = "index.html";

/// Resolves an internal path to an absolute filesystem target.
///
/// `root` must be absolute and canonical. Returns None when there is nothing
/// to resolve.
pub fn resolve_target(root: &Path, source_file: &Path, path: &str) -> Option<PathBuf> {
    if path.is_empty() {
        return None;
    }

    let mut candidate = if path.starts_with('/') {
        root.join(path.trim_start_matches('/'))
    } else {
        source_file.parent().unwrap_or(root).join(path)
    };

    // Covers the bare root "/" too: root.join("") + index.html
    if path.ends_with('/') {
        candidate.push(DIRECTORY_INDEX);
    }

    Some(resolve_real(&candidate))
}

// Walks the path one component at a time. Every prefix that exists is
// canonicalized, so a ".." after a symlink steps out of the link's target,
// not out of the directory holding the link. Once a prefix is missing the
// rest is joined as-is, with ".." popping the last component. Never fails.
fn resolve_real(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(name) => {
                out.push(name);
                if let Ok(real) = fs::canonicalize(&out) {
                    out = real;
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// True if the target exists inside `root`, either as-is or (for
/// extension-less paths) with ".html" appended.
pub fn target_exists(root: &Path, target: &Path) -> bool {
    if !target.starts_with(root) {
        return false;
    }

    if target.exists() {
        return true;
    }

    target.extension().is_none() && target.with_extension("html").exists()
}

/// Checks one resolved target and produces a Finding if it is missing.
pub fn check_internal(root: &Path, target: &Path, link: LinkRef) -> Option<Finding> {
    if target_exists(root, target) {
        debug!("ok: {} -> {}", link.raw_url, target.display());
        return None;
    }

    let shown = target.strip_prefix(root).unwrap_or(target);
    Some(Finding::internal(format!("Not found: {}", shown.display()), link))
}
