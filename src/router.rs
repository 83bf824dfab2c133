//! Router-file discovery. The chosen file, and how it was chosen, is part of
//! every report.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::walker::Candidate;

/// How the authoritative router file was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The configured canonical file exists.
    Canonical,
    /// The canonical file is absent; the first walked file with a router suffix was used.
    Fallback,
}

/// The router file treated as the source of defined routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterFile {
    /// Path relative to the project directory.
    pub path: PathBuf,
    /// How it was found.
    pub resolution: Resolution,
}

/// Pick the router file from the walked candidates.
///
/// The canonical file (`root/canonical`) wins when it was walked. Otherwise
/// the first candidate, in walk order, whose file name ends with one of
/// `suffixes` is used. Returns `None` when neither exists; the caller reports
/// that explicitly instead of failing.
pub fn discover(
    candidates: &[Candidate],
    root: &Path,
    canonical: &Path,
    suffixes: &[String],
) -> Option<RouterFile> {
    let canonical_path = root.join(canonical);
    if let Some(found) = candidates.iter().find(|c| return c.absolute == canonical_path) {
        tracing::info!(router = %found.relative.display(), "using canonical router file");
        return Some(RouterFile {
            path: found.relative.clone(),
            resolution: Resolution::Canonical,
        });
    }

    let fallback = candidates.iter().find(|c| {
        let name = c.relative.file_name().map(|n| return n.to_string_lossy()).unwrap_or_default();
        return suffixes.iter().any(|s| return name.ends_with(s.as_str()));
    });
    let Some(found) = fallback else {
        tracing::warn!(canonical = %canonical_path.display(), "no router file found");
        return None;
    };
    tracing::info!(router = %found.relative.display(), "canonical router absent, using fallback");
    return Some(RouterFile {
        path: found.relative.clone(),
        resolution: Resolution::Fallback,
    });
}
