//! Report builder: renders an [`Audit`] as a markdown document, writes it
//! once, and summarizes the run for the terminal.
//!
//! The body (everything after the title block) depends only on the audit,
//! so an unchanged tree always renders the same body and the same digest.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use sha2::{Digest as _, Sha256};

use crate::audit::Audit;
use crate::error::Error;
use crate::router::Resolution;
use crate::safety;
use crate::types::{FindingKind, PathFinding, Tier};

/// Marker rendered for an empty section.
const NONE_FOUND: &str = "None found.";

/// Machine-readable run summary, printed with `--json`.
#[derive(Debug, Serialize)]
pub struct Summary {
    /// Hex SHA-256 of the report body.
    pub body_digest: String,
    /// Count per category, in report order.
    pub counts: Vec<SummaryRow>,
    /// Files walked.
    pub files_scanned: usize,
    /// Free-text findings lacking a safety comment.
    pub needs_review: usize,
    /// Where the report was written.
    pub report: PathBuf,
    /// Router file, or `None` when not found.
    pub router: Option<PathBuf>,
}

/// One category count.
#[derive(Debug, Serialize)]
pub struct SummaryRow {
    /// Number of findings.
    pub count: usize,
    /// Category.
    pub kind: FindingKind,
}

/// Hex SHA-256 of a rendered body.
pub fn body_digest(body: &str) -> String {
    let hash = Sha256::digest(body.as_bytes());
    return format!("{hash:x}");
}

/// Default report location: `<project>/<report_dir>/ROUTE_AUDIT_<date>.md`.
pub fn default_path(project: &Path, report_dir: &Path, generated: &DateTime<Local>) -> PathBuf {
    let date = generated.format("%Y-%m-%d");
    return project.join(report_dir).join(format!("ROUTE_AUDIT_{date}.md"));
}

/// Print the short human-readable summary to stdout.
pub fn print_summary(audit: &Audit, report_path: &Path) {
    println!("Audit complete. Report saved to {}", report_path.display());
    println!();
    for kind in FindingKind::REPORT_ORDER {
        println!("  {:<40} {}", kind.label(), audit.count(kind));
    }
    let review = safety::count_in(&audit.free_text, Tier::NeedsReview);
    if review > 0 {
        println!();
        println!("{review} free-text input(s) need review.");
    }
    return;
}

/// Render the full document: title block, then the body.
pub fn render(audit: &Audit, generated: &DateTime<Local>) -> String {
    let body = render_body(audit);
    let mut out = String::new();
    out.push_str("# Route Audit Report\n\n");
    let _ = writeln!(out, "**Generated:** {}  ", generated.format("%Y-%m-%d %H:%M:%S %:z"));
    let _ = writeln!(out, "**Router file:** {}  ", render_router_identity(audit));
    let _ = writeln!(out, "**Files scanned:** {}  ", audit.files_scanned);
    let _ = writeln!(out, "**Body digest:** `{}`  ", body_digest(&body));
    out.push_str("**Read-only audit: no inspected files were modified.**\n\n---\n\n");
    out.push_str(&body);
    return out;
}

/// Render every section after the title block. Deterministic for a given audit.
pub fn render_body(audit: &Audit) -> String {
    let mut out = String::new();
    render_summary_table(&mut out, audit);
    render_defined_routes(&mut out, audit);
    render_orphaned(&mut out, audit);
    render_path_findings(
        &mut out,
        "## 3. Dead Nav Links",
        "> Links in navigation components with no matching route.",
        &audit.reconciliation.dead_links,
    );
    render_path_findings(
        &mut out,
        "## 4. Dead Navigate Calls",
        "> Programmatic navigation or `to=` attributes pointing at undefined routes.",
        &audit.reconciliation.dead_calls,
    );
    render_free_text(&mut out, audit);
    render_external_links(&mut out, audit);
    out.push_str("---\n\n*Audit complete. No inspected files were modified.*\n");
    return out;
}

/// Section 1: every distinct defined route, or the router-not-found marker.
fn render_defined_routes(out: &mut String, audit: &Audit) {
    out.push_str("## 1. Defined Routes\n\n");
    if audit.router.is_none() {
        let suffixes = audit
            .lookup
            .suffixes
            .iter()
            .map(|s| return format!("`{s}`"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "> Router not found. Looked for `{}`, then for files ending in {suffixes}.\n> No routes could be checked; every root-relative reference below is reported as dead.\n",
            audit.lookup.canonical.display(),
        );
        return;
    }
    if audit.reconciliation.routes.is_empty() {
        let _ = writeln!(out, "{NONE_FOUND}\n");
        return;
    }
    for route in audit.reconciliation.routes.iter() {
        let marker = if route.path.has_parameter() { " (parameterized)" } else { "" };
        let _ = writeln!(out, "- `{}`{marker} at `{}`", route.path.as_str(), route.at);
    }
    out.push('\n');
    return;
}

/// Section 6: outbound link inventory.
fn render_external_links(out: &mut String, audit: &Audit) {
    out.push_str("## 6. External Links\n\n");
    out.push_str("> Outbound `href` targets. Check for localhost, staging, or dead domains.\n\n");
    if audit.external_links.is_empty() {
        let _ = writeln!(out, "{NONE_FOUND}\n");
        return;
    }
    for link in &audit.external_links {
        let _ = writeln!(out, "- `{}` at `{}`", link.url, link.at);
    }
    out.push('\n');
    return;
}

/// Section 5: free-text inputs in sensitive contexts, both tiers.
fn render_free_text(out: &mut String, audit: &Audit) {
    out.push_str("## 5. Free-Text Inputs in Sensitive Contexts\n\n");
    out.push_str("> Free-text fields in sensitive forms must be display-only and never persisted.\n");
    out.push_str("> Entries without a safety comment need manual review.\n\n");
    if audit.free_text.is_empty() {
        let _ = writeln!(out, "{NONE_FOUND}\n");
        return;
    }
    for violation in &audit.free_text {
        let _ = writeln!(out, "- **{}** line {}: {}", violation.at.file.display(), violation.at.line, violation.tier.label());
        let _ = writeln!(out, "  ```\n  {}\n  ```", violation.text);
    }
    out.push('\n');
    return;
}

/// Section 2: orphaned routes.
fn render_orphaned(out: &mut String, audit: &Audit) {
    out.push_str("## 2. Orphaned Routes\n\n");
    out.push_str("> Defined routes with no nav link, `to=` attribute, or navigate call pointing at them.\n");
    out.push_str("> The root path, the catch-all, and parameterized routes are never listed.\n");
    let _ = writeln!(out, "> {} distinct path(s) are referenced.\n", audit.reconciliation.references.len());
    if audit.reconciliation.orphaned.is_empty() {
        let _ = writeln!(out, "{NONE_FOUND}\n");
        return;
    }
    for route in &audit.reconciliation.orphaned {
        let _ = writeln!(out, "- `{}` defined at `{}`: add a nav entry or remove the route", route.path.as_str(), route.at);
    }
    out.push('\n');
    return;
}

/// A dead-reference section, one line per occurrence.
fn render_path_findings(out: &mut String, heading: &str, blurb: &str, findings: &[PathFinding]) {
    let _ = writeln!(out, "{heading}\n\n{blurb}\n");
    if findings.is_empty() {
        let _ = writeln!(out, "{NONE_FOUND}\n");
        return;
    }
    for finding in findings {
        if finding.path.raw() == finding.path.as_str() {
            let _ = writeln!(out, "- `{}` at `{}`", finding.path.as_str(), finding.at);
        } else {
            let _ = writeln!(out, "- `{}` (written `{}`) at `{}`", finding.path.as_str(), finding.path.raw(), finding.at);
        }
    }
    out.push('\n');
    return;
}

/// Router path with how it was resolved.
fn render_router_identity(audit: &Audit) -> String {
    return match &audit.router {
        None => "NOT FOUND".to_string(),
        Some(router) => {
            let how = match router.resolution {
                Resolution::Canonical => "canonical",
                Resolution::Fallback => "fallback",
            };
            format!("`{}` ({how})", router.path.display())
        },
    };
}

/// Summary table, one row per category.
fn render_summary_table(out: &mut String, audit: &Audit) {
    out.push_str("## Summary\n\n| Finding | Count |\n|---------|-------|\n");
    for kind in FindingKind::REPORT_ORDER {
        let _ = writeln!(out, "| {} | {} |", kind.label(), audit.count(kind));
    }
    let review = safety::count_in(&audit.free_text, Tier::NeedsReview);
    let _ = writeln!(out, "| Free-text inputs needing review | {review} |\n");
    return;
}

/// Build the machine-readable summary.
pub fn summarize(audit: &Audit, body: &str, report_path: &Path) -> Summary {
    return Summary {
        body_digest: body_digest(body),
        counts: FindingKind::REPORT_ORDER
            .into_iter()
            .map(|kind| {
                return SummaryRow {
                    count: audit.count(kind),
                    kind,
                };
            })
            .collect(),
        files_scanned: audit.files_scanned,
        needs_review: safety::count_in(&audit.free_text, Tier::NeedsReview),
        report: report_path.to_path_buf(),
        router: audit.router.as_ref().map(|r| return r.path.clone()),
    };
}

/// Write the report, creating its parent directory. This is the only write
/// the tool performs.
///
/// # Errors
///
/// Returns `Error::ReportWrite` if the directory or file cannot be written.
pub fn write(path: &Path, content: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| return !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| {
            return Error::ReportWrite {
                path: path.to_path_buf(),
                source,
            };
        })?;
    }
    std::fs::write(path, content).map_err(|source| {
        return Error::ReportWrite {
            path: path.to_path_buf(),
            source,
        };
    })?;
    tracing::info!(report = %path.display(), "report written");
    return Ok(());
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::config::Config;

    fn write_file(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn audit_of(dir: &Path) -> Audit {
        crate::audit::run(&Config::default(), dir, &dir.join("src"), NonZeroUsize::MIN).unwrap()
    }

    #[test]
    fn body_is_stable_and_timestamp_lives_in_the_title_block() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "src/App.tsx", "<Route path=\"/legacy\" />\n");
        let first = render(&audit_of(dir.path()), &Local::now());
        let second = render(&audit_of(dir.path()), &Local::now());
        let strip = |doc: &str| -> String {
            doc.lines().filter(|l| !l.starts_with("**Generated:**")).collect::<Vec<_>>().join("\n")
        };
        assert_eq!(strip(&first), strip(&second));
        let body = render_body(&audit_of(dir.path()));
        assert!(first.ends_with(&body));
        assert!(first.contains(&body_digest(&body)));
    }

    #[test]
    fn default_path_carries_the_date() {
        let generated = Local::now();
        let path = default_path(Path::new("proj"), Path::new("reports"), &generated);
        let expected = format!("ROUTE_AUDIT_{}.md", generated.format("%Y-%m-%d"));
        assert_eq!(path, Path::new("proj").join("reports").join(expected));
    }

    #[test]
    fn empty_sections_render_the_none_marker() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "src/App.tsx", "<Route path=\"/\" />\n");
        let body = render_body(&audit_of(dir.path()));
        assert_eq!(body.matches(NONE_FOUND).count(), 5);
        assert!(body.contains("- `/` at `src/App.tsx:1`"));
    }

    #[test]
    fn missing_router_renders_explicit_marker() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "src/pages/Home.tsx", "navigate(\"/a\");\n");
        let audit = audit_of(dir.path());
        let doc = render(&audit, &Local::now());
        assert!(doc.contains("**Router file:** NOT FOUND"));
        assert!(doc.contains("> Router not found. Looked for `src/App.tsx`"));
        assert!(doc.contains("- `/a` at `src/pages/Home.tsx:1`"));
    }

    #[test]
    fn summary_rows_follow_report_order() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "src/App.tsx", "<Route path=\"/a\" />\n");
        let audit = audit_of(dir.path());
        let body = render_body(&audit);
        let summary = summarize(&audit, &body, Path::new("r.md"));
        let kinds: Vec<FindingKind> = summary.counts.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, FindingKind::REPORT_ORDER.to_vec());
        assert_eq!(summary.counts[1].count, 1);
        assert_eq!(summary.router, Some(PathBuf::from("src/App.tsx")));
    }

    #[test]
    fn write_creates_the_reports_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("r.md");
        write(&path, "# r\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# r\n");
    }
}
