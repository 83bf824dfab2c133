//! The audit pipeline: walk, discover router, extract, reconcile, tier.
//! Strictly linear; nothing here writes to disk.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Error;
use crate::extractor::Extractor;
use crate::reconcile::{self, Reconciliation, RouteSet};
use crate::router::{self, RouterFile};
use crate::safety;
use crate::types::{ExternalLinkEntry, Fact, FindingKind, FreeTextViolation};
use crate::walker::{self, Candidate};

/// Everything the report needs, computed in one pass.
#[derive(Debug)]
pub struct Audit {
    /// Outbound links, in discovery order.
    pub external_links: Vec<ExternalLinkEntry>,
    /// Number of files walked.
    pub files_scanned: usize,
    /// Tiered free-text findings, in discovery order.
    pub free_text: Vec<FreeTextViolation>,
    /// How the router file was looked for, for the not-found marker.
    pub lookup: RouterLookup,
    /// Route and reference sets with path findings.
    pub reconciliation: Reconciliation,
    /// The router file, if one was found.
    pub router: Option<RouterFile>,
}

impl Audit {
    /// Count for one summary row.
    pub fn count(&self, kind: FindingKind) -> usize {
        return match kind {
            FindingKind::DeadNavigateCall => self.reconciliation.dead_calls.len(),
            FindingKind::DeadNavLink => self.reconciliation.dead_links.len(),
            FindingKind::DefinedRoute => self.reconciliation.routes.len(),
            FindingKind::ExternalLink => self.external_links.len(),
            FindingKind::FreeTextViolation => self.free_text.len(),
            FindingKind::OrphanedRoute => self.reconciliation.orphaned.len(),
        };
    }

    /// Whether any orphaned route, dead link, or dead call was found.
    pub fn has_route_defects(&self) -> bool {
        return [FindingKind::OrphanedRoute, FindingKind::DeadNavLink, FindingKind::DeadNavigateCall]
            .into_iter()
            .any(|kind| return self.count(kind) > 0);
    }
}

/// Where the router file was looked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterLookup {
    /// Canonical router path, relative to the project directory when possible.
    pub canonical: PathBuf,
    /// Fallback file name suffixes.
    pub suffixes: Vec<String>,
}

impl RouterLookup {
    /// Describe the lookup for the given policy and roots.
    fn new(config: &Config, root: &Path, project: &Path) -> Self {
        let canonical = root.join(&config.router_file);
        let canonical = canonical.strip_prefix(project).unwrap_or(&canonical).to_path_buf();
        return Self {
            canonical,
            suffixes: config.router_suffixes.clone(),
        };
    }
}

/// Keep only the external-link facts, in order.
fn collect_external_links(facts: &[Fact]) -> Vec<ExternalLinkEntry> {
    return facts
        .iter()
        .filter_map(|fact| {
            let Fact::ExternalLink { at, url } = fact else {
                return None;
            };
            return Some(ExternalLinkEntry {
                at: at.clone(),
                url: url.clone(),
            });
        })
        .collect();
}

/// Resolve the router file and collect only its defined routes.
///
/// # Errors
///
/// Returns root errors from the walker or `Error::InvalidPattern`.
pub fn defined_routes(
    config: &Config,
    project: &Path,
    root: &Path,
) -> Result<(Option<RouterFile>, RouteSet), Error> {
    let candidates = walker::walk(root, project, &config.extensions, &config.prune_dirs)?;
    let router = router::discover(&candidates, root, &config.router_file, &config.router_suffixes);
    let Some(found) = router.as_ref() else {
        return Ok((None, RouteSet::default()));
    };
    let extractor = Extractor::new(config, Some(found.path.clone()))?;
    let router_only: Vec<Candidate> = candidates.into_iter().filter(|c| return c.relative == found.path).collect();
    let facts = extractor.extract_all(&router_only, NonZeroUsize::MIN);
    return Ok((router, reconcile::reconcile(&facts).routes));
}

/// Run the full audit over `root`, reporting paths relative to `project`.
///
/// # Errors
///
/// Returns `Error::RootNotFound`, `Error::RootNotDirectory`, or
/// `Error::RootUnreadable` before any extraction begins, or
/// `Error::InvalidPattern` for a bad policy pattern.
pub fn run(config: &Config, project: &Path, root: &Path, jobs: NonZeroUsize) -> Result<Audit, Error> {
    let candidates = walker::walk(root, project, &config.extensions, &config.prune_dirs)?;
    let router = router::discover(&candidates, root, &config.router_file, &config.router_suffixes);
    let extractor = Extractor::new(config, router.as_ref().map(|r| return r.path.clone()))?;

    let facts = extractor.extract_all(&candidates, jobs);
    tracing::info!(files = candidates.len(), facts = facts.len(), "extraction complete");

    let reconciliation = reconcile::reconcile(&facts);
    let free_text = safety::classify(&facts);
    let external_links = collect_external_links(&facts);

    return Ok(Audit {
        external_links,
        files_scanned: candidates.len(),
        free_text,
        lookup: RouterLookup::new(config, root, project),
        reconciliation,
        router,
    });
}
