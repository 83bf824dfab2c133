//! Reconciler: builds the route and reference sets and derives the
//! orphaned, dead-link, and dead-call findings.
//!
//! Comparison uses normalized paths only. Output follows fact discovery
//! order, never set iteration order.

use std::collections::HashSet;

use crate::types::{Fact, PathFinding, PathString, Provenance};

/// Result of reconciling the whole fact list. Built once, never mutated.
#[derive(Debug)]
pub struct Reconciliation {
    /// Navigate-style references with no matching route, per occurrence.
    pub dead_calls: Vec<PathFinding>,
    /// Nav-link references with no matching route, per occurrence.
    pub dead_links: Vec<PathFinding>,
    /// Defined routes nothing references.
    pub orphaned: Vec<PathFinding>,
    /// Every referenced path.
    pub references: ReferenceSet,
    /// Every defined route.
    pub routes: RouteSet,
}

/// Deduplicated referenced paths from nav links and navigate calls.
#[derive(Debug, Default)]
pub struct ReferenceSet {
    /// Normalized members.
    members: HashSet<PathString>,
}

impl ReferenceSet {
    /// Whether the normalized path is referenced anywhere.
    pub fn contains(&self, path: &PathString) -> bool {
        return self.members.contains(path);
    }

    /// Number of distinct referenced paths.
    pub fn len(&self) -> usize {
        return self.members.len();
    }
}

/// Deduplicated defined routes in first-seen order.
#[derive(Debug, Default)]
pub struct RouteSet {
    /// Normalized members for lookups.
    members: HashSet<PathString>,
    /// Each distinct route with its first occurrence.
    ordered: Vec<PathFinding>,
}

impl RouteSet {
    /// Whether the normalized path is a defined route.
    pub fn contains(&self, path: &PathString) -> bool {
        return self.members.contains(path);
    }

    /// Add a route occurrence; repeats of a known route are ignored.
    fn insert(&mut self, path: &PathString, at: &Provenance) {
        if self.members.insert(path.clone()) {
            self.ordered.push(PathFinding {
                at: at.clone(),
                path: path.clone(),
            });
        }
        return;
    }

    /// Whether no routes were defined.
    pub fn is_empty(&self) -> bool {
        return self.ordered.is_empty();
    }

    /// Distinct routes with their first occurrence, in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, PathFinding> {
        return self.ordered.iter();
    }

    /// Number of distinct routes.
    pub fn len(&self) -> usize {
        return self.ordered.len();
    }
}

/// Whether a reference is dead: root-relative, concrete, and undefined.
fn is_dead(path: &PathString, routes: &RouteSet) -> bool {
    return path.as_str().starts_with('/') && !path.has_parameter() && !routes.contains(path);
}

/// Reconcile the complete fact list.
pub fn reconcile(facts: &[Fact]) -> Reconciliation {
    let mut routes = RouteSet::default();
    let mut references = ReferenceSet::default();
    for fact in facts {
        match fact {
            Fact::DefinedRoute { at, path } => routes.insert(path, at),
            Fact::NavigateCall { path, .. } | Fact::NavLink { path, .. } => {
                references.members.insert(path.clone());
            },
            Fact::ExternalLink { .. } | Fact::FreeTextInput { .. } => {},
        }
    }

    let orphaned: Vec<PathFinding> = routes
        .iter()
        .filter(|r| {
            return !references.contains(&r.path) && !r.path.is_root_or_catch_all() && !r.path.has_parameter();
        })
        .cloned()
        .collect();

    let mut dead_links = Vec::new();
    let mut dead_calls = Vec::new();
    for fact in facts {
        match fact {
            Fact::NavigateCall { at, path } if is_dead(path, &routes) => dead_calls.push(PathFinding {
                at: at.clone(),
                path: path.clone(),
            }),
            Fact::NavLink { at, path } if is_dead(path, &routes) => dead_links.push(PathFinding {
                at: at.clone(),
                path: path.clone(),
            }),
            _ => {},
        }
    }

    tracing::debug!(
        routes = routes.len(),
        references = references.len(),
        orphaned = orphaned.len(),
        "reconciled route and reference sets"
    );
    return Reconciliation {
        dead_calls,
        dead_links,
        orphaned,
        references,
        routes,
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn at(file: &str, line: u32) -> Provenance {
        Provenance {
            file: PathBuf::from(file),
            line,
        }
    }

    fn route(path: &str, line: u32) -> Fact {
        Fact::DefinedRoute {
            at: at("src/App.tsx", line),
            path: PathString::new(path),
        }
    }

    fn link(path: &str, line: u32) -> Fact {
        Fact::NavLink {
            at: at("src/Sidebar.tsx", line),
            path: PathString::new(path),
        }
    }

    fn call(path: &str, line: u32) -> Fact {
        Fact::NavigateCall {
            at: at("src/pages/Home.tsx", line),
            path: PathString::new(path),
        }
    }

    fn strs(findings: &[PathFinding]) -> Vec<&str> {
        findings.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn dead_links_are_reported_per_occurrence() {
        let facts = vec![route("/", 1), link("/missing", 3), link("/missing", 9)];
        let result = reconcile(&facts);
        assert_eq!(strs(&result.dead_links), vec!["/missing", "/missing"]);
        assert_eq!(result.dead_links[1].at.line, 9);
    }

    #[test]
    fn end_to_end_scenario() {
        let facts = vec![
            route("/", 1),
            route("/dashboard", 2),
            route("/reports/:id", 3),
            route("/legacy", 4),
            link("/dashboard", 5),
            call("/dashboard", 5),
            call("/unknown", 12),
        ];
        let result = reconcile(&facts);
        assert_eq!(strs(&result.orphaned), vec!["/legacy"]);
        assert_eq!(strs(&result.dead_calls), vec!["/unknown"]);
        assert!(result.dead_links.is_empty());
    }

    #[test]
    fn fragment_only_links_are_never_dead() {
        let result = reconcile(&[route("/", 1), link("#faq", 2)]);
        assert!(result.dead_links.is_empty());
    }

    #[test]
    fn normalized_reference_matches_route() {
        let facts = vec![route("/dashboard", 1), link("/dashboard?tab=settings#top", 2)];
        let result = reconcile(&facts);
        assert!(result.orphaned.is_empty());
        assert!(result.dead_links.is_empty());
    }

    #[test]
    fn parameterized_references_are_never_dead() {
        let result = reconcile(&[call("/clinician/:id", 4)]);
        assert!(result.dead_calls.is_empty());
    }

    #[test]
    fn parameterized_root_and_catch_all_are_never_orphaned() {
        let facts = vec![route("/", 1), route("*", 2), route("/clinician/:id", 3)];
        let result = reconcile(&facts);
        assert!(result.orphaned.is_empty());
        assert_eq!(result.routes.len(), 3);
    }

    #[test]
    fn route_set_deduplicates_and_keeps_first_occurrence() {
        let facts = vec![route("/a", 1), route("/b", 2), route("/a", 7)];
        let result = reconcile(&facts);
        let firsts: Vec<(&str, u32)> = result.routes.iter().map(|r| (r.path.as_str(), r.at.line)).collect();
        assert_eq!(firsts, vec![("/a", 1), ("/b", 2)]);
        assert_eq!(strs(&result.orphaned), vec!["/a", "/b"]);
    }

    #[test]
    fn without_routes_every_root_relative_reference_is_dead() {
        let result = reconcile(&[link("/a", 1), call("/b", 2)]);
        assert!(result.routes.is_empty());
        assert_eq!(strs(&result.dead_links), vec!["/a"]);
        assert_eq!(strs(&result.dead_calls), vec!["/b"]);
    }
}
