//! Fact extraction across the walked tree.
//!
//! Extraction of one file depends only on that file's text, so files are
//! handed to a fixed pool of scoped workers. Results are slotted back by
//! file index; fact order never depends on which worker finished first.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Error;
use crate::rules::{FileScope, Rule, RulePatterns};
use crate::types::{Fact, SourceFile};
use crate::walker::Candidate;

/// Applies every rule to the files it scopes to.
#[derive(Debug)]
pub struct Extractor<'c> {
    /// Policy used to scope files.
    config: &'c Config,
    /// Compiled rule patterns.
    patterns: RulePatterns,
    /// Project-relative path of the resolved router file, if any.
    router: Option<PathBuf>,
}

impl<'c> Extractor<'c> {
    /// Run every applicable rule over one file, rule by rule.
    pub fn extract(&self, file: &SourceFile) -> Vec<Fact> {
        let scope = self.scope_of(&file.path);
        let mut facts = Vec::new();
        for rule in Rule::ALL.into_iter().filter(|r| return r.applies_to(scope)) {
            rule.extract(&self.patterns, file, &mut facts);
        }
        for fact in &facts {
            tracing::trace!(kind = ?fact.kind(), at = %fact.provenance(), "extracted fact");
        }
        return facts;
    }

    /// Load and extract every candidate, using up to `jobs` worker threads.
    /// The returned facts follow walk order; within a file they are grouped
    /// by rule and each group is in line order.
    pub fn extract_all(&self, candidates: &[Candidate], jobs: NonZeroUsize) -> Vec<Fact> {
        let workers = jobs.get().min(candidates.len());
        if workers <= 1 {
            return candidates.iter().flat_map(|c| return self.extract_candidate(c)).collect();
        }

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &Candidate)>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, Vec<Fact>)>();
        for job in candidates.iter().enumerate() {
            // The receiver is alive until the end of this function.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                scope.spawn(move || {
                    for (idx, candidate) in jobs {
                        let _ = results.send((idx, self.extract_candidate(candidate)));
                    }
                });
            }
        });
        drop(result_tx);

        let mut slots: Vec<Vec<Fact>> = vec![Vec::new(); candidates.len()];
        for (idx, facts) in result_rx {
            if let Some(slot) = slots.get_mut(idx) {
                *slot = facts;
            }
        }
        tracing::debug!(files = candidates.len(), workers, "extraction finished");
        return slots.into_iter().flatten().collect();
    }

    /// Load one candidate and extract it. Files that fail to load yield nothing.
    fn extract_candidate(&self, candidate: &Candidate) -> Vec<Fact> {
        return candidate.load().map(|file| return self.extract(&file)).unwrap_or_default();
    }

    /// Build an extractor for the given policy and router file.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if a configured pattern does not compile.
    pub fn new(config: &'c Config, router: Option<PathBuf>) -> Result<Self, Error> {
        return Ok(Self {
            config,
            patterns: RulePatterns::compile(config)?,
            router,
        });
    }

    /// Decide which rules apply to a project-relative path.
    fn scope_of(&self, path: &Path) -> FileScope {
        return FileScope {
            nav: self.config.is_nav_file(path),
            router: self.router.as_deref() == Some(path),
            sensitive: self.config.is_sensitive(path),
        };
    }
}

/// Worker count when the user does not pick one: the available parallelism.
pub fn default_jobs() -> NonZeroUsize {
    return std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::types::FactKind;

    fn file(path: &str, text: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(path),
            text: text.to_string(),
        }
    }

    fn kinds(facts: &[Fact]) -> Vec<FactKind> {
        facts.iter().map(Fact::kind).collect()
    }

    #[test]
    fn nav_file_yields_links_and_calls_for_the_same_attribute() {
        let config = Config::default();
        let extractor = Extractor::new(&config, None).unwrap();
        let facts = extractor.extract(&file("src/components/Sidebar.tsx", "<Link to=\"/dashboard\" />\n"));
        assert_eq!(kinds(&facts), vec![FactKind::NavLink, FactKind::NavigateCall]);
    }

    #[test]
    fn parallel_extraction_matches_sequential_order() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        let mut candidates = Vec::new();
        for i in 0..24 {
            let name = format!("Page{i:02}.tsx");
            let body = format!("navigate(\"/p{i}\");\nnavigate(\"/q{i}\");\n");
            std::fs::write(src.join(&name), body).unwrap();
            candidates.push(Candidate {
                absolute: src.join(&name),
                relative: PathBuf::from("src").join(&name),
            });
        }

        let config = Config::default();
        let extractor = Extractor::new(&config, None).unwrap();
        let sequential = extractor.extract_all(&candidates, NonZeroUsize::MIN);
        let parallel = extractor.extract_all(&candidates, NonZeroUsize::new(6).unwrap());
        assert_eq!(sequential.len(), 48);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn router_rule_only_runs_on_the_router_file() {
        let config = Config::default();
        let extractor = Extractor::new(&config, Some(PathBuf::from("src/App.tsx"))).unwrap();
        let text = "<Route path=\"/legacy\" />\n";
        assert_eq!(kinds(&extractor.extract(&file("src/App.tsx", text))), vec![FactKind::DefinedRoute]);
        assert!(extractor.extract(&file("src/pages/Other.tsx", text)).is_empty());
    }

    #[test]
    fn sensitive_page_yields_free_text_facts() {
        let config = Config::default();
        let extractor = Extractor::new(&config, None).unwrap();
        let facts = extractor.extract(&file("src/pages/IntegrationPhase.tsx", "<textarea />\n"));
        assert_eq!(kinds(&facts), vec![FactKind::FreeTextInput]);
        let plain = extractor.extract(&file("src/pages/Settings.tsx", "<textarea />\n"));
        assert!(plain.is_empty());
    }
}
