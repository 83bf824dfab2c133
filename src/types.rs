//! Core domain types: source files, facts, path strings, and findings.
use std::path::PathBuf;

use serde::Serialize;

/// Segment prefix that marks a path parameter, as in `/clinician/:id`.
pub const PARAMETER_SIGIL: char = ':';

/// An outbound link found anywhere in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLinkEntry {
    /// Where the link was found.
    pub at: Provenance,
    /// The full `http://` or `https://` URL.
    pub url: String,
}

/// A single extracted observation. Each extraction rule produces exactly one
/// of these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    /// A `path="..."` declaration inside the router file.
    DefinedRoute {
        /// Where the declaration was found.
        at: Provenance,
        /// Declared route.
        path: PathString,
    },
    /// An outbound `href` to an absolute web URL.
    ExternalLink {
        /// Where the link was found.
        at: Provenance,
        /// The matched URL.
        url: String,
    },
    /// A free-text input inside a sensitive context.
    FreeTextInput {
        /// Whether the safety comment token appears near the match.
        annotated: bool,
        /// Where the input was found.
        at: Provenance,
        /// Trimmed text of the matching line.
        text: String,
    },
    /// A programmatic navigation call or `to=` attribute, in any file.
    NavigateCall {
        /// Where the call was found.
        at: Provenance,
        /// Target of the call.
        path: PathString,
    },
    /// A `to=` or internal `href=` attribute inside a navigation component.
    NavLink {
        /// Where the link was found.
        at: Provenance,
        /// Target of the link.
        path: PathString,
    },
}

impl Fact {
    /// The rule family this fact came from.
    pub const fn kind(&self) -> FactKind {
        return match self {
            Self::DefinedRoute { .. } => FactKind::DefinedRoute,
            Self::ExternalLink { .. } => FactKind::ExternalLink,
            Self::FreeTextInput { .. } => FactKind::FreeTextInput,
            Self::NavigateCall { .. } => FactKind::NavigateCall,
            Self::NavLink { .. } => FactKind::NavLink,
        };
    }

    /// File and line the fact was extracted from.
    pub const fn provenance(&self) -> &Provenance {
        return match self {
            Self::DefinedRoute { at, .. }
            | Self::ExternalLink { at, .. }
            | Self::FreeTextInput { at, .. }
            | Self::NavigateCall { at, .. }
            | Self::NavLink { at, .. } => at,
        };
    }
}

/// Discriminant of [`Fact`], used for counting and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactKind {
    /// See [`Fact::DefinedRoute`].
    DefinedRoute,
    /// See [`Fact::ExternalLink`].
    ExternalLink,
    /// See [`Fact::FreeTextInput`].
    FreeTextInput,
    /// See [`Fact::NavigateCall`].
    NavigateCall,
    /// See [`Fact::NavLink`].
    NavLink,
}

/// Every category the report counts, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Every distinct defined route (inventory, not a defect).
    DefinedRoute,
    /// Navigation calls to routes that do not exist.
    DeadNavigateCall,
    /// Navigation links to routes that do not exist.
    DeadNavLink,
    /// Outbound links (inventory).
    ExternalLink,
    /// Free-text inputs inside sensitive contexts.
    FreeTextViolation,
    /// Defined routes that nothing links to.
    OrphanedRoute,
}

impl FindingKind {
    /// Report order: inventory first, then defects, then the sweeps.
    pub const REPORT_ORDER: [Self; 6] = [
        Self::DefinedRoute,
        Self::OrphanedRoute,
        Self::DeadNavLink,
        Self::DeadNavigateCall,
        Self::FreeTextViolation,
        Self::ExternalLink,
    ];

    /// Row label used in the summary table and on the console.
    pub const fn label(self) -> &'static str {
        return match self {
            Self::DeadNavigateCall => "Dead navigate calls",
            Self::DeadNavLink => "Dead nav links",
            Self::DefinedRoute => "Defined routes",
            Self::ExternalLink => "External links",
            Self::FreeTextViolation => "Free-text inputs in sensitive contexts",
            Self::OrphanedRoute => "Orphaned routes",
        };
    }
}

/// A free-text input finding after tiering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeTextViolation {
    /// Where the input was found.
    pub at: Provenance,
    /// Trimmed text of the offending line.
    pub text: String,
    /// Severity tier.
    pub tier: Tier,
}

/// A route or reference path after query and fragment stripping.
///
/// Equality and hashing use only the normalized form, so
/// `/dashboard?tab=1#top` equals `/dashboard`.
#[derive(Debug, Clone)]
pub struct PathString {
    /// Text with everything from the first `?` or `#` removed.
    normalized: String,
    /// Text exactly as written in the source.
    raw: String,
}

impl PathString {
    /// Normalized text, the form used for every comparison.
    pub fn as_str(&self) -> &str {
        return &self.normalized;
    }

    /// Whether any segment is a path parameter (`:id`). Such paths cannot be
    /// compared against concrete references.
    pub fn has_parameter(&self) -> bool {
        return self
            .normalized
            .split('/')
            .any(|segment| return segment.starts_with(PARAMETER_SIGIL));
    }

    /// The root path and the catch-all wildcard are reachable by convention.
    pub fn is_root_or_catch_all(&self) -> bool {
        return self.normalized == "/" || self.normalized == "*";
    }

    /// Build from source text, stripping query and fragment suffixes.
    pub fn new(raw: &str) -> Self {
        let cut = raw.find(['?', '#']).unwrap_or(raw.len());
        let normalized = raw.get(..cut).unwrap_or(raw).to_string();
        return Self {
            normalized,
            raw: raw.to_string(),
        };
    }

    /// Text exactly as written in the source.
    pub fn raw(&self) -> &str {
        return &self.raw;
    }
}

impl Eq for PathString {}

impl std::hash::Hash for PathString {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl PartialEq for PathString {
    fn eq(&self, other: &Self) -> bool {
        return self.normalized == other.normalized;
    }
}

/// A path-based finding: an orphaned route or a dead link/call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFinding {
    /// Where the route or reference was found.
    pub at: Provenance,
    /// The offending path.
    pub path: PathString,
}

/// Location of a fact. Paths are relative to the project directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Provenance {
    /// Source file, relative to the project directory when possible.
    pub file: PathBuf,
    /// One-based line number.
    pub line: u32,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}:{}", self.file.display(), self.line);
    }
}

/// Text content of one inspected file, read once per scan.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the project directory.
    pub path: PathBuf,
    /// Full decoded text.
    pub text: String,
}

/// Severity of a free-text finding. Neither tier suppresses the finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// A safety comment sits near the input; persistence still needs checking.
    Annotated,
    /// No safety comment nearby.
    NeedsReview,
}

impl Tier {
    /// Human-readable label for the report.
    pub const fn label(self) -> &'static str {
        return match self {
            Self::Annotated => "annotated (verify persistence)",
            Self::NeedsReview => "needs review (no safety comment)",
        };
    }
}
