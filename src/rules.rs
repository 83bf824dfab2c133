//! The five named extraction rules. Each rule is independently testable
//! against fixture text and produces exactly one [`Fact`] variant.
//!
//! Rules are line-oriented pattern matches, not a parse of the source
//! language: dynamically built paths are invisible to them.

use regex::Regex;

use crate::config::Config;
use crate::error::Error;
use crate::types::{Fact, PathString, Provenance, SourceFile};

/// Which rules apply to a file, decided from its path before extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileScope {
    /// Navigation-component file name.
    pub nav: bool,
    /// The resolved router file.
    pub router: bool,
    /// Under a sensitive directory or named after a sensitive page.
    pub sensitive: bool,
}

/// One extraction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `path="..."` in the router file.
    DefinedRoute,
    /// `href="http(s)://..."` in any file.
    ExternalLink,
    /// Text area or text/email input in a sensitive file.
    FreeTextInput,
    /// `navigate("/...")` or `to="/..."` in any file.
    NavigateCall,
    /// `to="/..."`, `to="#..."` or `href="/..."` in a navigation file.
    NavLink,
}

impl Rule {
    /// Every rule, in the order they run over a file.
    pub const ALL: [Self; 5] = [
        Self::DefinedRoute,
        Self::NavLink,
        Self::NavigateCall,
        Self::FreeTextInput,
        Self::ExternalLink,
    ];

    /// Whether this rule runs on a file with the given scope.
    pub const fn applies_to(self, scope: FileScope) -> bool {
        return match self {
            Self::DefinedRoute => scope.router,
            Self::ExternalLink | Self::NavigateCall => true,
            Self::FreeTextInput => scope.sensitive,
            Self::NavLink => scope.nav,
        };
    }

    /// Run this rule over one file, appending facts in line order.
    pub fn extract(self, patterns: &RulePatterns, file: &SourceFile, facts: &mut Vec<Fact>) {
        for (idx, (offset, line)) in line_spans(&file.text).enumerate() {
            let at = Provenance {
                file: file.path.clone(),
                line: u32::try_from(idx.saturating_add(1)).unwrap_or(u32::MAX),
            };
            match self {
                Self::DefinedRoute => extract_defined_routes(patterns, line, &at, facts),
                Self::ExternalLink => extract_external_links(patterns, line, &at, facts),
                Self::FreeTextInput => extract_free_text(patterns, &file.text, offset, line, &at, facts),
                Self::NavigateCall => extract_navigate_calls(patterns, line, &at, facts),
                Self::NavLink => extract_nav_links(patterns, line, &at, facts),
            }
        }
        return;
    }
}

/// Compiled patterns for every rule, built once from the policy config.
#[derive(Debug)]
pub struct RulePatterns {
    /// Lines matching any of these are exempt from the free-text sweep.
    exempt: Vec<Regex>,
    /// `href` with an absolute web URL.
    external_href: Regex,
    /// Free-text input markers.
    free_text: Regex,
    /// `href` with a root-relative value.
    internal_href: Regex,
    /// Call to one of the configured navigation functions with a literal;
    /// `None` when no function names are configured.
    navigate_call: Option<Regex>,
    /// `path=` attribute with a literal.
    route_path: Regex,
    /// Comment token that annotates a free-text input as display-only.
    safety_token: String,
    /// Characters searched on each side of a free-text match.
    safety_window: usize,
    /// `to=` attribute with a literal.
    to_attr: Regex,
}

impl RulePatterns {
    /// Compile every pattern the rules need from the policy config.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if an exemption pattern or a navigation
    /// function name produces an invalid regex.
    pub fn compile(config: &Config) -> Result<Self, Error> {
        let exempt = config
            .exempt_patterns
            .iter()
            .map(|p| return compile_pattern(p))
            .collect::<Result<Vec<_>, _>>()?;

        let functions = config
            .navigate_functions
            .iter()
            .filter(|f| return !f.is_empty())
            .map(|f| return regex::escape(f))
            .collect::<Vec<_>>();
        let navigate_call = if functions.is_empty() {
            None
        } else {
            let alternation = functions.join("|");
            Some(compile_pattern(&format!(r#"(?:^|[^\w$])(?:{alternation})\s*\(\s*["']([^"']+)["']"#))?)
        };

        return Ok(Self {
            exempt,
            external_href: compile_pattern(r#"\bhref\s*=\s*["'](https?://[^"']+)["']"#)?,
            free_text: compile_pattern(r#"<textarea\b|\btype\s*=\s*["'](?:text|email)["']"#)?,
            internal_href: compile_pattern(r#"\bhref\s*=\s*["'](/[^"']*)["']"#)?,
            navigate_call,
            route_path: compile_pattern(r#"\bpath\s*=\s*["']([^"']+)["']"#)?,
            safety_token: config.safety_token.clone(),
            safety_window: config.safety_window,
            to_attr: compile_pattern(r#"\bto\s*=\s*["']([^"']+)["']"#)?,
        });
    }
}

/// First capture group of every match on the line.
fn captured_values<'a>(pattern: &Regex, line: &'a str) -> Vec<&'a str> {
    return pattern
        .captures_iter(line)
        .filter_map(|cap| return cap.get(1).map(|m| return m.as_str()))
        .collect();
}

/// Compile one pattern, naming it in the error.
///
/// # Errors
///
/// Returns `Error::InvalidPattern` on a syntax error.
fn compile_pattern(pattern: &str) -> Result<Regex, Error> {
    return Regex::new(pattern).map_err(|source| {
        return Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        };
    });
}

/// Rule 1: every `path="..."` literal on the line.
fn extract_defined_routes(patterns: &RulePatterns, line: &str, at: &Provenance, facts: &mut Vec<Fact>) {
    for value in captured_values(&patterns.route_path, line) {
        facts.push(Fact::DefinedRoute {
            at: at.clone(),
            path: PathString::new(value),
        });
    }
    return;
}

/// Rule 5: every absolute web URL in an `href`.
fn extract_external_links(patterns: &RulePatterns, line: &str, at: &Provenance, facts: &mut Vec<Fact>) {
    for url in captured_values(&patterns.external_href, line) {
        facts.push(Fact::ExternalLink {
            at: at.clone(),
            url: url.to_string(),
        });
    }
    return;
}

/// Rule 4: at most one fact per line carrying a free-text marker that no
/// exemption pattern covers. The safety token is searched in the raw file
/// text around the match, so a comment on a neighbouring line counts.
fn extract_free_text(
    patterns: &RulePatterns,
    text: &str,
    line_offset: usize,
    line: &str,
    at: &Provenance,
    facts: &mut Vec<Fact>,
) {
    let Some(found) = patterns.free_text.find(line) else {
        return;
    };
    if patterns.exempt.iter().any(|p| return p.is_match(line)) {
        return;
    }
    let anchor = line_offset.saturating_add(found.start());
    let annotated = !patterns.safety_token.is_empty()
        && window_around(text, anchor, patterns.safety_window).contains(patterns.safety_token.as_str());
    facts.push(Fact::FreeTextInput {
        annotated,
        at: at.clone(),
        text: line.trim().to_string(),
    });
    return;
}

/// Rule 2: `to=` values starting with `/` or `#`, then root-relative `href`
/// values. Protocol-relative `//host` values carry a scheme and are skipped.
fn extract_nav_links(patterns: &RulePatterns, line: &str, at: &Provenance, facts: &mut Vec<Fact>) {
    let to_values = captured_values(&patterns.to_attr, line)
        .into_iter()
        .filter(|v| return v.starts_with('/') || v.starts_with('#'));
    let href_values = captured_values(&patterns.internal_href, line)
        .into_iter()
        .filter(|v| return !v.starts_with("//"));
    for value in to_values.chain(href_values) {
        facts.push(Fact::NavLink {
            at: at.clone(),
            path: PathString::new(value),
        });
    }
    return;
}

/// Rule 3: navigation calls and `to=` attributes whose literal starts with `/`.
fn extract_navigate_calls(patterns: &RulePatterns, line: &str, at: &Provenance, facts: &mut Vec<Fact>) {
    let calls = patterns
        .navigate_call
        .as_ref()
        .map(|p| return captured_values(p, line))
        .unwrap_or_default();
    let links = captured_values(&patterns.to_attr, line);
    for value in calls.into_iter().chain(links).filter(|v| return v.starts_with('/')) {
        facts.push(Fact::NavigateCall {
            at: at.clone(),
            path: PathString::new(value),
        });
    }
    return;
}

/// Split text into lines, yielding each line's byte offset alongside it.
/// Line terminators (`\n` or `\r\n`) are not part of the yielded line.
fn line_spans(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0_usize;
    return text.split_inclusive('\n').map(move |chunk| {
        let start = offset;
        offset = offset.saturating_add(chunk.len());
        let line = chunk.strip_suffix('\n').unwrap_or(chunk);
        let line = line.strip_suffix('\r').unwrap_or(line);
        return (start, line);
    });
}

/// Slice of `text` spanning `radius` characters on each side of byte
/// offset `at`.
fn window_around(text: &str, at: usize, radius: usize) -> &str {
    let before = text.get(..at).unwrap_or("");
    let start = before
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(at, |(i, _)| return i);
    let after = text.get(at..).unwrap_or("");
    let end = after
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| return at.saturating_add(i));
    return text.get(start..end).unwrap_or("");
}
