use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Name of the optional policy file looked up in the project directory.
pub const CONFIG_FILE: &str = ".routeaudit.toml";

/// Audit policy loaded from `.routeaudit.toml`.
///
/// Every list the extraction rules consult lives here rather than in the
/// rules themselves, so a policy change never touches extraction logic.
/// Missing keys fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Regexes that exempt a free-text line (numeric-only or search fields).
    pub exempt_patterns: Vec<String>,
    /// File name suffixes eligible for scanning.
    pub extensions: Vec<String>,
    /// Case-insensitive file name tokens marking navigation components.
    pub nav_file_tokens: Vec<String>,
    /// Function names treated as programmatic navigation calls.
    pub navigate_functions: Vec<String>,
    /// Directory names skipped at any depth.
    pub prune_dirs: Vec<String>,
    /// Directory for reports, relative to the project directory.
    pub report_dir: PathBuf,
    /// Canonical router file, relative to the source root.
    pub router_file: PathBuf,
    /// File name suffixes tried, in walk order, when the canonical router is absent.
    pub router_suffixes: Vec<String>,
    /// Comment token marking a free-text input as display-only.
    pub safety_token: String,
    /// Characters searched on each side of a free-text match for the safety token.
    pub safety_window: usize,
    /// Directory prefixes, relative to the project directory, holding sensitive forms.
    pub sensitive_dirs: Vec<PathBuf>,
    /// File name tokens marking sensitive pages.
    pub sensitive_pages: Vec<String>,
    /// Source root, relative to the project directory.
    pub source_dir: PathBuf,
}

impl Config {
    /// Whether the file name suggests a navigation component.
    pub fn is_nav_file(&self, relative: &Path) -> bool {
        let name = file_name_of(relative).to_lowercase();
        return self
            .nav_file_tokens
            .iter()
            .any(|token| return name.contains(&token.to_lowercase()));
    }

    /// Whether a project-relative path falls in a sensitive context, either
    /// under a sensitive directory or named after a sensitive page.
    pub fn is_sensitive(&self, relative: &Path) -> bool {
        if self.sensitive_dirs.iter().any(|dir| return relative.starts_with(dir)) {
            return true;
        }
        let name = file_name_of(relative);
        return self
            .sensitive_pages
            .iter()
            .any(|page| return name.contains(page.as_str()));
    }

    /// Load config from `.routeaudit.toml` in the project directory, or from
    /// an explicit path.
    ///
    /// A missing default file yields the built-in defaults. An explicit path
    /// must exist, and a file that exists but is malformed is an error; the
    /// audit never silently falls back to defaults when the user wrote a
    /// config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if an explicit path is missing,
    /// `Error::Io` if reading fails, or `Error::TomlDe` if the TOML is malformed.
    pub fn load(project: &Path, explicit: Option<&Path>) -> Result<Self, Error> {
        let path = explicit.map_or_else(|| return project.join(CONFIG_FILE), Path::to_path_buf);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if explicit.is_some() {
                    return Err(Error::ConfigNotFound { path });
                }
                return Ok(Self::default());
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        return Self::parse(&content);
    }

    /// Parse config text, filling unspecified keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        return Ok(toml::from_str(content)?);
    }
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            exempt_patterns: strings(&[r"inputMode.*numeric", r"pattern.*0-9", r"[Ss]earch", r"[Ff]ilter"]),
            extensions: strings(&[".tsx", ".ts", ".jsx", ".js"]),
            nav_file_tokens: strings(&["sidebar", "nav", "menu", "header", "shell"]),
            navigate_functions: strings(&["navigate"]),
            prune_dirs: strings(&["node_modules", ".git"]),
            report_dir: PathBuf::from("reports"),
            router_file: PathBuf::from("App.tsx"),
            router_suffixes: strings(&["App.tsx", "router.tsx"]),
            safety_token: "UI-ONLY".to_string(),
            safety_window: 200,
            sensitive_dirs: vec![
                PathBuf::from("src/components/arc-of-care-forms"),
                PathBuf::from("src/components/wellness-journey"),
            ],
            sensitive_pages: strings(&["WellnessJourney", "DosingSession", "PreparationPhase", "IntegrationPhase"]),
            source_dir: PathBuf::from("src"),
        };
    }
}

/// Final path component as text, or empty.
fn file_name_of(path: &Path) -> String {
    return path
        .file_name()
        .map(|n| return n.to_string_lossy().into_owned())
        .unwrap_or_default();
}

/// Own a list of string literals.
fn strings(items: &[&str]) -> Vec<String> {
    return items.iter().map(|s| return (*s).to_string()).collect();
}
