//! CLI command handlers: audit, routes, info.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use serde::Serialize;

use crate::AuditArgs;
use crate::audit;
use crate::config::{CONFIG_FILE, Config};
use crate::error::Error;
use crate::extractor;
use crate::report;
use crate::router::Resolution;

/// Exit status for `audit --check` when route defects were found.
const CHECK_FAILED: u8 = 2;

/// Exit codes as documented by `info`.
const EXIT_CODES: [(u8, &str); 3] = [
    (0, "Success (with --check: no orphaned routes, dead links, or dead calls)"),
    (1, "Fatal error; no report written"),
    (CHECK_FAILED, "--check found orphaned routes, dead nav links, or dead navigate calls"),
];

/// One documented exit code.
#[derive(Serialize)]
struct ExitCodeInfo {
    /// Process exit status.
    code: u8,
    /// What it means.
    meaning: &'static str,
}

/// `info --json` document.
#[derive(Serialize)]
struct InfoJson<'c> {
    /// Config file that was consulted.
    config_file: PathBuf,
    /// Whether that file exists.
    config_found: bool,
    /// Exit codes.
    exit_codes: Vec<ExitCodeInfo>,
    /// The effective policy after defaults are applied.
    policy: &'c Config,
    /// Crate version.
    version: &'static str,
}

/// Run the full audit, write the report, and print the summary.
///
/// # Errors
///
/// Returns config, root, pattern, or report-write errors. Nothing is
/// written when an error occurs before rendering.
pub fn audit(project: &Path, config_path: Option<&Path>, args: &AuditArgs) -> Result<ExitCode, Error> {
    let mut config = Config::load(project, config_path)?;
    if !args.sensitive_dir.is_empty() {
        config.sensitive_dirs.clone_from(&args.sensitive_dir);
    }
    if !args.sensitive_page.is_empty() {
        config.sensitive_pages.clone_from(&args.sensitive_page);
    }

    let root = source_root(project, &config, args.root.as_deref());
    let jobs = args.jobs.unwrap_or_else(extractor::default_jobs);
    tracing::info!(root = %root.display(), jobs = jobs.get(), "starting audit");

    let result = audit::run(&config, project, &root, jobs)?;
    let generated = Local::now();
    let document = report::render(&result, &generated);
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| return report::default_path(project, &config.report_dir, &generated));
    report::write(&out, &document)?;

    if args.json {
        let summary = report::summarize(&result, &report::render_body(&result), &out);
        // serde_json::to_string_pretty won't fail on this structure.
        let json = serde_json::to_string_pretty(&summary).unwrap_or_default();
        println!("{json}");
    } else {
        report::print_summary(&result, &out);
    }

    if args.check && result.has_route_defects() {
        return Ok(ExitCode::from(CHECK_FAILED));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Print the effective policy as markdown, or JSON with `json`.
///
/// # Errors
///
/// Returns config errors; a malformed policy file is reported, not ignored.
pub fn info(project: &Path, config_path: Option<&Path>, json: bool) -> Result<(), Error> {
    let config = Config::load(project, config_path)?;
    let config_file = config_path.map_or_else(|| return project.join(CONFIG_FILE), Path::to_path_buf);
    let config_found = config_file.is_file();

    if json {
        let info = InfoJson {
            config_file,
            config_found,
            exit_codes: EXIT_CODES
                .iter()
                .map(|&(code, meaning)| return ExitCodeInfo { code, meaning })
                .collect(),
            policy: &config,
            version: env!("CARGO_PKG_VERSION"),
        };
        // serde_json::to_string_pretty won't fail on this structure.
        let json = serde_json::to_string_pretty(&info).unwrap_or_default();
        println!("{json}");
        return Ok(());
    }

    let version = env!("CARGO_PKG_VERSION");
    print!(
        "\
# routeaudit {version}

Read-only route and content-safety audit for a React source tree. Writes one
markdown report under the report directory and never touches inspected files.

## Commands

    routeaudit audit                  Scan, reconcile, write the report
    routeaudit audit --check          Same, exit {CHECK_FAILED} on orphaned routes or dead references
    routeaudit routes                 List routes defined by the router file
    routeaudit info [--json]          Show this document

"
    );
    let state = if config_found { "found" } else { "not found, using defaults" };
    println!("## Effective Policy\n\nConfig: {} ({state})\n", config_file.display());
    // Serializing a plain struct of strings and paths cannot fail.
    let policy = toml::to_string(&config).unwrap_or_default();
    for line in policy.lines() {
        println!("    {line}");
    }
    println!("\n## Exit Codes\n\n| Code | Meaning |\n|------|---------|");
    for (code, meaning) in EXIT_CODES {
        println!("| {code}    | {meaning} |");
    }
    return Ok(());
}

/// List the router file and its defined routes. Writes nothing.
///
/// # Errors
///
/// Returns config, root, or pattern errors.
pub fn routes(project: &Path, config_path: Option<&Path>, root: Option<&Path>) -> Result<(), Error> {
    let config = Config::load(project, config_path)?;
    let root = source_root(project, &config, root);
    let (router, routes) = audit::defined_routes(&config, project, &root)?;

    let Some(router) = router else {
        println!("Router not found under {}.", root.display());
        return Ok(());
    };
    let how = match router.resolution {
        Resolution::Canonical => "canonical",
        Resolution::Fallback => "fallback",
    };
    println!("{} ({how}): {} route(s)", router.path.display(), routes.len());
    for route in routes.iter() {
        let marker = if route.path.has_parameter() { "  (parameterized)" } else { "" };
        println!("  {:<32} {}{marker}", route.path.as_str(), route.at);
    }
    return Ok(());
}

/// Source root: the `--root` override, else `<project>/<source_dir>`.
fn source_root(project: &Path, config: &Config, root: Option<&Path>) -> PathBuf {
    return root.map_or_else(|| return project.join(&config.source_dir), Path::to_path_buf);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn check_mode_fails_on_orphaned_route() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/App.tsx"), "<Route path=\"/legacy\" />\n").unwrap();
        let args = AuditArgs {
            check: true,
            out: Some(dir.path().join("out/report.md")),
            ..AuditArgs::default()
        };
        let code = audit(dir.path(), None, &args).unwrap();
        assert_eq!(code, ExitCode::from(CHECK_FAILED));
        assert!(dir.path().join("out/report.md").is_file());
    }

    #[test]
    fn missing_root_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let result = audit(dir.path(), None, &AuditArgs::default());
        assert!(matches!(result, Err(Error::RootNotFound { .. })));
        assert!(!dir.path().join("reports").exists());
    }

    #[test]
    fn root_override_wins_over_source_dir() {
        let config = Config::default();
        assert_eq!(source_root(Path::new("p"), &config, None), Path::new("p").join("src"));
        assert_eq!(source_root(Path::new("p"), &config, Some(Path::new("web"))), PathBuf::from("web"));
    }
}
