use std::path::Path;

use crate::config::CONFIG_FILE;
use crate::error::Error;

/// ANSI bold, used for headings on a terminal.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
    return;
}

/// Render a fatal error as a short markdown diagnostic: what happened, then
/// how to fix it where there is something to do.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::ConfigNotFound { path } => render_config_not_found(path),
        Error::InvalidPattern { pattern, source } => render_invalid_pattern(pattern, source),
        Error::Io(err) => format!("# Error: I/O\n\n{err}\n"),
        Error::ReportWrite { path, source } => format!(
            "# Error: Report Not Written\n\nCould not write `{}`: {source}\n\n## Fix\n\nCheck that the report directory is writable, or pass another location:\n\n    routeaudit audit --out <file>\n",
            path.display(),
        ),
        Error::RootNotDirectory { path } => render_bad_root(path, "is not a directory"),
        Error::RootNotFound { path } => render_bad_root(path, "does not exist"),
        Error::RootUnreadable { path, source } => render_bad_root(path, &format!("cannot be read ({source})")),
        Error::TomlDe(err) => format!(
            "# Error: Invalid Config\n\n{err}\n## Fix\n\nCorrect `{CONFIG_FILE}`. Unknown keys are rejected; run `routeaudit info` to list the accepted ones.\n"
        ),
    };
}

/// Fatal root problem. No report is written in this case.
fn render_bad_root(path: &Path, what: &str) -> String {
    return format!(
        "\
# Error: Source Root Unusable

`{}` {what}. No report was written.

## Fix

Run from the project directory, or point at the source tree:

    routeaudit --project <dir> audit --root <dir>
",
        path.display(),
    );
}

/// Explicit `--config` path that is missing.
fn render_config_not_found(path: &Path) -> String {
    return format!(
        "\
# Error: Config Not Found

`{}` does not exist.

## Fix

Drop `--config` to use `{CONFIG_FILE}` from the project directory, or the built-in defaults.
",
        path.display(),
    );
}

/// Policy regex that does not compile.
fn render_invalid_pattern(pattern: &str, source: &regex::Error) -> String {
    return format!(
        "\
# Error: Invalid Pattern

`{pattern}` is not a valid regular expression:

{source}

## Fix

Correct the entry in `exempt_patterns` in `{CONFIG_FILE}`.
"
    );
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_root_names_the_path_and_says_no_report() {
        let md = render_error(&Error::RootNotFound {
            path: PathBuf::from("nowhere/src"),
        });
        assert!(md.starts_with("# Error: Source Root Unusable"));
        assert!(md.contains("`nowhere/src` does not exist. No report was written."));
    }

    #[test]
    fn report_write_suggests_out() {
        let md = render_error(&Error::ReportWrite {
            path: PathBuf::from("reports/r.md"),
            source: std::io::Error::other("denied"),
        });
        assert!(md.contains("`reports/r.md`"));
        assert!(md.contains("--out"));
    }
}
