mod audit;
mod commands;
mod config;
mod diagnostics;
mod error;
mod extractor;
mod reconcile;
mod report;
mod router;
mod rules;
mod safety;
mod types;
mod walker;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Options for `audit`, also the defaults when no command is given.
#[derive(Args, Debug, Default)]
struct AuditArgs {
    /// Exit with status 2 when orphaned routes or dead references are found
    #[arg(long)]
    check: bool,
    /// Worker threads for extraction (default: available parallelism)
    #[arg(long)]
    jobs: Option<NonZeroUsize>,
    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
    /// Report file (default: <report_dir>/ROUTE_AUDIT_<date>.md)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Source root to scan (default: <project>/<source_dir>)
    #[arg(long)]
    root: Option<PathBuf>,
    /// Sensitive directory prefix, relative to the project (repeatable; replaces the configured list)
    #[arg(long = "sensitive-dir", value_name = "DIR")]
    sensitive_dir: Vec<PathBuf>,
    /// Sensitive page file name token (repeatable; replaces the configured list)
    #[arg(long = "sensitive-page", value_name = "TOKEN")]
    sensitive_page: Vec<String>,
}

/// Command-line interface.
#[derive(Parser)]
#[command(name = "routeaudit", version, about = "Read-only route and content-safety audit for React source trees")]
struct Cli {
    /// Command to run (default: audit)
    #[command(subcommand)]
    command: Option<Commands>,
    /// Policy file (default: <project>/.routeaudit.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Project directory; report paths are relative to it
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,
    /// Raise log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan the source tree and write the audit report
    Audit(AuditArgs),
    /// Show the effective policy, commands, and exit codes
    Info {
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// List routes defined by the router file (writes nothing)
    Routes {
        /// Source root to scan (default: <project>/<source_dir>)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

/// Send logs to stderr. `RUST_LOG` wins; otherwise `-v` picks the level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    return;
}

/// Parse arguments, run the command, render any fatal error.
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let project = cli.project.as_path();
    let config = cli.config.as_deref();

    let result = match cli.command {
        None => commands::audit(project, config, &AuditArgs::default()),
        Some(Commands::Audit(args)) => commands::audit(project, config, &args),
        Some(Commands::Info { json }) => commands::info(project, config, json).map(|()| return ExitCode::SUCCESS),
        Some(Commands::Routes { root }) => {
            commands::routes(project, config, root.as_deref()).map(|()| return ExitCode::SUCCESS)
        },
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
