//! Crate-level error types for routeaudit diagnostics.
use std::path::PathBuf;

/// Fatal errors only. Per-file read and decode failures are logged and
/// skipped by the walker and extractor instead of surfacing here.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An explicitly requested config file does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// A configured policy pattern is not a valid regular expression.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The pattern text as written in the config.
        pattern: String,
        /// Compiler error from the regex crate.
        source: regex::Error,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The report file or its parent directory could not be written.
    #[error("cannot write report {}: {source}", path.display())]
    ReportWrite {
        /// Destination of the report.
        path: PathBuf,
        /// The wrapped I/O error.
        source: std::io::Error,
    },

    /// The source root exists but is a file or something else.
    #[error("source root is not a directory: {}", path.display())]
    RootNotDirectory {
        /// The offending root path.
        path: PathBuf,
    },

    /// The source root does not exist.
    #[error("source root not found: {}", path.display())]
    RootNotFound {
        /// The missing root path.
        path: PathBuf,
    },

    /// The source root exists but cannot be listed.
    #[error("source root unreadable: {}: {source}", path.display())]
    RootUnreadable {
        /// The unreadable root path.
        path: PathBuf,
        /// The wrapped I/O error.
        source: std::io::Error,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
