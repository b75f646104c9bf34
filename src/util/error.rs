// Logrep - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Fatal errors flow up through `LogrepError`; line-level `ParseError`s are
// returned as values and skipped by the engine.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all logrep operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogrepError {
    /// Directory enumeration failed.
    Discovery(DiscoveryError),

    /// A log file could not be opened or read.
    Scan(ScanError),

    /// Writing the results failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for LogrepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Scan(e) => write!(f, "Scan error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for LogrepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Scan(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to directory enumeration. All of them abort the run.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The root scan path does not exist.
    RootNotFound { path: PathBuf },

    /// The root path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the root path.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// A directory or entry below the root could not be enumerated.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Scan path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Scan path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::Traversal { path, source } => {
                write!(f, "Error traversing '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            Self::Traversal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for LogrepError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Parse errors (recoverable, per line)
// ---------------------------------------------------------------------------

/// A line or version token that could not be interpreted.
///
/// Never fatal: the engine logs these and moves on to the next line.
#[derive(Debug)]
pub enum ParseError {
    /// The text left of the field separator is not a valid timestamp.
    TimestampParse {
        row: u64,
        raw_timestamp: String,
        source: chrono::ParseError,
    },

    /// A version marker was found but its token is not a semantic version.
    InvalidVersion {
        raw_version: String,
        source: semver::Error,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimestampParse {
                row,
                raw_timestamp,
                source,
            } => write!(
                f,
                "line {row}: cannot parse timestamp '{raw_timestamp}': {source}"
            ),
            Self::InvalidVersion {
                raw_version,
                source,
            } => write!(f, "invalid version '{raw_version}': {source}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TimestampParse { source, .. } => Some(source),
            Self::InvalidVersion { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Scan errors
// ---------------------------------------------------------------------------

/// Errors reading an individual log file. All of them abort the run.
#[derive(Debug)]
pub enum ScanError {
    /// The file could not be opened.
    Open { path: PathBuf, source: io::Error },

    /// Reading a line failed for a reason other than end of input.
    Read {
        path: PathBuf,
        row: u64,
        source: io::Error,
    },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "Cannot open '{}': {source}", path.display())
            }
            Self::Read { path, row, source } => {
                write!(f, "'{}' line {row}: read failed: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Read { source, .. } => Some(source),
        }
    }
}

impl From<ScanError> for LogrepError {
    fn from(e: ScanError) -> Self {
        Self::Scan(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing the match results.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the output.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LogrepError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// A required setting was supplied neither on the CLI nor in config.toml.
    MissingField { field: &'static str },

    /// The version-constraint expression does not parse.
    InvalidConstraint {
        expression: String,
        source: semver::Error,
    },

    /// A window bound is not an RFC 3339 timestamp.
    InvalidTimestamp {
        field: &'static str,
        value: String,
        source: chrono::ParseError,
    },

    /// The UTC offset is not of the form `+HH:MM`.
    InvalidOffset {
        value: String,
        source: chrono::ParseError,
    },

    /// The modification-time window admits nothing.
    EmptyWindow { start: String, end: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::MissingField { field } => {
                write!(f, "'{field}' must be set on the command line or in config.toml")
            }
            Self::InvalidConstraint { expression, source } => {
                write!(f, "Invalid version constraint '{expression}': {source}")
            }
            Self::InvalidTimestamp {
                field,
                value,
                source,
            } => write!(
                f,
                "'{field}' = '{value}' is not an RFC 3339 timestamp: {source}"
            ),
            Self::InvalidOffset { value, source } => {
                write!(f, "Invalid UTC offset '{value}' (expected +HH:MM): {source}")
            }
            Self::EmptyWindow { start, end } => write!(
                f,
                "Modification-time window is empty: '{start}' is not before '{end}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConstraint { source, .. } => Some(source),
            Self::InvalidTimestamp { source, .. } => Some(source),
            Self::InvalidOffset { source, .. } => Some(source),
            Self::ValueOutOfRange { .. }
            | Self::MissingField { .. }
            | Self::EmptyWindow { .. } => None,
        }
    }
}

impl From<ConfigError> for LogrepError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
