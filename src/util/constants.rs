// Logrep - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "logrep";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "logrep";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Line format
// =============================================================================

/// Separator between the timestamp and the message of a structured line.
pub const FIELD_SEPARATOR: &str = " : ";

/// UTC offset appended to timestamps that carry none.
pub const DEFAULT_UTC_OFFSET: &str = "+00:00";

/// Rendered in place of a missing timestamp (the zero instant).
pub const ZERO_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// Maximum length of a raw line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Version detection
// =============================================================================

/// Substring that marks a firmware/app version announcement line.
pub const DEFAULT_VERSION_MARKER: &str = "cpu_start: App version:";

/// ANSI colour-reset sequence trailing the version token on coloured consoles.
pub const ANSI_RESET: &str = "\x1b[0m";

/// Version string reported when no marker was found on a line.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Constraint that admits every release version.
pub const DEFAULT_VERSION_CONSTRAINT: &str = ">=0";

// =============================================================================
// Context window
// =============================================================================

/// Default number of lines captured around (and including) a match.
pub const DEFAULT_CONTEXT_ROWS: usize = 10;

/// Minimum context window size.
pub const MIN_CONTEXT_ROWS: usize = 1;

/// Hard upper bound on the context window size.
pub const MAX_CONTEXT_ROWS: usize = 1_000;

// =============================================================================
// Discovery limits
// =============================================================================

/// Default maximum directory recursion depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 256;

// =============================================================================
// I/O retry
// =============================================================================

/// Retries after a transient open error, one per backoff delay.
pub const OPEN_MAX_RETRIES: usize = 3;

/// Wait before each retry, in milliseconds.
pub const OPEN_RETRY_DELAYS_MS: [u64; OPEN_MAX_RETRIES] = [50, 100, 200];

// =============================================================================
// Output
// =============================================================================

/// Output path meaning "write to stdout".
pub const STDOUT_PATH: &str = "-";

/// Default output format name.
pub const DEFAULT_OUTPUT_FORMAT: &str = "text";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in config.toml.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
