// Logrep - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies. These types are the shared vocabulary across all layers.

use chrono::{DateTime, FixedOffset, Utc};
use semver::Version;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

// =============================================================================
// Log line
// =============================================================================

/// One parsed input line.
///
/// Lines without the `timestamp : message` shape (stack traces, banners)
/// carry no timestamp and keep the whole raw line as `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    /// 1-based line number within the source file.
    pub row: u64,

    /// Parsed timestamp at the configured UTC offset.
    pub timestamp: Option<DateTime<FixedOffset>>,

    /// Message text (right of the separator, or the whole line).
    pub text: String,
}

// =============================================================================
// Match result
// =============================================================================

/// A single hit: the matched line plus the lines that preceded it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// File the match was found in. Serialised lossily, like the text and
    /// CSV output, so non-UTF-8 names never fail an export.
    #[serde(serialize_with = "serialize_path_lossy")]
    pub path: PathBuf,

    /// Version in effect when the matched line was written, if any was announced.
    pub version: Option<Version>,

    /// Context window in ascending row order; the last entry is the matched line.
    pub context: Vec<LogLine>,
}

impl MatchResult {
    /// The matched line itself.
    pub fn matched_line(&self) -> Option<&LogLine> {
        self.context.last()
    }
}

fn serialize_path_lossy<P, S>(path: &P, serializer: S) -> Result<S::Ok, S::Error>
where
    P: AsRef<Path>,
    S: Serializer,
{
    serializer.serialize_str(&path.as_ref().to_string_lossy())
}

// =============================================================================
// Time window
// =============================================================================

/// Modification-time window used to decide whether a file is scanned.
/// Both bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// A window that admits every representable modification time.
    pub fn unbounded() -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    /// True when no instant lies strictly between the bounds.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

// =============================================================================
// Scan summary
// =============================================================================

/// Summary statistics for a completed scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Files produced by discovery.
    pub files_discovered: usize,

    /// Files whose lines were read.
    pub files_scanned: usize,

    /// Files rejected by the modification-time window.
    pub files_skipped: usize,

    /// Lines read across all scanned files.
    pub lines_read: u64,

    /// Lines dropped because their timestamp did not parse.
    pub lines_unparseable: u64,

    /// Version-announcement lines seen.
    pub version_markers: u64,

    /// Version announcements whose token was not a semantic version.
    pub invalid_versions: u64,

    /// Lines not considered for matching because the version gate rejected them.
    pub lines_version_filtered: u64,

    /// Match records produced.
    pub matches: usize,

    /// Wall-clock scan duration.
    pub duration: std::time::Duration,
}

/// Per-file counters produced by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    pub lines_read: u64,
    pub lines_unparseable: u64,
    pub version_markers: u64,
    pub invalid_versions: u64,
    pub lines_version_filtered: u64,
    pub matches: usize,
}

impl ScanSummary {
    /// Fold one scanned file's counters into the totals.
    pub fn add_file(&mut self, stats: &FileStats) {
        self.files_scanned += 1;
        self.lines_read += stats.lines_read;
        self.lines_unparseable += stats.lines_unparseable;
        self.version_markers += stats.version_markers;
        self.invalid_versions += stats.invalid_versions;
        self.lines_version_filtered += stats.lines_version_filtered;
        self.matches += stats.matches;
    }
}
