// Logrep - core/engine.rs
//
// Contextual match engine. Streams the lines of one file through
//   LineParser -> ContextRingBuffer -> VersionDetector/VersionGate -> target test
// and records a `MatchResult` (with a snapshot of the context window) for every
// line whose message contains the target substring.
//
// Core layer: accepts `BufRead` implementors, never opens files itself.
//
// Per-file state (row counter, context window) is reset at the start of every
// file. The version gate lives in `ScanSession` and carries over from one file
// to the next, since version announcements are rare and files are fed in
// path order.

use crate::core::context::ContextRingBuffer;
use crate::core::model::{FileStats, MatchResult, TimeWindow};
use crate::core::parser::LineParser;
use crate::core::time_gate;
use crate::core::version::{VersionConstraint, VersionDetector, VersionGate};
use crate::util::constants;
use crate::util::error::ScanError;
use chrono::{DateTime, Utc};
use semver::Version;
use std::io::BufRead;
use std::num::NonZeroUsize;
use std::path::Path;

// =============================================================================
// Configuration
// =============================================================================

/// Construction-time parameters of the engine.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Case-sensitive substring that defines a match.
    pub target: String,

    /// Size of the context window (the matched line included).
    pub context_rows: NonZeroUsize,

    /// Matches are only reported while the current version satisfies this.
    pub constraint: VersionConstraint,

    /// Files are only scanned if modified strictly inside this window.
    pub window: TimeWindow,

    pub parser: LineParser,

    pub detector: VersionDetector,
}

impl SearchConfig {
    /// Defaults for everything except the target.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            context_rows: NonZeroUsize::new(constants::DEFAULT_CONTEXT_ROWS)
                .unwrap_or(NonZeroUsize::MIN),
            constraint: VersionConstraint::default(),
            window: TimeWindow::unbounded(),
            parser: LineParser::default(),
            detector: VersionDetector::default(),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Mutable state of one scan run: the version in effect, the context window,
/// and the results collected so far.
#[derive(Debug)]
pub struct ScanSession {
    gate: VersionGate,
    buffer: ContextRingBuffer,
    results: Vec<MatchResult>,
}

impl ScanSession {
    pub fn new(context_rows: NonZeroUsize) -> Self {
        Self {
            gate: VersionGate::new(),
            buffer: ContextRingBuffer::new(context_rows),
            results: Vec::new(),
        }
    }

    /// Seed the version in effect before the first file is read.
    pub fn with_version(mut self, version: Version) -> Self {
        self.gate = VersionGate::with_version(version);
        self
    }

    pub fn version(&self) -> Option<&Version> {
        self.gate.current()
    }

    /// Forget the carried-over version.
    pub fn reset_version(&mut self) {
        self.gate.reset();
    }

    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<MatchResult> {
        self.results
    }
}

// =============================================================================
// Engine
// =============================================================================

#[derive(Debug, Clone)]
pub struct MatchEngine {
    config: SearchConfig,
}

impl MatchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Fresh session sized for this engine's context window.
    pub fn session(&self) -> ScanSession {
        ScanSession::new(self.config.context_rows)
    }

    /// Whether a file with this modification time should be scanned at all.
    pub fn admits_file(&self, modified: Option<DateTime<Utc>>) -> bool {
        time_gate::admits_file(modified, &self.config.window)
    }

    /// Scan one file's lines, appending matches to `session`.
    ///
    /// Unparseable lines and malformed version tokens are skipped. Any read
    /// error other than end of input is returned.
    pub fn scan<R: BufRead>(
        &self,
        session: &mut ScanSession,
        path: &Path,
        mut reader: R,
    ) -> Result<FileStats, ScanError> {
        let mut stats = FileStats::default();
        let mut row: u64 = 0;
        let mut buf: Vec<u8> = Vec::new();

        session.buffer.clear();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| ScanError::Read {
                    path: path.to_path_buf(),
                    row: row + 1,
                    source,
                })?;
            if read == 0 {
                break;
            }
            row += 1;
            stats.lines_read += 1;

            let raw = decode_line(&buf);

            let line = match self.config.parser.parse(&raw, row) {
                Ok(line) => line,
                Err(e) => {
                    stats.lines_unparseable += 1;
                    tracing::debug!(
                        file = %path.display(),
                        error = %e,
                        line = preview(&raw),
                        "Skipping unparseable line"
                    );
                    continue;
                }
            };

            let is_hit = line.text.contains(self.config.target.as_str());
            session.buffer.push(line);

            let (is_marker, token) = self.config.detector.detect(&raw);
            if is_marker {
                stats.version_markers += 1;
                match session.gate.update(&token) {
                    Ok(version) => {
                        tracing::debug!(file = %path.display(), row, %version, "Version announced");
                    }
                    Err(e) => {
                        stats.invalid_versions += 1;
                        tracing::warn!(
                            file = %path.display(),
                            row,
                            error = %e,
                            "Version marker found but token is not a valid version; keeping previous"
                        );
                    }
                }
            }

            if !session.gate.admits(&self.config.constraint) {
                stats.lines_version_filtered += 1;
                continue;
            }

            if is_hit {
                session.results.push(MatchResult {
                    path: path.to_path_buf(),
                    version: session.gate.current().cloned(),
                    context: session.buffer.snapshot(),
                });
                stats.matches += 1;
                tracing::trace!(file = %path.display(), row, "Match");
            }
        }

        tracing::debug!(
            file = %path.display(),
            lines = stats.lines_read,
            unparseable = stats.lines_unparseable,
            matches = stats.matches,
            "File scanned"
        );

        Ok(stats)
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and decode, replacing invalid
/// UTF-8 sequences.
fn decode_line(buf: &[u8]) -> String {
    let mut end = buf.len();
    if end > 0 && buf[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && buf[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// Truncate a line for debug output on a char boundary.
fn preview(line: &str) -> &str {
    match line.char_indices().nth(constants::DEBUG_MAX_LINE_PREVIEW) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

// =============================================================================
// Tests
// =============================================================================
