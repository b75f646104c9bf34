// Logrep - app/scan.rs
//
// Scan pipeline: discovery -> modification-time gate -> per-file match engine.
//
// Files are processed strictly one at a time, in path order. The first fatal
// error (enumeration, open, or read failure) ends the run and the session,
// together with every result collected so far, is dropped.
//
// Transient open errors are retried with capped backoff before giving up.

use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::engine::{MatchEngine, ScanSession};
use crate::core::model::{MatchResult, ScanSummary};
use crate::util::constants;
use crate::util::error::{LogrepError, ScanError};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

/// Results of a completed scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// One record per match, in discovery order (file order, then line order).
    pub results: Vec<MatchResult>,
    pub summary: ScanSummary,
}

/// Scan every file under `root` with a fresh session.
pub fn run_scan(
    root: &Path,
    engine: &MatchEngine,
    discovery_config: &DiscoveryConfig,
) -> Result<ScanOutcome, LogrepError> {
    run_scan_with_session(root, engine, discovery_config, engine.session())
}

/// Scan every file under `root`, starting from `session` (e.g. one seeded
/// with a known version).
pub fn run_scan_with_session(
    root: &Path,
    engine: &MatchEngine,
    discovery_config: &DiscoveryConfig,
    mut session: ScanSession,
) -> Result<ScanOutcome, LogrepError> {
    let scan_start = Instant::now();
    let mut summary = ScanSummary::default();

    let files = discovery::discover_files(root, discovery_config)?;
    summary.files_discovered = files.len();

    tracing::info!(
        root = %root.display(),
        files = files.len(),
        pattern = %engine.config().target,
        constraint = %engine.config().constraint,
        "Scan started"
    );

    for file in &files {
        if !engine.admits_file(file.modified) {
            summary.files_skipped += 1;
            tracing::debug!(
                file = %file.path.display(),
                modified = ?file.modified,
                "Skipped: modified outside the time window"
            );
            continue;
        }

        let handle = open_with_retry(&file.path).map_err(|source| ScanError::Open {
            path: file.path.clone(),
            source,
        })?;

        let stats = engine.scan(&mut session, &file.path, BufReader::new(handle))?;
        summary.add_file(&stats);
    }

    summary.duration = scan_start.elapsed();

    tracing::info!(
        discovered = summary.files_discovered,
        scanned = summary.files_scanned,
        skipped = summary.files_skipped,
        lines = summary.lines_read,
        unparseable = summary.lines_unparseable,
        version_markers = summary.version_markers,
        invalid_versions = summary.invalid_versions,
        version_filtered = summary.lines_version_filtered,
        matches = summary.matches,
        duration_ms = summary.duration.as_millis() as u64,
        "Scan complete"
    );

    Ok(ScanOutcome {
        results: session.into_results(),
        summary,
    })
}

// =============================================================================
// File open helpers
// =============================================================================

/// Open a file, retrying transient errors with capped backoff.
fn open_with_retry(path: &Path) -> io::Result<File> {
    retry_transient(path, || File::open(path))
}

/// Run `op`, retrying after each delay in `OPEN_RETRY_DELAYS_MS` while it
/// fails with a transient error. The last error is returned without a
/// further wait.
fn retry_transient<T>(path: &Path, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut delays = constants::OPEN_RETRY_DELAYS_MS.iter();
    let mut attempt = 1;

    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if is_transient_error(&e) => {
                let Some(delay_ms) = delays.next() else {
                    return Err(e);
                };
                tracing::debug!(
                    file = %path.display(),
                    attempt,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(*delay_ms));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Returns true for transient I/O errors that are worth retrying.
fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::SearchConfig;
    use crate::util::error::DiscoveryError;

    #[test]
    fn test_transient_error_kinds() {
        assert!(is_transient_error(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(is_transient_error(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(!is_transient_error(&io::Error::from(io::ErrorKind::NotFound)));
    }

    #[test]
    fn test_open_missing_file_fails_without_retry() {
        let err = open_with_retry(Path::new("/nonexistent/logrep/a.log")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_retry_attempts_once_more_after_each_delay() {
        let mut calls = 0;
        let err = retry_transient(Path::new("a.log"), || -> io::Result<()> {
            calls += 1;
            Err(io::Error::from(io::ErrorKind::Interrupted))
        })
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
        // Every backoff delay is followed by another attempt.
        assert_eq!(calls, constants::OPEN_RETRY_DELAYS_MS.len() + 1);
    }

    #[test]
    fn test_retry_succeeds_after_transient_errors() {
        let mut calls = 0;
        let value = retry_transient(Path::new("a.log"), || {
            calls += 1;
            if calls < 3 {
                Err(io::Error::from(io::ErrorKind::WouldBlock))
            } else {
                Ok(42)
            }
        })
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_does_not_repeat_permanent_errors() {
        let mut calls = 0;
        let err = retry_transient(Path::new("a.log"), || -> io::Result<()> {
            calls += 1;
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        })
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let engine = MatchEngine::new(SearchConfig::new("W"));
        let err = run_scan(
            Path::new("/nonexistent/logrep-root"),
            &engine,
            &DiscoveryConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LogrepError::Discovery(DiscoveryError::RootNotFound { .. })
        ));
    }

    #[test]
    fn test_results_in_file_then_line_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.log"), "W b1\nW b2\n").unwrap();
        std::fs::write(dir.path().join("a.log"), "x\nW a2\n").unwrap();

        let engine = MatchEngine::new(SearchConfig::new("W"));
        let outcome = run_scan(dir.path(), &engine, &DiscoveryConfig::default()).unwrap();

        let order: Vec<(String, u64)> = outcome
            .results
            .iter()
            .map(|r| {
                (
                    r.path.file_name().unwrap().to_string_lossy().into_owned(),
                    r.matched_line().unwrap().row,
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.log".to_string(), 2),
                ("b.log".to_string(), 1),
                ("b.log".to_string(), 2),
            ]
        );
        assert_eq!(outcome.summary.files_scanned, 2);
        assert_eq!(outcome.summary.matches, 3);
    }
}
