// Logrep - core/time_gate.rs
//
// File-level modification-time gate. Applied once per file before any of its
// lines are read; a rejected file contributes no matches.

use crate::core::model::TimeWindow;
use crate::util::error::ConfigError;
use chrono::{DateTime, Utc};

/// Strict on both ends: `window.start < modified < window.end`.
pub fn admits(modified: DateTime<Utc>, window: &TimeWindow) -> bool {
    window.start < modified && modified < window.end
}

/// Gate for a file whose modification time may be unavailable.
///
/// Files with no readable mtime are admitted (fail-open) so that platforms
/// without mtime support do not silently hide every file.
pub fn admits_file(modified: Option<DateTime<Utc>>, window: &TimeWindow) -> bool {
    match modified {
        Some(mtime) => admits(mtime, window),
        None => true,
    }
}

/// Build a window from optional RFC 3339 bounds; a missing bound is open.
pub fn parse_window(
    modified_after: Option<&str>,
    modified_before: Option<&str>,
) -> Result<TimeWindow, ConfigError> {
    let mut window = TimeWindow::unbounded();
    if let Some(raw) = modified_after {
        window.start = parse_bound("modified_after", raw)?;
    }
    if let Some(raw) = modified_before {
        window.end = parse_bound("modified_before", raw)?;
    }
    if window.is_empty() {
        return Err(ConfigError::EmptyWindow {
            start: window.start.to_rfc3339(),
            end: window.end.to_rfc3339(),
        });
    }
    Ok(window)
}

fn parse_bound(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| ConfigError::InvalidTimestamp {
            field,
            value: raw.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2020, 8, 19, 15, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 8, 20, 15, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_inside_window_admitted() {
        let w = window();
        assert!(admits(w.start + Duration::hours(1), &w));
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let w = window();
        assert!(!admits(w.start, &w), "start bound must be exclusive");
        assert!(!admits(w.end, &w), "end bound must be exclusive");
    }

    #[test]
    fn test_outside_window_rejected() {
        let w = window();
        assert!(!admits(w.start - Duration::days(1), &w));
        assert!(!admits(w.end + Duration::seconds(1), &w));
    }

    #[test]
    fn test_unbounded_window_admits_now() {
        assert!(admits(Utc::now(), &TimeWindow::unbounded()));
    }

    #[test]
    fn test_parse_window_converts_to_utc() {
        let w = parse_window(
            Some("2020-08-20T00:00:00+09:00"),
            Some("2020-08-21T00:00:00+09:00"),
        )
        .unwrap();
        assert_eq!(w, window());
    }

    #[test]
    fn test_parse_window_open_ends() {
        let w = parse_window(None, Some("2020-08-21T00:00:00Z")).unwrap();
        assert_eq!(w.start, TimeWindow::unbounded().start);
        assert_eq!(parse_window(None, None).unwrap(), TimeWindow::unbounded());
    }

    #[test]
    fn test_parse_window_rejects_bad_input() {
        assert!(matches!(
            parse_window(Some("yesterday"), None),
            Err(ConfigError::InvalidTimestamp {
                field: "modified_after",
                ..
            })
        ));
        assert!(matches!(
            parse_window(
                Some("2020-08-21T00:00:00Z"),
                Some("2020-08-20T00:00:00Z")
            ),
            Err(ConfigError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn test_missing_mtime_fails_open() {
        assert!(admits_file(None, &window()));
        assert!(!admits_file(Some(window().end), &window()));
    }
}
