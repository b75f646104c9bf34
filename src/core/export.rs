// Logrep - core/export.rs
//
// Serialisation of match results as text, CSV, or JSON.
// Core layer: writes to any Write trait object.
//
// Text layout, one record per match:
//
//   0: ver=1.2.4, path=logs/a.log
//   	3: time=2020-08-20T10:00:03.123+09:00, log=three
//   	4: time=0001-01-01T00:00:00Z, log=    at frame
//
// A missing version prints as `unknown`, a missing timestamp as the zero instant.

use crate::core::model::{LogLine, MatchResult};
use crate::util::constants;
use crate::util::error::ExportError;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Output format for match results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!(
                "unknown output format '{other}' (expected text, json or csv)"
            )),
        }
    }
}

/// Write `results` in `format`. Returns the number of match records written.
pub fn export<W: Write>(
    results: &[MatchResult],
    format: ExportFormat,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    match format {
        ExportFormat::Text => export_text(results, writer, export_path),
        ExportFormat::Json => export_json(results, writer, export_path),
        ExportFormat::Csv => export_csv(results, writer, export_path),
    }
}

/// Export in the indexed, tab-indented text layout.
pub fn export_text<W: Write>(
    results: &[MatchResult],
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let io_err = |source| ExportError::Io {
        path: export_path.to_path_buf(),
        source,
    };

    for (index, result) in results.iter().enumerate() {
        write!(writer, "{index}: {}", TextRecord(result)).map_err(io_err)?;
        writeln!(writer).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;

    Ok(results.len())
}

/// Export one CSV row per context line.
///
/// Columns: match, version, path, row, time, log.
pub fn export_csv<W: Write>(
    results: &[MatchResult],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: export_path.to_path_buf(),
        source,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["match", "version", "path", "row", "time", "log"])
        .map_err(csv_err)?;

    for (index, result) in results.iter().enumerate() {
        let version = version_label(result);
        let path = result.path.display().to_string();
        for line in &result.context {
            csv_writer
                .write_record([
                    index.to_string().as_str(),
                    version.as_str(),
                    path.as_str(),
                    line.row.to_string().as_str(),
                    format_timestamp(line.timestamp.as_ref()).as_str(),
                    line.text.as_str(),
                ])
                .map_err(csv_err)?;
        }
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(results.len())
}

/// Export as a pretty-printed JSON array of match objects.
pub fn export_json<W: Write>(
    results: &[MatchResult],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, results).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(results.len())
}

// =============================================================================
// Formatting helpers
// =============================================================================

struct TextRecord<'a>(&'a MatchResult);

impl fmt::Display for TextRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        write!(
            f,
            "ver={}, path={}",
            version_label(result),
            result.path.display()
        )?;
        for line in &result.context {
            write!(f, "\n{}", TextLine(line))?;
        }
        Ok(())
    }
}

struct TextLine<'a>(&'a LogLine);

impl fmt::Display for TextLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.0;
        write!(
            f,
            "\t{}: time={}, log={}",
            line.row,
            format_timestamp(line.timestamp.as_ref()),
            line.text
        )
    }
}

fn version_label(result: &MatchResult) -> String {
    result
        .version
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| constants::UNKNOWN_VERSION.to_string())
}

/// RFC 3339 with the minimal number of fractional digits (none when the
/// fraction is zero) and `Z` for a zero offset.
pub fn format_timestamp(ts: Option<&DateTime<FixedOffset>>) -> String {
    let Some(ts) = ts else {
        return constants::ZERO_TIMESTAMP.to_string();
    };
    let full = ts.to_rfc3339_opts(SecondsFormat::Nanos, true);
    // `full` is `YYYY-MM-DDTHH:MM:SS.nnnnnnnnn<offset>`; the fraction starts at 19.
    let (head, tail) = full.split_at(20);
    let (fraction, offset) = tail.split_at(9);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}{offset}", &head[..19])
    } else {
        format!("{head}{fraction}{offset}")
    }
}

// =============================================================================
// Tests
// =============================================================================
