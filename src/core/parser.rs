// Logrep - core/parser.rs
//
// Splits a raw log line into timestamp and message.
// Core layer: operates on strings only, never touches the filesystem.
//
// Expected shape: `YYYY-MM-DD HH:MM:SS,mmm : message`. Lines without the
// separator are kept verbatim with no timestamp. Lines with the separator but
// an unreadable timestamp are rejected and skipped by the caller.

use crate::core::model::LogLine;
use crate::util::constants;
use crate::util::error::{ConfigError, ParseError};
use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Line parser bound to the UTC offset the log writer was running at.
#[derive(Debug, Clone)]
pub struct LineParser {
    offset: FixedOffset,
}

impl Default for LineParser {
    fn default() -> Self {
        Self { offset: Utc.fix() }
    }
}

impl LineParser {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build a parser from an offset string such as `+09:00`.
    pub fn with_offset_str(offset: &str) -> Result<Self, ConfigError> {
        let parsed = parse_utc_offset(offset)?;
        Ok(Self::new(parsed))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Parse `raw` (read from line `row`) into a [`LogLine`].
    ///
    /// Only the first separator splits; later occurrences stay in the message.
    pub fn parse(&self, raw: &str, row: u64) -> Result<LogLine, ParseError> {
        let Some((raw_ts, message)) = raw.split_once(constants::FIELD_SEPARATOR) else {
            return Ok(LogLine {
                row,
                timestamp: None,
                text: raw.to_string(),
            });
        };

        let timestamp = self
            .parse_timestamp(raw_ts)
            .map_err(|source| ParseError::TimestampParse {
                row,
                raw_timestamp: raw_ts.to_string(),
                source,
            })?;

        Ok(LogLine {
            row,
            timestamp: Some(timestamp),
            text: message.to_string(),
        })
    }

    /// `2020-08-20 10:00:00,123` -> `2020-08-20T10:00:00.123+09:00` -> instant.
    fn parse_timestamp(&self, raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        let normalised = format!(
            "{}{}",
            raw.replacen(' ', "T", 1).replacen(',', ".", 1),
            self.offset
        );
        DateTime::parse_from_rfc3339(&normalised)
    }
}

/// Parse a `+HH:MM` / `-HH:MM` offset string.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, ConfigError> {
    value
        .trim()
        .parse::<FixedOffset>()
        .map_err(|source| ConfigError::InvalidOffset {
            value: value.to_string(),
            source,
        })
}

// =============================================================================
// Tests
// =============================================================================
