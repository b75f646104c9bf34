// Logrep - app/settings.rs
//
// Resolution of the effective scan settings.
// Priority: CLI override > config.toml > built-in default.
//
// Everything that changes what is matched is validated here, and any invalid
// value is a fatal configuration error.

use crate::core::discovery::DiscoveryConfig;
use crate::core::engine::SearchConfig;
use crate::core::export::ExportFormat;
use crate::core::parser::LineParser;
use crate::core::time_gate;
use crate::core::version::{VersionConstraint, VersionDetector};
use crate::platform::config::AppConfig;
use crate::util::constants;
use crate::util::error::ConfigError;
use std::num::NonZeroUsize;

/// Values supplied on the command line. `None` defers to config.toml.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub target: Option<String>,
    pub context_rows: Option<usize>,
    pub version_constraint: Option<String>,
    pub version_marker: Option<String>,
    pub utc_offset: Option<String>,
    pub modified_after: Option<String>,
    pub modified_before: Option<String>,
    pub format: Option<String>,
}

/// Fully validated settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub search: SearchConfig,
    pub discovery: DiscoveryConfig,
    pub format: ExportFormat,
}

pub fn resolve(overrides: Overrides, config: &AppConfig) -> Result<Settings, ConfigError> {
    let target = overrides
        .target
        .or_else(|| config.target.clone())
        .filter(|t| !t.is_empty())
        .ok_or(ConfigError::MissingField { field: "target" })?;

    let rows = overrides.context_rows.unwrap_or(config.context_rows);
    let context_rows = NonZeroUsize::new(rows)
        .filter(|n| n.get() <= constants::MAX_CONTEXT_ROWS)
        .ok_or_else(|| ConfigError::ValueOutOfRange {
            field: "context_rows".to_string(),
            value: rows.to_string(),
            expected: format!(
                "{}-{}",
                constants::MIN_CONTEXT_ROWS,
                constants::MAX_CONTEXT_ROWS
            ),
        })?;

    let constraint = VersionConstraint::parse(
        overrides
            .version_constraint
            .as_deref()
            .unwrap_or(&config.version_constraint),
    )?;

    let parser = LineParser::with_offset_str(
        overrides
            .utc_offset
            .as_deref()
            .unwrap_or(&config.utc_offset),
    )?;

    let detector = VersionDetector::new(
        overrides
            .version_marker
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| config.version_marker.clone()),
    );

    let window = time_gate::parse_window(
        overrides
            .modified_after
            .as_deref()
            .or(config.modified_after.as_deref()),
        overrides
            .modified_before
            .as_deref()
            .or(config.modified_before.as_deref()),
    )?;

    let format_name = overrides
        .format
        .as_deref()
        .unwrap_or(&config.output_format);
    let format: ExportFormat =
        format_name
            .parse()
            .map_err(|expected: String| ConfigError::ValueOutOfRange {
                field: "format".to_string(),
                value: format_name.to_string(),
                expected,
            })?;

    let search = SearchConfig {
        target,
        context_rows,
        constraint,
        window,
        parser,
        detector,
    };

    let discovery = DiscoveryConfig {
        max_depth: config.max_depth,
        include_patterns: config.include_patterns.clone(),
        exclude_patterns: config.exclude_patterns.clone(),
    };

    tracing::debug!(
        pattern = %search.target,
        rows = search.context_rows.get(),
        constraint = %search.constraint,
        offset = %search.parser.offset(),
        marker = search.detector.marker(),
        format = %format,
        "Settings resolved"
    );

    Ok(Settings {
        search,
        discovery,
        format,
    })
}
