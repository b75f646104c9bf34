// Logrep - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.
//
// Policy: numeric or enumerated values that are out of range produce a
// warning and fall back to the default. Values that change what is matched
// (constraint, window bounds, offset) are kept verbatim here and validated
// when the scan settings are resolved, where a bad value is fatal.

use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for logrep configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logrep/ or %APPDATA%\logrep\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[search]` section.
    pub search: SearchSection,
    /// `[discovery]` section.
    pub discovery: DiscoverySection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[search]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// Substring that defines a match.
    pub target: Option<String>,
    /// Context window size in lines.
    pub context_rows: Option<usize>,
    /// Semantic-version range expression.
    pub version_constraint: Option<String>,
    /// Substring identifying version-announcement lines.
    pub version_marker: Option<String>,
    /// UTC offset of the timestamps in the logs, e.g. "+09:00".
    pub utc_offset: Option<String>,
    /// Exclusive lower bound on file modification time (RFC 3339).
    pub modified_after: Option<String>,
    /// Exclusive upper bound on file modification time (RFC 3339).
    pub modified_before: Option<String>,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Maximum directory recursion depth.
    pub max_depth: Option<usize>,
    /// Include glob patterns.
    pub include_patterns: Option<Vec<String>>,
    /// Exclude glob patterns.
    pub exclude_patterns: Option<Vec<String>>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// "text", "json" or "csv".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated configuration derived from `config.toml`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Search --
    pub target: Option<String>,
    pub context_rows: usize,
    pub version_constraint: String,
    pub version_marker: String,
    pub utc_offset: String,
    pub modified_after: Option<String>,
    pub modified_before: Option<String>,

    // -- Discovery --
    pub max_depth: usize,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,

    // -- Output --
    pub output_format: String,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target: None,
            context_rows: constants::DEFAULT_CONTEXT_ROWS,
            version_constraint: constants::DEFAULT_VERSION_CONSTRAINT.to_string(),
            version_marker: constants::DEFAULT_VERSION_MARKER.to_string(),
            utc_offset: constants::DEFAULT_UTC_OFFSET.to_string(),
            modified_after: None,
            modified_before: None,
            max_depth: constants::DEFAULT_MAX_DEPTH,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            output_format: constants::DEFAULT_OUTPUT_FORMAT.to_string(),
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings.
/// If the file is unparseable, returns defaults with a warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            return (AppConfig::default(), warnings);
        }
    };

    tracing::debug!(path = %config_path.display(), "Loaded config.toml");

    let (config, validation_warnings) = validate(raw);
    warnings.extend(validation_warnings);
    (config, warnings)
}

/// Validate a parsed config, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    // -- Search --
    if let Some(target) = raw.search.target {
        if target.is_empty() {
            warnings.push("[search] target is empty; ignoring it.".to_string());
        } else {
            config.target = Some(target);
        }
    }

    if let Some(rows) = raw.search.context_rows {
        if (constants::MIN_CONTEXT_ROWS..=constants::MAX_CONTEXT_ROWS).contains(&rows) {
            config.context_rows = rows;
        } else {
            warnings.push(format!(
                "[search] context_rows = {rows} is out of range ({}-{}). Using default ({}).",
                constants::MIN_CONTEXT_ROWS,
                constants::MAX_CONTEXT_ROWS,
                constants::DEFAULT_CONTEXT_ROWS,
            ));
        }
    }

    if let Some(constraint) = raw.search.version_constraint {
        config.version_constraint = constraint;
    }

    if let Some(marker) = raw.search.version_marker {
        if marker.is_empty() {
            warnings.push(format!(
                "[search] version_marker is empty. Using default (\"{}\").",
                constants::DEFAULT_VERSION_MARKER,
            ));
        } else {
            config.version_marker = marker;
        }
    }

    if let Some(offset) = raw.search.utc_offset {
        config.utc_offset = offset;
    }

    config.modified_after = raw.search.modified_after.filter(|s| !s.is_empty());
    config.modified_before = raw.search.modified_before.filter(|s| !s.is_empty());

    // -- Discovery --
    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(format!(
                "[discovery] max_depth = {depth} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_DEPTH,
                constants::DEFAULT_MAX_DEPTH,
            ));
        }
    }
    if let Some(include) = raw.discovery.include_patterns {
        config.include_patterns = include;
    }
    if let Some(exclude) = raw.discovery.exclude_patterns {
        config.exclude_patterns = exclude;
    }

    // -- Output --
    if let Some(format) = raw.output.format {
        let lower = format.to_lowercase();
        if ["text", "json", "csv"].contains(&lower.as_str()) {
            config.output_format = lower;
        } else {
            warnings.push(format!(
                "[output] format = \"{format}\" is not recognised. \
                 Expected \"text\", \"json\" or \"csv\". Using default ({}).",
                constants::DEFAULT_OUTPUT_FORMAT,
            ));
        }
    }

    // -- Logging --
    if let Some(level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }
    if let Some(file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file);
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> (AppConfig, Vec<String>) {
        let raw: RawConfig = toml::from_str(toml_str).unwrap();
        validate(raw)
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert!(warnings.is_empty());
        assert_eq!(config.context_rows, constants::DEFAULT_CONTEXT_ROWS);
        assert_eq!(config.version_constraint, ">=0");
        assert!(config.target.is_none());
    }

    #[test]
    fn test_full_config_is_applied() {
        let (config, warnings) = parse(
            r#"
            [search]
            target = "queue is full"
            context_rows = 20
            version_constraint = ">=1.2.4"
            utc_offset = "+09:00"
            modified_after = "2020-11-20T00:00:00+09:00"
            modified_before = "2020-12-31T00:00:00+09:00"

            [discovery]
            max_depth = 3
            exclude_patterns = ["*.gz"]

            [output]
            format = "JSON"

            [logging]
            level = "debug"
            "#,
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.target.as_deref(), Some("queue is full"));
        assert_eq!(config.context_rows, 20);
        assert_eq!(config.version_constraint, ">=1.2.4");
        assert_eq!(config.utc_offset, "+09:00");
        assert_eq!(
            config.modified_after.as_deref(),
            Some("2020-11-20T00:00:00+09:00")
        );
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.exclude_patterns, vec!["*.gz".to_string()]);
        assert_eq!(config.output_format, "json");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_fall_back_with_warnings() {
        let (config, warnings) = parse(
            r#"
            [search]
            context_rows = 0
            [discovery]
            max_depth = 100000
            [output]
            format = "xml"
            [logging]
            level = "loud"
            "#,
        );
        assert_eq!(warnings.len(), 4, "got {warnings:?}");
        assert_eq!(config.context_rows, constants::DEFAULT_CONTEXT_ROWS);
        assert_eq!(config.max_depth, constants::DEFAULT_MAX_DEPTH);
        assert_eq!(config.output_format, "text");
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_file_yields_defaults_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search\ntarget = ").unwrap();
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 1);
        assert!(config.target.is_none());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (_, warnings) = parse("[future]\nshiny = true\n");
        assert!(warnings.is_empty());
    }
}
