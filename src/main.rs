// Logrep - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation (debug mode support)
// 3. Settings resolution, scan, and export of the results

use clap::Parser;
use logrep::app::scan;
use logrep::app::settings::{self, Overrides};
use logrep::core::engine::MatchEngine;
use logrep::core::export::{self, ExportFormat};
use logrep::core::model::MatchResult;
use logrep::platform::{config, fs};
use logrep::util::{
    self,
    error::{ExportError, LogrepError},
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Logrep - contextual log grep
#[derive(Parser, Debug)]
#[command(name = "logrep", version, about)]
struct Cli {
    /// Directory to scan recursively.
    dir: PathBuf,

    /// Output file (`-` for stdout).
    output: PathBuf,

    /// Substring that marks a matching line.
    #[arg(short = 't', long = "target")]
    target: Option<String>,

    /// Number of context lines per match, the matched line included.
    #[arg(short = 'n', long = "rows")]
    rows: Option<usize>,

    /// Version range the current app version must satisfy, e.g. ">=1.2.4".
    #[arg(short = 'c', long = "constraint")]
    constraint: Option<String>,

    /// Only scan files modified after this instant (RFC 3339).
    #[arg(long = "after")]
    after: Option<String>,

    /// Only scan files modified before this instant (RFC 3339).
    #[arg(long = "before")]
    before: Option<String>,

    /// UTC offset of the timestamps inside the logs, e.g. "+09:00".
    #[arg(long = "utc-offset", allow_hyphen_values = true)]
    utc_offset: Option<String>,

    /// Substring identifying version-announcement lines.
    #[arg(long = "version-marker")]
    version_marker: Option<String>,

    /// Output format: text, json or csv.
    #[arg(short = 'f', long = "format")]
    format: Option<String>,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config::PlatformPaths::resolve().config_file());
    let (app_config, warnings) = config::load_config(&config_path);

    util::logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "Logrep starting"
    );

    for warning in &warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    if let Err(e) = run(cli, &app_config) {
        tracing::error!(error = %e, "Scan failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, app_config: &config::AppConfig) -> Result<(), LogrepError> {
    let overrides = Overrides {
        target: cli.target,
        context_rows: cli.rows,
        version_constraint: cli.constraint,
        version_marker: cli.version_marker,
        utc_offset: cli.utc_offset,
        modified_after: cli.after,
        modified_before: cli.before,
        format: cli.format,
    };
    let settings = settings::resolve(overrides, app_config)?;

    let engine = MatchEngine::new(settings.search);
    let outcome = scan::run_scan(&cli.dir, &engine, &settings.discovery)?;

    write_results(&cli.output, &outcome.results, settings.format)?;
    Ok(())
}

fn write_results(
    path: &Path,
    results: &[MatchResult],
    format: ExportFormat,
) -> Result<(), LogrepError> {
    let io_err = |source: io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = fs::create_output(path).map_err(io_err)?;
    let written = export::export(results, format, &mut writer, path)?;
    writer.flush().map_err(io_err)?;

    tracing::info!(
        output = %path.display(),
        format = %format,
        matches = written,
        "Results written"
    );
    Ok(())
}
