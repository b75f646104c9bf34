// Logrep - core/discovery.rs
//
// Recursive directory traversal producing the ordered list of files to scan.
//
// Architecture note: this module uses `walkdir` for directory traversal as an
// OS abstraction. It reads only file *metadata* (mtime), never file
// *contents* -- that boundary is owned by the app layer (app::scan).
//
// Output order is lexicographic by full path string so that rotated logs
// (`app.log.1`, `app.log.2`, ...) and dated directories are visited oldest
// to newest, which the version carry-over relies on.
//
// Any traversal error aborts discovery: a directory that cannot be listed
// would silently drop files out of the middle of the ordered sequence.
//
// Only regular files are returned. Symlinks are resolved once and kept only
// when they point at a regular file; FIFOs, sockets and device nodes are
// skipped.

use crate::util::constants;
use crate::util::error::DiscoveryError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// Glob patterns (filename-only) that a file MUST match to be included.
    /// An empty list means "include everything that is not excluded".
    pub include_patterns: Vec<String>,

    /// Glob patterns matched against filenames AND directory component names.
    /// Matching files are skipped; matching directories are not descended into.
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// A file found under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,

    /// Last modification time; `None` when the platform does not report one.
    pub modified: Option<DateTime<Utc>>,
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover the files under `root`, sorted by path.
///
/// # Errors
/// `RootNotFound`, `NotADirectory` and `PermissionDenied` for an unusable
/// root; `Traversal` for any entry below it that cannot be read.
pub fn discover_files(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<Vec<DiscoveredFile>, DiscoveryError> {
    // `fs::metadata` rather than `Path::is_dir` so access-denied is not
    // reported as not-found.
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
    }

    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    tracing::debug!(
        root = %root.display(),
        max_depth,
        include = ?config.include_patterns,
        exclude = ?config.exclude_patterns,
        "Discovery starting"
    );

    let include_pats = compile_patterns(&config.include_patterns, "include");
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");

    let mut files: Vec<DiscoveredFile> = Vec::new();

    // `filter_entry` short-circuits descent into excluded directory names.
    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if e.file_type().is_dir() && e.depth() > 0 {
                let name = e.file_name().to_str().unwrap_or("");
                return !is_excluded_component(name, &exclude_pats);
            }
            true
        });

    for entry_result in walker {
        let entry = entry_result.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            DiscoveryError::Traversal { path, source: e }
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if is_excluded_filename(&file_name, &exclude_pats) {
            tracing::trace!(file = %file_name, "Excluded by pattern");
            continue;
        }
        if !is_included(&file_name, &include_pats) {
            tracing::trace!(file = %file_name, "Not matched by include patterns");
            continue;
        }

        // Symlinks are not followed during the walk; resolve them here so a
        // link to a regular file is scanned and anything else is skipped.
        let metadata = if entry.path_is_symlink() {
            match std::fs::metadata(path) {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::debug!(file = %path.display(), error = %e, "Skipping dangling symlink");
                    continue;
                }
            }
        } else {
            entry.metadata().map_err(|e| DiscoveryError::Traversal {
                path: path.to_path_buf(),
                source: e,
            })?
        };
        if !metadata.is_file() {
            tracing::debug!(file = %path.display(), "Skipping non-regular file");
            continue;
        }
        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

        files.push(DiscoveredFile {
            path: path.to_path_buf(),
            modified,
        });
    }

    files.sort_by(|a, b| {
        a.path
            .to_string_lossy()
            .cmp(&b.path.to_string_lossy())
    });

    tracing::debug!(files = files.len(), "Discovery complete");

    Ok(files)
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile a list of glob pattern strings into `glob::Pattern` objects.
/// Patterns that fail to compile are logged as warnings and skipped.
fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// Returns true if `dir_name` matches any exclude pattern that contains no
/// wildcard characters. These are treated as directory component exclusions
/// (e.g. "archive", ".git") rather than filename glob patterns.
fn is_excluded_component(dir_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| {
        let s = p.as_str();
        !s.contains('*') && !s.contains('?') && !s.contains('[') && p.matches(dir_name)
    })
}

fn is_excluded_filename(file_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| p.matches(file_name))
}

/// An empty include list means "include all".
fn is_included(file_name: &str, include_pats: &[glob::Pattern]) -> bool {
    include_pats.is_empty() || include_pats.iter().any(|p| p.matches(file_name))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_temp_tree() -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        fs::write(root.join("b.log"), "b\n").expect("write b.log");
        fs::write(root.join("a.log"), "a\n").expect("write a.log");
        fs::write(root.join("a.log.gz"), "binary").expect("write a.log.gz");

        let sub = root.join("a");
        fs::create_dir(&sub).expect("mkdir a");
        fs::write(sub.join("z.log"), "z\n").expect("write a/z.log");

        let archive = root.join("archive");
        fs::create_dir(&archive).expect("mkdir archive");
        fs::write(archive.join("old.log"), "old\n").expect("write archive/old.log");

        dir
    }

    fn names(root: &Path, files: &[DiscoveredFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_recurses_and_sorts_by_path_string() {
        let dir = make_temp_tree();
        let files = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        let found = names(dir.path(), &files);

        assert_eq!(found.len(), 5, "got {found:?}");
        let mut sorted = files.clone();
        sorted.sort_by_key(|f| f.path.to_string_lossy().into_owned());
        assert_eq!(files, sorted, "discovery output must be path-sorted");
        assert!(found.contains(&"a/z.log".to_string()));
    }

    #[test]
    fn test_exclude_patterns_skip_files_and_directories() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            exclude_patterns: vec!["*.gz".to_string(), "archive".to_string()],
            ..Default::default()
        };
        let files = discover_files(dir.path(), &config).unwrap();
        let found = names(dir.path(), &files);
        assert!(!found.iter().any(|n| n.ends_with(".gz")), "got {found:?}");
        assert!(!found.iter().any(|n| n.starts_with("archive")), "got {found:?}");
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_include_patterns_filter_filenames() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            include_patterns: vec!["a*".to_string()],
            ..Default::default()
        };
        let files = discover_files(dir.path(), &config).unwrap();
        let found = names(dir.path(), &files);
        assert_eq!(found, vec!["a.log".to_string(), "a.log.gz".to_string()]);
    }

    #[test]
    fn test_max_depth_1_excludes_subdirs() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            max_depth: 1,
            ..Default::default()
        };
        let files = discover_files(dir.path(), &config).unwrap();
        let found = names(dir.path(), &files);
        assert!(!found.iter().any(|n| n.contains('/')), "got {found:?}");
    }

    #[test]
    fn test_file_metadata_collected() {
        let dir = make_temp_tree();
        let files = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert!(files.iter().all(|f| f.modified.is_some()));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_a_file() {
        let dir = make_temp_tree();
        let target = tempfile::tempdir().unwrap();
        fs::write(target.path().join("outside.log"), "x\n").unwrap();
        std::os::unix::fs::symlink(target.path(), dir.path().join("linked")).unwrap();

        let files = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        let found = names(dir.path(), &files);
        assert!(
            !found.iter().any(|n| n.starts_with("linked")),
            "got {found:?}"
        );
        assert_eq!(found.len(), 5);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_kept_and_dangling_link_skipped() {
        let dir = make_temp_tree();
        std::os::unix::fs::symlink(dir.path().join("a.log"), dir.path().join("c.log")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing.log"), dir.path().join("d.log"))
            .unwrap();

        let files = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        let found = names(dir.path(), &files);
        assert!(found.contains(&"c.log".to_string()), "got {found:?}");
        assert!(!found.contains(&"d.log".to_string()), "got {found:?}");
        let linked = files.iter().find(|f| f.path.ends_with("c.log")).unwrap();
        assert!(linked.modified.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_fifo_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.log"), "a\n").unwrap();
        let status = std::process::Command::new("mkfifo")
            .arg(dir.path().join("pipe.log"))
            .status();
        if !matches!(status, Ok(s) if s.success()) {
            return; // mkfifo unavailable on this host
        }

        let files = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert_eq!(names(dir.path(), &files), vec!["a.log".to_string()]);
    }

    #[test]
    fn test_root_not_found() {
        let result = discover_files(
            Path::new("/nonexistent/logrep-test-path"),
            &DiscoveryConfig::default(),
        );
        assert!(matches!(result, Err(DiscoveryError::RootNotFound { .. })));
    }

    #[test]
    fn test_root_not_a_directory() {
        let dir = make_temp_tree();
        let result = discover_files(&dir.path().join("a.log"), &DiscoveryConfig::default());
        assert!(matches!(result, Err(DiscoveryError::NotADirectory { .. })));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert!(files.is_empty());
    }
}
