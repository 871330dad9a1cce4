use glob::glob;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SourceError;

/// Pattern for log files inside a directory
pub const LOG_FILE_PATTERN: &str = "*.log";

/// Resolve the log files to read from `path`
///
/// A regular file is returned as-is. A directory yields every `*.log` file
/// directly inside it, sorted by path. With `single_file` set, anything but a
/// regular file is rejected.
pub fn discover(path: &Path, single_file: bool) -> Result<Vec<PathBuf>, SourceError> {
    if !path.exists() {
        return Err(SourceError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if single_file || !path.is_dir() {
        return Err(SourceError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let pattern = resolve_glob(path, LOG_FILE_PATTERN);
    let mut paths: Vec<_> = glob(&pattern)
        .map_err(|e| SourceError::Glob {
            pattern: pattern.clone(),
            source: e,
        })?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

    if paths.is_empty() {
        return Err(SourceError::NoLogFiles {
            path: path.to_path_buf(),
        });
    }

    paths.sort();
    debug!(dir = %path.display(), files = paths.len(), "discovered log files");
    Ok(paths)
}

/// Join a glob pattern onto a directory, escaping the directory part
pub fn resolve_glob(root: &Path, pattern: &str) -> String {
    let root = glob::Pattern::escape(&root.to_string_lossy());
    Path::new(&root).join(pattern).to_string_lossy().into_owned()
}
