use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("path {path} wasn't found; it doesn't exist or read permission is missing")]
    NotFound { path: PathBuf },

    #[error("{path} is not a regular file")]
    NotAFile { path: PathBuf },

    #[error("no *.log files found in {path}")]
    NoLogFiles { path: PathBuf },

    #[error("glob pattern error: {pattern}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read log file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
