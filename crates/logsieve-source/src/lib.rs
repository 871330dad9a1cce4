//! Log sources for logsieve
//!
//! This crate finds log files on disk and reads them into raw lines for the
//! parser.

mod discover;
mod error;
mod reader;

pub use discover::{LOG_FILE_PATTERN, discover, resolve_glob};
pub use error::SourceError;
pub use reader::{read_all, read_lines};

// Re-export types that are used in our public API
pub use logsieve_types::SourceLine;
