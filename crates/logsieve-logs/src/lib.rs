//! Log processing for logsieve
//!
//! This crate provides line parsing, batch parsing, and record filtering.

mod batch;
mod filter;
mod parser;

pub use batch::{BatchError, ErrorPolicy, ParsedBatch, RejectedLine};
pub use filter::{
    RecordFilter, filter_by_level, filter_from_timestamp, filter_timestamp_range,
    filter_until_timestamp,
};
pub use parser::{LOG_TIMESTAMP_FORMAT, LogParser, MalformedReason, ParseError};

// Re-export types used in our public API
pub use logsieve_types::{LogLevel, LogRecord, SourceLine, TimeRange};
