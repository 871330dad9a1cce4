use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use logsieve_types::{LogRecord, SourceLine};

use crate::parser::{LogParser, ParseError};

/// What to do when a line cannot be parsed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Record the line as rejected and keep going
    #[default]
    Skip,
    /// Stop at the first malformed line
    Abort,
}

/// A line that failed to parse, with its location
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}:{}: {}", .path.display(), .line_number, .error)]
pub struct RejectedLine {
    pub path: Arc<Path>,
    pub line_number: usize,
    #[source]
    pub error: ParseError,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("aborted on malformed input")]
    Rejected(#[from] RejectedLine),
}

/// Result of parsing a batch of lines
#[derive(Clone, Debug, Default)]
pub struct ParsedBatch {
    /// Successfully parsed records, in input order
    pub records: Vec<LogRecord>,

    /// Lines that were skipped
    pub rejected: Vec<RejectedLine>,
}

impl ParsedBatch {
    /// Number of skipped lines
    pub fn skipped(&self) -> usize {
        self.rejected.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl LogParser {
    /// Parse every line, handling failures according to `policy`
    pub fn parse_batch<I>(lines: I, policy: ErrorPolicy) -> Result<ParsedBatch, BatchError>
    where
        I: IntoIterator<Item = SourceLine>,
    {
        let mut batch = ParsedBatch::default();

        for line in lines {
            match Self::parse(&line.text) {
                Ok(record) => batch.records.push(record),
                Err(error) => {
                    let rejected = RejectedLine {
                        path: line.path,
                        line_number: line.line_number,
                        error,
                    };
                    if policy == ErrorPolicy::Abort {
                        return Err(rejected.into());
                    }
                    debug!("skipping {}", rejected);
                    batch.rejected.push(rejected);
                }
            }
        }

        debug!(
            parsed = batch.records.len(),
            skipped = batch.rejected.len(),
            "parsed batch"
        );
        Ok(batch)
    }
}
