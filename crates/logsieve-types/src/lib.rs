//! Shared types for logsieve
//!
//! This crate contains data structures used across multiple logsieve crates.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Calendar format accepted for filter date bounds
pub const DATE_FORMAT: &str = "%Y/%m/%d";

// ============================================================================
// Errors
// ============================================================================

/// Invalid caller-supplied filter parameter
#[derive(Debug, thiserror::Error)]
pub enum FilterParamError {
    #[error("not a valid date: '{value}' (expected YYYY/MM/DD)")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("date out of range: {date}")]
    DateOutOfRange { date: NaiveDate },

    #[error("unknown log level '{value}' (expected one of DEBUG, INFO, WARNING, ERROR)")]
    UnknownLevel { value: String },

    #[error("initial date {start} is after final date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

// ============================================================================
// Log Types
// ============================================================================

/// Log severity level accepted by the level filter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [Self::Debug, Self::Info, Self::Warning, Self::Error];

    /// Token as it appears in a log line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Exact, case-sensitive match against a token taken from a log line
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == token)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = FilterParamError;

    /// Parse user input; case is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(&s.trim().to_uppercase()).ok_or_else(|| FilterParamError::UnknownLevel {
            value: s.to_string(),
        })
    }
}

/// A single parsed access-log line
///
/// Built once per line by the parser and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    raw_text: String,
    timestamp: NaiveDateTime,
    level: String,
    message: String,
}

impl LogRecord {
    pub fn new(raw_text: String, timestamp: NaiveDateTime, level: String, message: String) -> Self {
        Self {
            raw_text,
            timestamp,
            level,
            message,
        }
    }

    /// Original line without its terminator
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Level token exactly as found in the line
    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Level token mapped onto the known levels, if it is one of them
    pub fn log_level(&self) -> Option<LogLevel> {
        LogLevel::from_token(&self.level)
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_text)
    }
}

/// A raw line read from a log file, tagged with where it came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLine {
    /// File the line was read from
    pub path: Arc<Path>,

    /// 1-based line number within the file
    pub line_number: usize,

    /// Line content including its terminator
    pub text: String,
}

impl SourceLine {
    pub fn new(path: Arc<Path>, line_number: usize, text: String) -> Self {
        Self {
            path,
            line_number,
            text,
        }
    }
}

// ============================================================================
// Filter Parameters
// ============================================================================

/// Parse a `YYYY/MM/DD` date bound
pub fn parse_date(value: &str) -> Result<NaiveDate, FilterParamError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| {
        FilterParamError::InvalidDate {
            value: value.to_string(),
            source,
        }
    })
}

/// Inclusive timestamp interval; an unset bound is unbounded on that side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimeRange {
    /// Range with no bounds (matches every timestamp)
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build a range from calendar dates
    ///
    /// The start date is included from its first instant and the end date
    /// through its last instant. A start date after the end date is an error
    /// here, whereas the filter functions given such bounds just return nothing.
    pub fn from_dates(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, FilterParamError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(FilterParamError::InvertedRange { start, end });
            }
        }

        Ok(Self {
            start: start.map(start_of_day).transpose()?,
            end: end.map(end_of_day).transpose()?,
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Check whether a timestamp falls inside the range (bounds inclusive)
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start.is_none_or(|start| timestamp >= start)
            && self.end.is_none_or(|end| timestamp <= end)
    }
}

fn start_of_day(date: NaiveDate) -> Result<NaiveDateTime, FilterParamError> {
    date.and_hms_opt(0, 0, 0)
        .ok_or(FilterParamError::DateOutOfRange { date })
}

fn end_of_day(date: NaiveDate) -> Result<NaiveDateTime, FilterParamError> {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or(FilterParamError::DateOutOfRange { date })
}
