use chrono::NaiveDateTime;
use std::collections::HashSet;

use logsieve_types::{LogLevel, LogRecord, TimeRange};

/// Keep records whose level token is one of `levels`
///
/// An empty set means no restriction and keeps every record.
pub fn filter_by_level<'a, I>(records: I, levels: &HashSet<LogLevel>) -> Vec<&'a LogRecord>
where
    I: IntoIterator<Item = &'a LogRecord>,
{
    if levels.is_empty() {
        return records.into_iter().collect();
    }

    records
        .into_iter()
        .filter(|record| record.log_level().is_some_and(|level| levels.contains(&level)))
        .collect()
}

/// Keep records at or after `min`
pub fn filter_from_timestamp<'a, I>(records: I, min: NaiveDateTime) -> Vec<&'a LogRecord>
where
    I: IntoIterator<Item = &'a LogRecord>,
{
    records
        .into_iter()
        .filter(|record| record.timestamp() >= min)
        .collect()
}

/// Keep records at or before `max`
pub fn filter_until_timestamp<'a, I>(records: I, max: NaiveDateTime) -> Vec<&'a LogRecord>
where
    I: IntoIterator<Item = &'a LogRecord>,
{
    records
        .into_iter()
        .filter(|record| record.timestamp() <= max)
        .collect()
}

/// Keep records between `min` and `max`, both inclusive
pub fn filter_timestamp_range<'a, I>(
    records: I,
    min: NaiveDateTime,
    max: NaiveDateTime,
) -> Vec<&'a LogRecord>
where
    I: IntoIterator<Item = &'a LogRecord>,
{
    records
        .into_iter()
        .filter(|record| (min..=max).contains(&record.timestamp()))
        .collect()
}

/// Level and time-range filter applied to a batch of records
#[derive(Clone, Debug, Default)]
pub struct RecordFilter {
    /// Log levels to include (empty = all)
    levels: HashSet<LogLevel>,

    /// Inclusive timestamp bounds
    range: TimeRange,
}

impl RecordFilter {
    /// Create a filter that keeps everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Set log levels to filter by
    pub fn with_levels(mut self, levels: HashSet<LogLevel>) -> Self {
        self.levels = levels;
        self
    }

    /// Set the timestamp range to filter by
    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }

    /// Check if a single record passes this filter
    pub fn matches(&self, record: &LogRecord) -> bool {
        if !self.levels.is_empty()
            && !record
                .log_level()
                .is_some_and(|level| self.levels.contains(&level))
        {
            return false;
        }

        self.range.contains(record.timestamp())
    }

    /// Run the level stage, then the timestamp stage
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a LogRecord>
    where
        I: IntoIterator<Item = &'a LogRecord>,
    {
        let by_level = filter_by_level(records, &self.levels);

        match (self.range.start, self.range.end) {
            (Some(min), Some(max)) => filter_timestamp_range(by_level, min, max),
            (Some(min), None) => filter_from_timestamp(by_level, min),
            (None, Some(max)) => filter_until_timestamp(by_level, max),
            (None, None) => by_level,
        }
    }

    /// Check if filter is empty (matches everything)
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty() && self.range.is_unbounded()
    }
}
