use chrono::{NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::LazyLock;

use logsieve_types::LogRecord;

/// Timestamp layout inside the brackets; the offset is matched literally
pub const LOG_TIMESTAMP_FORMAT: &str = "%d/%m/%Y:%H:%M:%S +0000";

/// Marks the end of the identity block and the start of the timestamp
const IDENTITY_DELIMITER: &str = " - - [";

/// Closes the timestamp block
const TIMESTAMP_DELIMITER: &str = "] ";

/// method, path, protocol, status, size, level, message
const FIELD_COUNT: usize = 7;

// chrono accepts unpadded numbers, so the zero-padded shape is checked first
static TIMESTAMP_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}/\d{2}/\d{4}:\d{2}:\d{2}:\d{2} \+0000$").expect("valid timestamp regex")
});

/// Which structural part of a line was missing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MalformedReason {
    MissingIdentityDelimiter,
    MissingTimestampDelimiter,
    TooFewFields { found: usize },
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentityDelimiter => {
                write!(f, "expected exactly one '{}' delimiter", IDENTITY_DELIMITER)
            }
            Self::MissingTimestampDelimiter => {
                write!(f, "expected exactly one '{}' delimiter", TIMESTAMP_DELIMITER)
            }
            Self::TooFewFields { found } => write!(
                f,
                "expected {} fields after the timestamp, found {}",
                FIELD_COUNT, found
            ),
        }
    }
}

/// Why a line could not be turned into a record
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed line: {reason}")]
    MalformedLine { reason: MalformedReason },

    #[error("malformed timestamp '{raw}' (expected DD/MM/YYYY:HH:MM:SS +0000)")]
    MalformedTimestamp { raw: String },
}

impl From<MalformedReason> for ParseError {
    fn from(reason: MalformedReason) -> Self {
        Self::MalformedLine { reason }
    }
}

/// Log parser for the fixed access-log layout
pub struct LogParser;

impl LogParser {
    /// Parse one raw line, including its trailing terminator, into a LogRecord
    pub fn parse(line: &str) -> Result<LogRecord, ParseError> {
        let raw_text = Self::strip_terminator(line);
        let unquoted = raw_text.replace('"', "");

        let (_identity, rest) = split_exactly_once(&unquoted, IDENTITY_DELIMITER)
            .ok_or(MalformedReason::MissingIdentityDelimiter)?;

        let (raw_timestamp, rest) = split_exactly_once(rest, TIMESTAMP_DELIMITER)
            .ok_or(MalformedReason::MissingTimestampDelimiter)?;

        let timestamp = Self::parse_timestamp(raw_timestamp)?;

        // The message is the last field and keeps its inner spaces
        let fields: Vec<&str> = rest.splitn(FIELD_COUNT, ' ').collect();
        if fields.len() < FIELD_COUNT {
            return Err(MalformedReason::TooFewFields {
                found: fields.len(),
            }
            .into());
        }

        Ok(LogRecord::new(
            raw_text.to_string(),
            timestamp,
            fields[FIELD_COUNT - 2].to_string(),
            fields[FIELD_COUNT - 1].to_string(),
        ))
    }

    /// Parse the bracketed timestamp text
    pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, ParseError> {
        let malformed = || ParseError::MalformedTimestamp {
            raw: raw.to_string(),
        };

        if !TIMESTAMP_SHAPE.is_match(raw) {
            return Err(malformed());
        }
        let timestamp =
            NaiveDateTime::parse_from_str(raw, LOG_TIMESTAMP_FORMAT).map_err(|_| malformed())?;

        // chrono reads second 60 as a leap second; the log format has none
        if timestamp.nanosecond() >= 1_000_000_000 {
            return Err(malformed());
        }
        Ok(timestamp)
    }

    /// Drop exactly the final character, which is assumed to be the line terminator
    fn strip_terminator(line: &str) -> &str {
        match line.char_indices().next_back() {
            Some((idx, _)) => &line[..idx],
            None => line,
        }
    }
}

/// Split on `delimiter` only when it occurs exactly once
fn split_exactly_once<'a>(text: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
    let (left, right) = text.split_once(delimiter)?;
    if right.contains(delimiter) {
        return None;
    }
    Some((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const LINE: &str = "host - - [22/03/2025:10:00:00 +0000] \"GET /x HTTP/1.1\" 200 512 INFO something went wrong\n";

    #[test]
    fn test_parse_example_line() {
        let record = LogParser::parse(LINE).unwrap();

        let expected = NaiveDate::from_ymd_opt(2025, 3, 22)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(record.timestamp(), expected);
        assert_eq!(record.level(), "INFO");
        assert_eq!(record.message(), "something went wrong");
    }

    #[test]
    fn test_raw_text_keeps_quotes_and_drops_terminator() {
        let record = LogParser::parse(LINE).unwrap();
        assert_eq!(record.raw_text(), &LINE[..LINE.len() - 1]);
        assert!(record.raw_text().contains("\"GET /x HTTP/1.1\""));
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(LogParser::parse(LINE).unwrap(), LogParser::parse(LINE).unwrap());
    }

    #[test]
    fn test_message_keeps_repeated_spaces() {
        let line = "h - - [01/01/2024:00:00:00 +0000] \"POST /a HTTP/2\" 500 0 ERROR disk  full on /dev/sda1\n";
        let record = LogParser::parse(line).unwrap();
        assert_eq!(record.level(), "ERROR");
        assert_eq!(record.message(), "disk  full on /dev/sda1");
    }

    #[test]
    fn test_level_token_is_not_validated() {
        let line = "h - - [01/01/2024:00:00:00 +0000] \"GET / HTTP/1.1\" 200 1 notice hello\n";
        let record = LogParser::parse(line).unwrap();
        assert_eq!(record.level(), "notice");
        assert_eq!(record.log_level(), None);
    }

    #[test]
    fn test_missing_identity_delimiter() {
        let line = "host [22/03/2025:10:00:00 +0000] \"GET /x HTTP/1.1\" 200 512 INFO ok\n";
        assert_eq!(
            LogParser::parse(line),
            Err(ParseError::MalformedLine {
                reason: MalformedReason::MissingIdentityDelimiter
            })
        );
    }

    #[test]
    fn test_repeated_identity_delimiter() {
        let line = "a - - [b - - [22/03/2025:10:00:00 +0000] GET /x HTTP/1.1 200 512 INFO ok\n";
        assert_eq!(
            LogParser::parse(line),
            Err(ParseError::MalformedLine {
                reason: MalformedReason::MissingIdentityDelimiter
            })
        );
    }

    #[test]
    fn test_missing_timestamp_delimiter() {
        let line = "host - - [22/03/2025:10:00:00 +0000 GET /x HTTP/1.1 200 512 INFO ok\n";
        assert_eq!(
            LogParser::parse(line),
            Err(ParseError::MalformedLine {
                reason: MalformedReason::MissingTimestampDelimiter
            })
        );
    }

    #[test]
    fn test_too_few_fields() {
        let line = "host - - [22/03/2025:10:00:00 +0000] \"GET /x HTTP/1.1\" 200 INFO\n";
        assert_eq!(
            LogParser::parse(line),
            Err(ParseError::MalformedLine {
                reason: MalformedReason::TooFewFields { found: 5 }
            })
        );
    }

    #[test]
    fn test_empty_and_blank_lines_are_malformed() {
        assert!(matches!(
            LogParser::parse(""),
            Err(ParseError::MalformedLine { .. })
        ));
        assert!(matches!(
            LogParser::parse("\n"),
            Err(ParseError::MalformedLine { .. })
        ));
    }

    #[test]
    fn test_malformed_timestamp() {
        let cases = [
            "host - - [2025-03-22 10:00:00] GET /x HTTP/1.1 200 512 INFO ok\n",
            "host - - [22/3/2025:10:00:00 +0000] GET /x HTTP/1.1 200 512 INFO ok\n",
            "host - - [22/03/2025:10:00:00 +0100] GET /x HTTP/1.1 200 512 INFO ok\n",
            "host - - [31/02/2025:10:00:00 +0000] GET /x HTTP/1.1 200 512 INFO ok\n",
            "host - - [22/03/2025:25:00:00 +0000] GET /x HTTP/1.1 200 512 INFO ok\n",
            "host - - [22/03/2025:10:00:60 +0000] GET /x HTTP/1.1 200 512 INFO ok\n",
        ];
        for line in cases {
            assert!(
                matches!(
                    LogParser::parse(line),
                    Err(ParseError::MalformedTimestamp { .. })
                ),
                "expected timestamp error for {line:?}"
            );
        }
    }

    #[test]
    fn test_last_second_of_minute_is_accepted() {
        let ts = LogParser::parse_timestamp("22/03/2025:10:00:59 +0000").unwrap();
        assert_eq!(ts.second(), 59);
    }

    #[test]
    fn test_strip_terminator_handles_multibyte_last_char() {
        assert_eq!(LogParser::strip_terminator("abc─"), "abc");
        assert_eq!(LogParser::strip_terminator(""), "");
    }
}
