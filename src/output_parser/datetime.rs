//! Single date/time extraction.
//!
//! [`DatetimeParser`] accepts, in order: its configured strftime pattern,
//! common ISO-8601 shapes, and finally the small natural-language grammar
//! in [`natural`](super::natural). Anything else fails rather than being
//! guessed at.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::output_parser::error::{truncate, ParseError};
use crate::output_parser::extract::preprocess;
use crate::output_parser::natural;
use crate::output_parser::OutputParser;

/// Pattern used when none is configured.
pub const DEFAULT_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// ISO-like shapes accepted regardless of the configured pattern.
const ISO_PATTERNS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Fixed instants rendered with the pattern as examples for the model.
const EXAMPLE_INSTANTS: [(i32, u32, u32, u32, u32, u32, u32); 3] = [
    (2023, 7, 4, 14, 30, 0, 0),
    (1999, 12, 31, 23, 59, 59, 999_999),
    (2010, 1, 15, 8, 5, 42, 123_456),
];

/// Parses one timestamp out of a completion.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use llm_output_parsers::output_parser::{DatetimeParser, OutputParser};
///
/// let parser = DatetimeParser::new();
/// let dt = parser.parse("2025-06-15T00:00:00.000000Z").unwrap();
/// assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatetimeParser {
    pattern: String,
    reference: Option<NaiveDateTime>,
}

impl Default for DatetimeParser {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            reference: None,
        }
    }
}

impl DatetimeParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different strftime pattern for instructions and first-pass parsing.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Anchor relative phrases such as "next Tuesday" or "tomorrow".
    pub fn with_reference(mut self, reference: NaiveDateTime) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn reference(&self) -> Option<NaiveDateTime> {
        self.reference
    }

    fn examples(&self) -> Vec<String> {
        EXAMPLE_INSTANTS
            .iter()
            .filter_map(|&(y, mo, d, h, mi, s, us)| {
                NaiveDate::from_ymd_opt(y, mo, d)?.and_hms_micro_opt(h, mi, s, us)
            })
            .filter_map(|dt| {
                // An invalid pattern makes Display fail; skip instead of panicking.
                let mut rendered = String::new();
                write!(rendered, "{}", dt.format(&self.pattern)).ok()?;
                Some(rendered)
            })
            .collect()
    }

    fn parse_structured(&self, text: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, &self.pattern) {
            return Some(dt);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.naive_utc());
        }
        if let Some(dt) = ISO_PATTERNS
            .iter()
            .find_map(|p| NaiveDateTime::parse_from_str(text, p).ok())
        {
            return Some(dt);
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

impl OutputParser for DatetimeParser {
    type Output = NaiveDateTime;

    fn format_instructions(&self) -> String {
        format!(
            "Write a datetime string that matches the following pattern: '{}'.\n\nExamples: {}\n\nReturn ONLY this string, no other words!",
            self.pattern,
            self.examples().join(", ")
        )
    }

    fn parse(&self, text: &str) -> Result<NaiveDateTime, ParseError> {
        let cleaned = preprocess(text)?;
        let candidate = cleaned.trim_matches(|c: char| c == '"' || c == '\'' || c == '`');

        if let Some(dt) = self.parse_structured(candidate) {
            debug!(parser = self.kind(), form = "structured", "datetime parsed");
            return Ok(dt);
        }

        let dt = natural::resolve(candidate, self.reference).map_err(|e| {
            ParseError::InvalidDatetime {
                text: truncate(candidate, 200),
                reason: e.to_string(),
            }
        })?;
        debug!(parser = self.kind(), form = "natural", "datetime parsed");
        Ok(dt)
    }

    fn kind(&self) -> &'static str {
        "datetime"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    /// Wednesday, 12 March 2025.
    fn anchored() -> DatetimeParser {
        DatetimeParser::new().with_reference(at(2025, 3, 12, 9, 0, 0))
    }

    #[test]
    fn default_instructions() {
        let expected = "Write a datetime string that matches the following pattern: '%Y-%m-%dT%H:%M:%S%.6fZ'.\n\nExamples: 2023-07-04T14:30:00.000000Z, 1999-12-31T23:59:59.999999Z, 2010-01-15T08:05:42.123456Z\n\nReturn ONLY this string, no other words!";
        assert_eq!(DatetimeParser::new().format_instructions(), expected);
    }

    #[test]
    fn custom_pattern_instructions() {
        let parser = DatetimeParser::new().with_pattern("%Y-%m-%d");
        assert!(parser
            .format_instructions()
            .contains("Examples: 2023-07-04, 1999-12-31, 2010-01-15"));
    }

    #[test]
    fn default_pattern_round_trip() {
        let dt = DatetimeParser::new()
            .parse("2025-06-15T00:00:00.000000Z")
            .unwrap();
        assert_eq!(dt, at(2025, 6, 15, 0, 0, 0));
    }

    #[test]
    fn iso_shapes_accepted() {
        let parser = DatetimeParser::new();
        assert_eq!(parser.parse("2025-06-15 14:00").unwrap(), at(2025, 6, 15, 14, 0, 0));
        assert_eq!(parser.parse("2025-06-15T14:00:05").unwrap(), at(2025, 6, 15, 14, 0, 5));
        assert_eq!(parser.parse("2025-06-15").unwrap(), at(2025, 6, 15, 0, 0, 0));
        assert_eq!(
            parser.parse("2025-06-15T16:00:00+02:00").unwrap(),
            at(2025, 6, 15, 14, 0, 0)
        );
    }

    #[test]
    fn quoted_answer_accepted() {
        assert_eq!(
            DatetimeParser::new().parse("\"2025-06-15\"\n").unwrap(),
            at(2025, 6, 15, 0, 0, 0)
        );
    }

    #[test]
    fn natural_phrase_with_reference() {
        assert_eq!(
            anchored().parse("next Tuesday at 2pm").unwrap(),
            at(2025, 3, 18, 14, 0, 0)
        );
        assert_eq!(
            DatetimeParser::new().parse("June 15, 2025").unwrap(),
            at(2025, 6, 15, 0, 0, 0)
        );
    }

    #[test]
    fn vague_phrase_fails() {
        let err = anchored()
            .parse("by Vikas' desk by 8am Monday morning")
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidDatetime { .. }));
    }

    #[test]
    fn relative_without_reference_fails() {
        let err = DatetimeParser::new().parse("tomorrow").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidDatetime { ref reason, .. } if reason.contains("reference")
        ));
    }

    #[test]
    fn empty_fails() {
        assert_eq!(
            DatetimeParser::new().parse("<think>when?</think>").unwrap_err(),
            ParseError::EmptyResponse
        );
    }
}
