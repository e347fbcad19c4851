use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSON_DECODE_ERROR: &str = "JSONDecodeError";

/// A line that could not be decoded as JSON, kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawFailure {
    pub raw_log: String,
    pub error: String,
}

impl RawFailure {
    pub fn json_decode(raw_log: impl Into<String>) -> Self {
        Self {
            raw_log: raw_log.into(),
            error: JSON_DECODE_ERROR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Record(Value),
    Malformed(RawFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// 1-based physical line number in the source object.
    pub line_number: usize,
    pub outcome: LineOutcome,
}

/// Lazy iterator over the non-blank lines of a log object.
///
/// Lines end at `\n`, `\r\n` or a bare `\r`. Cloning captures the current
/// position, so a clone taken before iteration replays the whole object.
#[derive(Debug, Clone)]
pub struct ParsedLines<'a> {
    rest: &'a str,
    line_number: usize,
}

pub fn parse_lines(content: &str) -> ParsedLines<'_> {
    ParsedLines {
        rest: content,
        line_number: 0,
    }
}

impl<'a> ParsedLines<'a> {
    fn next_physical_line(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        self.line_number += 1;
        let line = match self.rest.find(['\n', '\r']) {
            Some(end) => {
                let line = &self.rest[..end];
                let separator = if self.rest[end..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = &self.rest[end + separator..];
                line
            }
            None => std::mem::take(&mut self.rest),
        };
        Some(line)
    }
}

impl Iterator for ParsedLines<'_> {
    type Item = ParsedLine;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(line) = self.next_physical_line() {
            if line.trim().is_empty() {
                continue;
            }
            return Some(ParsedLine {
                line_number: self.line_number,
                outcome: parse_line(line, self.line_number),
            });
        }
        None
    }
}

fn parse_line(line: &str, line_number: usize) -> LineOutcome {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => LineOutcome::Record(value),
        Err(error) => {
            tracing::warn!(line_number, raw_log = line, %error, "failed to parse JSON line");
            LineOutcome::Malformed(RawFailure::json_decode(line))
        }
    }
}

/// Decodes object bytes as UTF-8 text.
pub fn decode_utf8(bytes: &[u8]) -> Result<&str, std::str::Utf8Error> {
    std::str::from_utf8(bytes)
}
