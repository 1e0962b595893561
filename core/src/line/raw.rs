use chrono::{DateTime, FixedOffset};
use memchr::memchr_iter;

/// One log line split into fields.
///
/// Field 0 is the line-type code. For ACT network lines the timestamp column
/// is lifted out into [`RawLine::timestamp`], so the remaining fields keep
/// the layout parsers map against: `[code, f1, f2, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine {
    fields: Vec<String>,
    line_number: u64,
    timestamp: DateTime<FixedOffset>,
}

#[derive(Debug, thiserror::Error)]
pub enum RawLineError {
    #[error("line {line_number}: empty line")]
    Empty { line_number: u64 },

    #[error("line {line_number}: missing timestamp column")]
    MissingTimestamp { line_number: u64 },

    #[error("line {line_number}: bad timestamp {value:?}: {source}")]
    BadTimestamp {
        line_number: u64,
        value: String,
        source: chrono::ParseError,
    },
}

impl RawLine {
    pub fn new(fields: Vec<String>, line_number: u64, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            fields,
            line_number,
            timestamp,
        }
    }

    /// Split an ACT network log line: `code|timestamp|f1|...|fn|hash`.
    ///
    /// A trailing line terminator is ignored. The checksum column stays in
    /// the field list; parsers never map it.
    pub fn split(line_number: u64, text: &str, delimiter: char) -> Result<Self, RawLineError> {
        let text = text.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            return Err(RawLineError::Empty { line_number });
        }

        let mut fields = split_fields(text, delimiter);
        if fields.len() < 2 {
            return Err(RawLineError::MissingTimestamp { line_number });
        }

        let ts = fields.remove(1);
        let timestamp =
            DateTime::parse_from_rfc3339(&ts).map_err(|source| RawLineError::BadTimestamp {
                line_number,
                value: ts,
                source,
            })?;

        Ok(Self {
            fields,
            line_number,
            timestamp,
        })
    }

    pub fn line_type(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

fn split_fields(text: &str, delimiter: char) -> Vec<String> {
    if !delimiter.is_ascii() {
        return text.split(delimiter).map(str::to_string).collect();
    }

    let bytes = text.as_bytes();
    let mut fields = Vec::new();
    let mut start = 0;
    for end in memchr_iter(delimiter as u8, bytes) {
        fields.push(text[start..end].to_string());
        start = end + 1;
    }
    fields.push(text[start..].to_string());
    fields
}
