use hashbrown::HashMap;

use super::parser::LineParser;
use super::parsers::default_parsers;
use super::{FieldError, RawLine};
use crate::events::XivEvent;

/// A recognised line that failed to decode. The line is dropped; the stream
/// carries on.
#[derive(Debug, thiserror::Error)]
#[error("line {line_number}: malformed {parser} ({line_type:02}) line: {source}")]
pub struct LineError {
    pub line_type: u16,
    pub parser: &'static str,
    pub line_number: u64,
    #[source]
    pub source: FieldError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// No parser for this line type. Expected: the log format carries many
    /// line types nothing here cares about.
    Unhandled,
    /// The parser understood the line but produced no event.
    Declined,
    Event(XivEvent),
}

/// Line-type code -> parser.
#[derive(Default)]
pub struct LineParserRegistry {
    parsers: HashMap<u16, Box<dyn LineParser>>,
}

impl LineParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in parser.
    pub fn with_default_parsers() -> Self {
        let mut registry = Self::new();
        for parser in default_parsers() {
            registry.register(parser);
        }
        registry
    }

    /// Add `parser`, returning the one it replaces for the same line type.
    pub fn register(&mut self, parser: Box<dyn LineParser>) -> Option<Box<dyn LineParser>> {
        tracing::debug!(line_type = parser.line_type(), parser = parser.name(), "Registering line parser");
        self.parsers.insert(parser.line_type(), parser)
    }

    pub fn handles(&self, line_type: u16) -> bool {
        self.parsers.contains_key(&line_type)
    }

    pub fn line_types(&self) -> Vec<u16> {
        let mut codes: Vec<u16> = self.parsers.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    pub fn dispatch(&self, line: &RawLine) -> Result<Dispatch, LineError> {
        let Some(parser) = parse_line_type(line.line_type()).and_then(|code| self.parsers.get(&code))
        else {
            return Ok(Dispatch::Unhandled);
        };

        match parser.parse(line) {
            Ok(Some(event)) => Ok(Dispatch::Event(event)),
            Ok(None) => Ok(Dispatch::Declined),
            Err(source) => Err(LineError {
                line_type: parser.line_type(),
                parser: parser.name(),
                line_number: line.line_number(),
                source,
            }),
        }
    }
}

/// Decimal line-type code. Anything else is not a code we could handle.
fn parse_line_type(code: &str) -> Option<u16> {
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    code.parse().ok()
}
