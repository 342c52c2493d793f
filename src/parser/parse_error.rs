use std::fmt::Display;

use crate::parser::QueryParser;

/// Syntax error: where parsing stopped and what was expected there.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub text: String,
    /// Char span of the offending text.
    pub start: usize,
    pub end: usize,
    /// Byte offset of `start` in the statement.
    pub offset: usize,
}

impl ParseError {
    pub fn new(message: &str, pivot: usize, parser: &QueryParser) -> Self {
        let end = (pivot + 12).min(parser.length);
        Self {
            message: message.to_string(),
            text: parser.text_from_range(pivot, end),
            start: pivot,
            end,
            offset: parser.byte_offset(pivot),
        }
    }

    pub fn expected(what: &str, pivot: usize, parser: &QueryParser) -> Self {
        Self::new(&format!("Expected {}", what), pivot, parser)
    }

    pub fn err<T>(self) -> Result<T, ParseError> {
        Err(self)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ParseError: {} (at char {})\n  at [{}:{}] -> '{}'",
            self.message,
            self.offset,
            self.start,
            self.end,
            self.text
        )
    }
}

impl std::error::Error for ParseError {}
