use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::{
    ast::{quote_string, unquote_string},
    is_reserved, ParseError, QueryParser, WordComparer,
};

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
});

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+").expect("valid integer pattern"));

/// Terminal symbols: identifiers, numbers and strings.
pub struct LexemeParser;

impl LexemeParser {
    /// A regular identifier that is not a reserved word, or a delimited
    /// identifier. Returns the lexeme as written.
    pub fn identifier(parser: &mut QueryParser) -> Result<String, ParseError> {
        parser.next_non_whitespace();
        if parser.current() == '"' {
            return Self::delimited_identifier(parser);
        }
        if !parser.current().is_ascii_alphabetic() {
            return parser.fail("identifier");
        }

        let pivot = parser.position;
        while parser.current().is_ascii_alphanumeric() || parser.current() == '_' {
            parser.next();
        }
        let word = parser.text_from_pivot(pivot);
        if is_reserved(&word) || WordComparer::is_word_char(parser.current()) {
            parser.position = pivot;
            return parser.fail("identifier");
        }
        Ok(word)
    }

    fn delimited_identifier(parser: &mut QueryParser) -> Result<String, ParseError> {
        let pivot = parser.position;
        parser.next();
        loop {
            if parser.eof() {
                parser.position = pivot;
                return parser.fail("closing '\"'");
            }
            if parser.current() == '"' {
                if parser.peek(1) == '"' {
                    parser.jump(2);
                    continue;
                }
                parser.next();
                break;
            }
            parser.next();
        }
        if parser.position - pivot == 2 {
            parser.position = pivot;
            return parser.fail("non-empty delimited identifier");
        }
        Ok(parser.text_from_pivot(pivot))
    }

    fn regex_token(parser: &mut QueryParser, regex: &Regex, what: &str) -> Result<String, ParseError> {
        parser.next_non_whitespace();
        let length = match regex.find(parser.rest()) {
            Some(m) => m.as_str().chars().count(),
            None => return parser.fail(what),
        };
        let pivot = parser.position;
        parser.jump(length);
        // 89x is neither a number nor an identifier
        if WordComparer::is_word_char(parser.current()) || parser.current() == '.' {
            parser.position = pivot;
            return parser.fail(what);
        }
        Ok(parser.text_from_pivot(pivot))
    }

    pub fn unsigned_number(parser: &mut QueryParser) -> Result<String, ParseError> {
        Self::regex_token(parser, &NUMBER, "number")
    }

    pub fn unsigned_integer(parser: &mut QueryParser) -> Result<String, ParseError> {
        Self::regex_token(parser, &INTEGER, "unsigned integer")
    }

    pub fn unsigned_integer_value(parser: &mut QueryParser) -> Result<u64, ParseError> {
        let pivot = parser.position;
        let lexeme = Self::unsigned_integer(parser)?;
        match lexeme.parse::<u64>() {
            Ok(value) => Ok(value),
            Err(_) => ParseError::new("Integer out of range", pivot, parser).err(),
        }
    }

    /// An optionally signed integer, returned as one lexeme (`-2`).
    pub fn signed_integer(parser: &mut QueryParser) -> Result<String, ParseError> {
        let sign = if parser.punct("-") {
            "-"
        } else {
            parser.punct("+");
            ""
        };
        let digits = Self::unsigned_integer(parser)?;
        Ok(format!("{}{}", sign, digits))
    }

    /// A string literal; literals separated only by whitespace or comments
    /// are joined into one. Returns the quoted text.
    pub fn string_literal(parser: &mut QueryParser) -> Result<String, ParseError> {
        parser.next_non_whitespace();
        if parser.current() != '\'' {
            return parser.fail("string literal");
        }

        let mut value = String::new();
        while parser.current() == '\'' {
            value.push_str(&unquote_string(&Self::single_string(parser)?));
            let pivot = parser.position;
            parser.next_non_whitespace();
            if parser.current() != '\'' {
                parser.position = pivot;
            }
        }
        Ok(quote_string(&value))
    }

    fn single_string(parser: &mut QueryParser) -> Result<String, ParseError> {
        let pivot = parser.position;
        parser.next();
        loop {
            if parser.eof() {
                parser.position = pivot;
                return parser.fail("closing quote");
            }
            if parser.current() == '\'' {
                if parser.peek(1) == '\'' {
                    parser.jump(2);
                    continue;
                }
                parser.next();
                return Ok(parser.text_from_pivot(pivot));
            }
            parser.next();
        }
    }

    /// One of the comparison operators, longest first.
    pub fn comparison_operator(parser: &mut QueryParser) -> Result<String, ParseError> {
        for op in ["<>", "!=", "<=", ">=", "=", "<", ">"] {
            if parser.punct(op) {
                return Ok(op.to_string());
            }
        }
        parser.fail("comparison operator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;

    fn lex<T>(text: &str, f: fn(&mut QueryParser) -> Result<T, ParseError>) -> Result<T, ParseError> {
        let config = CompilerConfig::default();
        let mut parser = QueryParser::new(text, &config);
        f(&mut parser)
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(lex("  raj2000 ", LexemeParser::identifier).expect("Failed to parse identifier"), "raj2000");
        assert_eq!(lex("\"a\"\"b\"", LexemeParser::identifier).expect("Failed to parse identifier"), "\"a\"\"b\"");
        assert_eq!(lex("\"SELECT\"", LexemeParser::identifier).expect("Failed to parse identifier"), "\"SELECT\"");
        assert!(lex("select", LexemeParser::identifier).is_err());
        assert!(lex("Point", LexemeParser::identifier).is_err());
        assert!(lex("_x", LexemeParser::identifier).is_err());
        assert!(lex("\"\"", LexemeParser::identifier).is_err());
    }

    #[test]
    fn test_numbers() {
        for (text, expected) in [("12", "12"), ("1.5", "1.5"), (".5", ".5"), ("2.", "2."),
            ("1e5", "1e5"), ("1.5E-3", "1.5E-3")] {
            assert_eq!(lex(text, LexemeParser::unsigned_number).expect("Failed to parse number"), expected);
        }
        assert!(lex("89x", LexemeParser::unsigned_number).is_err());
        assert!(lex("'1'", LexemeParser::unsigned_number).is_err());
        assert!(lex("1.5", LexemeParser::unsigned_integer).is_err());
        assert_eq!(lex("- 3", LexemeParser::signed_integer).expect("Failed to parse integer"), "-3");
    }

    #[test]
    fn test_string_concatenation() {
        let text = "'qua' -- a comment\n 'tsch'";
        assert_eq!(lex(text, LexemeParser::string_literal).expect("Failed to parse string"), "'quatsch'");
        assert_eq!(lex("'it''s'", LexemeParser::string_literal).expect("Failed to parse string"), "'it''s'");
        assert!(lex("'open", LexemeParser::string_literal).is_err());
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(lex("<> 1", LexemeParser::comparison_operator).expect("Failed to parse operator"), "<>");
        assert_eq!(lex("<1", LexemeParser::comparison_operator).expect("Failed to parse operator"), "<");
        assert!(lex("+", LexemeParser::comparison_operator).is_err());
    }
}
