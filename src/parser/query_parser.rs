use std::{collections::HashMap, rc::Rc};

use crate::{
    config::CompilerConfig,
    parser::{ast::Node, ParseError, QueryComparers, WordComparer, COMPARERS},
};

type Memo = Result<(Rc<Node>, usize), ParseError>;

/// Furthest point a parse attempt got to, with what was expected there.
#[derive(Debug, Default, Clone)]
pub struct Failure {
    pub position: usize,
    pub expected: String,
}

/// Char cursor over one statement.
///
/// Productions move `position` forward and reset it on backtracking. The
/// keyword tables are shared, read-only statics; everything else lives and
/// dies with this parser.
#[derive(Debug)]
pub struct QueryParser<'c> {
    pub position: usize,
    pub length: usize,
    pub text_v: Vec<char>,
    pub text: String,
    pub comparers: &'static QueryComparers,
    pub config: &'c CompilerConfig,
    offsets: Vec<usize>,
    depth: usize,
    furthest: Failure,
    fatal: Option<ParseError>,
    /// Value expressions parsed so far, by start position.
    memo: HashMap<usize, Memo>,
}

impl<'c> QueryParser<'c> {
    pub fn new(query: &str, config: &'c CompilerConfig) -> Self {
        let text_v: Vec<char> = query.chars().collect();
        let mut offsets: Vec<usize> = query.char_indices().map(|(i, _)| i).collect();
        offsets.push(query.len());
        Self {
            position: 0,
            length: text_v.len(),
            text_v,
            text: query.to_string(),
            comparers: &COMPARERS,
            config,
            offsets,
            depth: 0,
            furthest: Failure::default(),
            fatal: None,
            memo: HashMap::new(),
        }
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    pub fn current(&self) -> char {
        self.peek(0)
    }

    pub fn peek(&self, ahead: usize) -> char {
        self.text_v.get(self.position + ahead).copied().unwrap_or('\0')
    }

    pub fn next(&mut self) {
        if self.position < self.length {
            self.position += 1;
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    /// Skips whitespace and `--` comments.
    pub fn next_non_whitespace(&mut self) {
        loop {
            if self.current().is_whitespace() {
                self.next();
            } else if self.current() == '-' && self.peek(1) == '-' {
                while !self.eof() && !WordComparer::is_break_line(self.current()) {
                    self.next();
                }
            } else {
                break;
            }
        }
    }

    pub fn text_from_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.length);
        let start = start.min(end);
        self.text_v[start..end].iter().collect()
    }

    pub fn text_from_pivot(&self, pivot: usize) -> String {
        self.text_from_range(pivot, self.position)
    }

    /// Byte offset of the char at `position`.
    pub fn byte_offset(&self, position: usize) -> usize {
        self.offsets.get(position).copied().unwrap_or(self.text.len())
    }

    /// The unparsed rest of the statement.
    pub fn rest(&self) -> &str {
        &self.text[self.byte_offset(self.position)..]
    }

    /// Matches a fixed symbol (after whitespace) and consumes it.
    pub fn punct(&mut self, symbol: &str) -> bool {
        self.next_non_whitespace();
        let matches = symbol.chars().enumerate().all(|(i, ch)| self.peek(i) == ch);
        if matches {
            self.jump(symbol.chars().count());
        }
        matches
    }

    pub fn expect_punct(&mut self, symbol: &str) -> Result<(), ParseError> {
        if self.punct(symbol) {
            return Ok(());
        }
        self.fail(&format!("'{}'", symbol))
    }

    /// Matches a keyword (after whitespace) and consumes it, returning its
    /// uppercase spelling.
    pub fn keyword(&mut self, comparer: &WordComparer) -> Option<String> {
        self.next_non_whitespace();
        if !comparer.compare(self) {
            return None;
        }
        self.jump(comparer.length);
        Some(comparer.word.iter().collect())
    }

    pub fn expect_keyword(&mut self, comparer: &WordComparer) -> Result<String, ParseError> {
        match self.keyword(comparer) {
            Some(lexeme) => Ok(lexeme),
            None => self.fail(&comparer.word.iter().collect::<String>()),
        }
    }

    /// Uppercased word at the cursor, not consumed.
    pub fn peek_word(&mut self) -> Option<String> {
        self.next_non_whitespace();
        if !self.current().is_ascii_alphabetic() {
            return None;
        }
        let mut end = self.position;
        while end < self.length && WordComparer::is_word_char(self.text_v[end]) {
            end += 1;
        }
        Some(self.text_from_range(self.position, end).to_uppercase())
    }

    /// Consumes the word at the cursor, reserved or not, returning it as written.
    pub fn take_word(&mut self) -> Option<String> {
        self.next_non_whitespace();
        if !self.current().is_ascii_alphabetic() {
            return None;
        }
        let pivot = self.position;
        while !self.eof() && WordComparer::is_word_char(self.current()) {
            self.next();
        }
        Some(self.text_from_pivot(pivot))
    }

    /// Runs one alternative of a production. On failure the cursor is
    /// restored and `None` returned, unless the failure is fatal (like
    /// runaway nesting), which is passed on.
    pub fn attempt<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Option<T>, ParseError> {
        let pivot = self.position;
        let depth = self.depth;
        match production(self) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                if let Some(fatal) = &self.fatal {
                    return Err(fatal.clone());
                }
                tracing::trace!(position = pivot, error = %err.message, "backtracking");
                self.position = pivot;
                self.depth = depth;
                Ok(None)
            }
        }
    }

    /// Whether the next non-blank char after the current word is `(`.
    pub fn word_opens_call(&self) -> bool {
        let mut pos = self.position;
        while pos < self.length && WordComparer::is_word_char(self.text_v[pos]) {
            pos += 1;
        }
        while pos < self.length && self.text_v[pos].is_whitespace() {
            pos += 1;
        }
        self.text_v.get(pos) == Some(&'(')
    }

    /// Records a failed expectation and returns the error for it.
    pub fn fail<T>(&mut self, expected: &str) -> Result<T, ParseError> {
        if self.position > self.furthest.position || self.furthest.expected.is_empty() {
            self.furthest = Failure { position: self.position, expected: expected.to_string() };
        } else if self.position == self.furthest.position
            && !self.furthest.expected.split(" or ").any(|e| e == expected) {
            self.furthest.expected = format!("{} or {}", self.furthest.expected, expected);
        }
        ParseError::expected(expected, self.position, self).err()
    }

    /// The error describing the furthest failure seen so far.
    pub fn furthest_error(&self) -> ParseError {
        if let Some(fatal) = &self.fatal {
            return fatal.clone();
        }
        if self.furthest.expected.is_empty() {
            return ParseError::expected("end of statement", self.position, self);
        }
        ParseError::expected(&self.furthest.expected, self.furthest.position, self)
    }

    pub fn recall(&self, position: usize) -> Option<Memo> {
        self.memo.get(&position).cloned()
    }

    pub fn remember(&mut self, position: usize, result: Memo) {
        self.memo.insert(position, result);
    }

    /// Guards nested productions against runaway recursion.
    pub fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            let err = ParseError::new("Statement nested too deeply", self.position, self);
            self.fatal = Some(err.clone());
            return err.err();
        }
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_and_comments() {
        let config = CompilerConfig::default();
        let mut parser = QueryParser::new("  -- a comment\n   x", &config);
        parser.next_non_whitespace();
        assert_eq!(parser.current(), 'x');
    }

    #[test]
    fn test_keyword_consumes_whole_words_only() {
        let config = CompilerConfig::default();
        let mut parser = QueryParser::new("selected", &config);
        assert!(parser.keyword(&COMPARERS.select).is_none());

        let mut parser = QueryParser::new("  SeLeCt x", &config);
        assert_eq!(parser.keyword(&COMPARERS.select).as_deref(), Some("SELECT"));
        assert_eq!(parser.rest(), " x");
    }

    #[test]
    fn test_byte_offsets_with_multibyte_text() {
        let config = CompilerConfig::default();
        let parser = QueryParser::new("'ä' x", &config);
        assert_eq!(parser.byte_offset(3), 4);
        assert_eq!(parser.byte_offset(99), "'ä' x".len());
    }

    #[test]
    fn test_furthest_failure_wins() {
        let config = CompilerConfig::default();
        let mut parser = QueryParser::new("abc def", &config);
        let _ = parser.fail::<()>("first");
        parser.jump(4);
        let _ = parser.fail::<()>("second");
        parser.position = 0;
        let _ = parser.fail::<()>("third");
        let err = parser.furthest_error();
        assert_eq!(err.start, 4);
        assert!(err.message.contains("second"));
    }

    #[test]
    fn test_attempt_restores_position() {
        let config = CompilerConfig::default();
        let mut parser = QueryParser::new("abc def", &config);
        let res = parser.attempt(|p| {
            p.jump(4);
            p.fail::<()>("nothing")
        }).expect("not fatal");
        assert!(res.is_none());
        assert_eq!(parser.position, 0);

        let word = parser.attempt(|p| p.take_word().ok_or_else(|| p.furthest_error()))
            .expect("not fatal");
        assert_eq!(word.as_deref(), Some("abc"));
        assert_eq!(parser.position, 3);
    }

    #[test]
    fn test_depth_guard_is_fatal() {
        let config = CompilerConfig::default().with_max_depth(1);
        let mut parser = QueryParser::new("x", &config);
        let res = parser.attempt(|p| {
            p.enter()?;
            p.enter()
        });
        assert!(res.is_err());
        assert_eq!(parser.furthest_error().message, "Statement nested too deeply");
    }

    #[test]
    fn test_depth_guard() {
        let config = CompilerConfig::default().with_max_depth(2);
        let mut parser = QueryParser::new("x", &config);
        assert!(parser.enter().is_ok());
        assert!(parser.enter().is_ok());
        assert!(parser.enter().is_err());
    }
}
