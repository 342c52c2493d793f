use crate::parser::QueryParser;

/// Case-insensitive matcher for one keyword at the parser cursor.
#[derive(Debug, Default)]
pub struct WordComparer {
    pub length: usize,
    pub word: Vec<char>,
    eof: bool,
    word_boundary: bool,
}

impl WordComparer {
    pub fn new(word: &str) -> Self {
        let word: Vec<char> = word.to_uppercase().chars().collect();
        Self {
            length: word.len(),
            word,
            eof: false,
            word_boundary: false,
        }
    }

    /// A keyword: may end the statement and must not run into an identifier.
    pub fn keyword(word: &str) -> Self {
        Self::new(word).with_eof().with_word_boundary()
    }

    pub fn reach_eof(&self, parser: &QueryParser) -> bool {
        parser.position + self.length >= parser.length
    }

    pub fn is_word_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_'
    }

    pub fn is_break_line(ch: char) -> bool {
        ch == '\r' || ch == '\n'
    }

    pub fn compare(&self, parser: &QueryParser) -> bool {
        for (position, ch) in self.word.iter().enumerate() {
            if (parser.position + position) >= parser.length ||
                *ch != parser.text_v[parser.position + position].to_ascii_uppercase() {
                return false;
            }
        }

        if self.reach_eof(parser) {
            return self.eof;
        }

        !self.word_boundary || !Self::is_word_char(parser.text_v[parser.position + self.length])
    }

    pub fn with_eof(mut self) -> Self { self.eof = true; self }
    pub fn with_word_boundary(mut self) -> Self { self.word_boundary = true; self }
}
