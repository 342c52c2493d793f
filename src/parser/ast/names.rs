use std::fmt;

use serde::{Deserialize, Serialize};

/// An SQL identifier as written in the statement.
///
/// Regular identifiers compare case-insensitively; delimited ones
/// (`"..."`) compare exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub text: String,
    pub quoted: bool,
}

impl Identifier {
    pub fn regular(text: &str) -> Self {
        Self { text: text.to_string(), quoted: false }
    }

    pub fn delimited(text: &str) -> Self {
        Self { text: text.to_string(), quoted: true }
    }

    /// Builds an identifier back from its lexeme, undoing `""` escapes.
    pub fn from_lexeme(lexeme: &str) -> Self {
        if lexeme.len() >= 2 && lexeme.starts_with('"') && lexeme.ends_with('"') {
            let inner = &lexeme[1..lexeme.len() - 1];
            return Self::delimited(&inner.replace("\"\"", "\""));
        }
        Self::regular(lexeme)
    }

    /// Lookup key: lowercased for regular identifiers, verbatim for delimited ones.
    pub fn key(&self) -> String {
        if self.quoted {
            self.text.clone()
        } else {
            self.text.to_lowercase()
        }
    }

    pub fn matches(&self, other: &Identifier) -> bool {
        self.key() == other.key()
    }

    pub fn to_sql(&self) -> String {
        if self.quoted {
            format!("\"{}\"", self.text.replace('"', "\"\""))
        } else {
            self.text.clone()
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

/// A dotted name like `schema.table` or `cat.schema.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    pub parts: Vec<Identifier>,
}

impl QualifiedName {
    pub fn new(parts: Vec<Identifier>) -> Self {
        Self { parts }
    }

    /// Parses a plain dotted name without delimited parts, mostly for tests
    /// and catalog keys.
    pub fn parse_dotted(text: &str) -> Self {
        Self { parts: text.split('.').map(Identifier::regular).collect() }
    }

    pub fn name(&self) -> Option<&Identifier> {
        self.parts.last()
    }

    pub fn key(&self) -> String {
        self.parts.iter().map(Identifier::key).collect::<Vec<_>>().join(".")
    }

    pub fn to_sql(&self) -> String {
        self.parts.iter().map(Identifier::to_sql).collect::<Vec<_>>().join(".")
    }

    /// True if `self`, used as a qualifier, designates `table`: the parts of
    /// `self` must match the trailing parts of `table`.
    pub fn designates(&self, table: &QualifiedName) -> bool {
        if self.parts.is_empty() || self.parts.len() > table.parts.len() {
            return false;
        }
        let offset = table.parts.len() - self.parts.len();
        self.parts.iter()
            .zip(table.parts[offset..].iter())
            .all(|(a, b)| a.matches(b))
    }

    /// Drops a leading schema part if it matches `schema`.
    pub fn without_schema(&self, schema: &str) -> Option<QualifiedName> {
        match self.parts.first() {
            Some(first) if self.parts.len() > 1 && !first.quoted && first.text.eq_ignore_ascii_case(schema) => {
                Some(QualifiedName::new(self.parts[1..].to_vec()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}
