use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::AdqlError;

/// Compiler configuration.
///
/// - `ufunc_prefixes` are the name prefixes marking user defined functions.
/// - `upload_schema` is the schema of uploaded tables, dropped from the SQL.
/// - `default_limit` caps queries that do not say `TOP` themselves.
/// - `max_depth` bounds the nesting of the statement.
/// - `escape_percent` doubles `%` for drivers doing placeholder substitution.
/// - `spatial_index` enables rewriting simple spatial predicates into index calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub ufunc_prefixes: Vec<String>,
    pub upload_schema: String,
    pub default_limit: Option<u64>,
    pub max_depth: usize,
    pub escape_percent: bool,
    pub spatial_index: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            ufunc_prefixes: vec!["gavo_".to_string(), "ivo_".to_string()],
            upload_schema: "TAP_UPLOAD".to_string(),
            default_limit: None,
            max_depth: 200,
            escape_percent: true,
            spatial_index: true,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a configuration from JSON; missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, AdqlError> {
        serde_json::from_str(text).map_err(|e| AdqlError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AdqlError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn with_ufunc_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.ufunc_prefixes = prefixes;
        self
    }

    pub fn with_upload_schema(mut self, schema: &str) -> Self {
        self.upload_schema = schema.to_string();
        self
    }

    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = Some(limit);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_escape_percent(mut self, escape: bool) -> Self {
        self.escape_percent = escape;
        self
    }

    pub fn with_spatial_index(mut self, enabled: bool) -> Self {
        self.spatial_index = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CompilerConfig::from_json(r#"{"default_limit": 2000, "spatial_index": false}"#)
            .expect("Failed to read config");
        assert_eq!(config.default_limit, Some(2000));
        assert!(!config.spatial_index);
        assert_eq!(config.upload_schema, "TAP_UPLOAD");
        assert_eq!(config.ufunc_prefixes, vec!["gavo_".to_string(), "ivo_".to_string()]);
    }

    #[test]
    fn test_bad_json() {
        match CompilerConfig::from_json("{\"max_depth\": \"deep\"}") {
            Err(AdqlError::Config(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        write!(file, r#"{{"upload_schema": "UPLOADS", "escape_percent": false}}"#).expect("Failed to write config");
        let config = CompilerConfig::from_file(file.path()).expect("Failed to read config");
        assert_eq!(config.upload_schema, "UPLOADS");
        assert!(!config.escape_percent);

        assert!(matches!(CompilerConfig::from_file("/no/such/config.json"), Err(AdqlError::Io(_))));
    }

    #[test]
    fn test_builders() {
        let config = CompilerConfig::new()
            .with_default_limit(10)
            .with_upload_schema("up")
            .with_max_depth(3);
        assert_eq!(config.default_limit, Some(10));
        assert_eq!(config.upload_schema, "up");
        assert_eq!(config.max_depth, 3);
    }
}
