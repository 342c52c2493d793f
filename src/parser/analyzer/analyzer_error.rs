use thiserror::Error;

use crate::{parser::ast::NodeError, ufuncs::UfuncError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzerError {
    #[error("No table {0} found.")]
    TableNotFound(String),
    #[error("No column {name} found.")]
    ColumnNotFound { name: String },
    #[error("Column {name} is ambiguous; qualify it with its table.")]
    AmbiguousColumn { name: String },
    #[error("catalog lookup failed: {0}")]
    Catalog(String),
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error(transparent)]
    Ufunc(#[from] UfuncError),
}
