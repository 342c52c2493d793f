pub mod field_info;
pub use field_info::*;

pub mod stc;
pub use stc::*;

pub mod sql_type;
pub use sql_type::{combine_types, subsuming_type};

pub mod memory_catalog;
pub use memory_catalog::*;

#[cfg(test)]
pub mod fixtures;

use crate::parser::{
    analyzer::AnalyzerError,
    ast::{Identifier, QualifiedName},
};

/// Source of column metadata for the tables a statement names.
///
/// Called once per table reference; unknown tables are
/// `AnalyzerError::TableNotFound`.
pub trait CatalogLookup {
    fn columns(&self, table: &QualifiedName) -> Result<Vec<(Identifier, FieldInfo)>, AnalyzerError>;
}

impl<F> CatalogLookup for F
where
    F: Fn(&QualifiedName) -> Result<Vec<(Identifier, FieldInfo)>, AnalyzerError>,
{
    fn columns(&self, table: &QualifiedName) -> Result<Vec<(Identifier, FieldInfo)>, AnalyzerError> {
        self(table)
    }
}
