use indexmap::IndexMap;
use tracing::trace;

use crate::{
    catalog::{CatalogLookup, FieldInfo},
    parser::{
        analyzer::AnalyzerError,
        ast::{Identifier, QualifiedName},
    },
};

/// A catalog held in memory, keyed by the lookup key of the qualified
/// table name.
///
/// A name also matches a table registered under a longer name it
/// designates, so `obscore` finds `ivoa.obscore` as long as that is
/// the only candidate.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    tables: IndexMap<String, (QualifiedName, Vec<(Identifier, FieldInfo)>)>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self { tables: IndexMap::new() }
    }

    /// Registers a table; each column is stamped with its provenance.
    pub fn with_table(mut self, name: &str, columns: Vec<(Identifier, FieldInfo)>) -> Self {
        self.add_table(QualifiedName::parse_dotted(name), columns);
        self
    }

    pub fn add_table(&mut self, name: QualifiedName, columns: Vec<(Identifier, FieldInfo)>) {
        let table = name.key();
        let columns = columns.into_iter()
            .map(|(column, info)| {
                let info = if info.user_data.is_empty() {
                    info.with_source(&table, &column.key())
                } else {
                    info
                };
                (column, info)
            })
            .collect();
        self.tables.insert(table, (name, columns));
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

impl CatalogLookup for InMemoryCatalog {
    fn columns(&self, table: &QualifiedName) -> Result<Vec<(Identifier, FieldInfo)>, AnalyzerError> {
        if let Some((_, columns)) = self.tables.get(&table.key()) {
            return Ok(columns.clone());
        }

        let mut candidates = self.tables.values().filter(|(name, _)| table.designates(name));
        match (candidates.next(), candidates.next()) {
            (Some((name, columns)), None) => {
                trace!(requested = %table, found = %name, "table matched by suffix");
                Ok(columns.clone())
            }
            _ => Err(AnalyzerError::TableNotFound(table.to_sql())),
        }
    }
}
