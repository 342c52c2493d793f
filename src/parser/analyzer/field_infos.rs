use std::collections::HashSet;

use indexmap::IndexMap;

use crate::{
    catalog::FieldInfo,
    parser::{
        analyzer::AnalyzerError,
        ast::{Identifier, JoinKind, QualifiedName},
    },
};

/// One FROM-clause item, as seen by qualified column references.
#[derive(Debug, Clone)]
pub struct TableScope {
    /// Correlation name; when present it hides the table name.
    pub alias: Option<Identifier>,
    /// Catalog name of a plain table.
    pub name: Option<QualifiedName>,
    pub columns: Vec<(Identifier, FieldInfo)>,
}

impl TableScope {
    /// Whether `qualifier` designates this item.
    pub fn answers_to(&self, qualifier: &QualifiedName) -> bool {
        match (&self.alias, &self.name, qualifier.parts.as_slice()) {
            (Some(alias), _, [only]) => only.matches(alias),
            (Some(_), _, _) => false,
            (None, Some(name), _) => qualifier.designates(name),
            (None, None, _) => false,
        }
    }

    pub fn column(&self, name: &Identifier) -> Result<Option<&FieldInfo>, AnalyzerError> {
        let found: Vec<&FieldInfo> = self.columns.iter()
            .filter(|(column, _)| column.matches(name))
            .map(|(_, info)| info)
            .collect();
        match found.as_slice() {
            [] => Ok(None),
            [first, rest @ ..] if rest.iter().all(|info| info.same_column(first)) => Ok(Some(first)),
            _ => Err(AnalyzerError::AmbiguousColumn { name: name.text.clone() }),
        }
    }
}

/// The columns a relation exposes.
///
/// `seq` keeps them in select order, `columns` maps lookup keys to
/// their metadata, with `None` marking a name that occurs more than
/// once with different meaning. Table-like infos also remember the
/// FROM items they were built from, for qualified lookups.
#[derive(Debug, Clone, Default)]
pub struct FieldInfos {
    seq: Vec<(Identifier, FieldInfo)>,
    columns: IndexMap<String, Option<FieldInfo>>,
    tables: Vec<TableScope>,
}

impl FieldInfos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns of a physical table.
    pub fn for_table(name: QualifiedName, alias: Option<Identifier>, columns: Vec<(Identifier, FieldInfo)>) -> Self {
        let mut infos = Self::new();
        for (column, info) in &columns {
            infos.add_column(column.clone(), info.clone());
        }
        infos.tables.push(TableScope { alias, name: Some(name), columns });
        infos
    }

    /// Columns of a subquery in FROM, exposed under its correlation name.
    pub fn for_derived(alias: Identifier, query: &FieldInfos) -> Self {
        let mut infos = Self::new();
        for (column, info) in &query.seq {
            infos.add_column(column.clone(), info.clone());
        }
        infos.tables.push(TableScope { alias: Some(alias), name: None, columns: query.seq.clone() });
        infos
    }

    /// The output columns of a query.
    pub fn for_query(columns: Vec<(Identifier, FieldInfo)>) -> Self {
        let mut infos = Self::new();
        for (column, info) in columns {
            infos.add_column(column, info);
        }
        infos
    }

    /// Merges the two sides of a join. Common columns (shared names for
    /// NATURAL, the listed ones for USING) appear once, with the left
    /// side's metadata; any other name present on both sides becomes
    /// ambiguous.
    pub fn for_join(kind: &JoinKind, left: &FieldInfos, right: &FieldInfos) -> Self {
        if *kind == JoinKind::Nested {
            return left.clone();
        }

        let common: HashSet<String> = match kind {
            JoinKind::Natural => left.columns.keys()
                .filter(|key| right.columns.contains_key(*key))
                .cloned()
                .collect(),
            JoinKind::Using(names) => names.iter().map(Identifier::key).collect(),
            _ => HashSet::new(),
        };

        let mut infos = Self {
            seq: left.seq.clone(),
            columns: left.columns.clone(),
            tables: left.tables.clone(),
        };
        for (column, info) in &right.seq {
            let key = column.key();
            if common.contains(&key) && left.columns.contains_key(&key) {
                continue;
            }
            infos.seq.push((column.clone(), info.clone()));
            if left.columns.contains_key(&key) {
                infos.columns.insert(key, None);
            } else {
                let own = right.columns.get(&key).cloned().flatten();
                infos.columns.insert(key, own);
            }
        }
        infos.tables.extend(right.tables.iter().cloned());
        infos
    }

    /// Adds a visible column; a name repeated with different metadata or
    /// provenance becomes ambiguous.
    pub fn add_column(&mut self, name: Identifier, info: FieldInfo) {
        let key = name.key();
        match self.columns.get(&key) {
            Some(Some(existing)) if !existing.same_column(&info) => {
                self.columns.insert(key, None);
            }
            Some(_) => {}
            None => {
                self.columns.insert(key, Some(info.clone()));
            }
        }
        self.seq.push((name, info));
    }

    pub fn seq(&self) -> &[(Identifier, FieldInfo)] {
        &self.seq
    }

    pub fn tables(&self) -> &[TableScope] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// `Ok(None)` if no column of that name is visible.
    pub fn get(&self, name: &Identifier) -> Result<Option<&FieldInfo>, AnalyzerError> {
        match self.columns.get(&name.key()) {
            Some(Some(info)) => Ok(Some(info)),
            Some(None) => Err(AnalyzerError::AmbiguousColumn { name: name.text.clone() }),
            None => Ok(None),
        }
    }

    pub fn locate_table(&self, qualifier: &QualifiedName) -> Option<&TableScope> {
        self.tables.iter().find(|table| table.answers_to(qualifier))
    }

    /// Resolves a possibly qualified column. `Ok(None)` means the name
    /// (or its qualifier) is not visible here and an enclosing scope may
    /// still know it.
    pub fn resolve(&self, qualifier: Option<&QualifiedName>, name: &Identifier) -> Result<Option<FieldInfo>, AnalyzerError> {
        let Some(qualifier) = qualifier else {
            return Ok(self.get(name)?.cloned());
        };
        match self.locate_table(qualifier) {
            Some(table) => match table.column(name)? {
                Some(info) => Ok(Some(info.clone())),
                None => Err(AnalyzerError::ColumnNotFound { name: format!("{}.{}", qualifier, name) }),
            },
            None => Ok(None),
        }
    }
}
