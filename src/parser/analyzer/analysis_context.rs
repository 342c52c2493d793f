use std::rc::Rc;

use tracing::{trace, warn};

use crate::{
    catalog::{CatalogLookup, FieldInfo},
    parser::{
        analyzer::{AnalyzerError, FieldInfos, TableScope},
        ast::{Identifier, QualifiedName},
    },
    ufuncs::UfuncRegistry,
};

/// Names visible while one query specification is being annotated.
#[derive(Debug, Clone)]
pub struct QueryScope {
    /// Columns of the FROM clause.
    pub from: Rc<FieldInfos>,
    /// The select list while ORDER BY or GROUP BY is annotated; they see its aliases.
    pub outputs: Option<Rc<FieldInfos>>,
}

pub struct AnalysisContext<'a> {
    /// access to table metadata
    pub catalog: &'a dyn CatalogLookup,
    pub ufuncs: &'a UfuncRegistry,
    /// innermost query last
    scopes: Vec<QueryScope>,
    pub warnings: Vec<String>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(catalog: &'a dyn CatalogLookup, ufuncs: &'a UfuncRegistry) -> Self {
        Self { catalog, ufuncs, scopes: vec![], warnings: vec![] }
    }

    pub fn push_scope(&mut self, from: Rc<FieldInfos>) {
        self.scopes.push(QueryScope { from, outputs: None });
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn expose_outputs(&mut self, outputs: Rc<FieldInfos>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.outputs = Some(outputs);
        }
    }

    pub fn hide_outputs(&mut self) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.outputs = None;
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// FROM item of the innermost query designated by `qualifier`.
    pub fn locate_table(&self, qualifier: &QualifiedName) -> Option<&TableScope> {
        self.scopes.last().and_then(|scope| scope.from.locate_table(qualifier))
    }

    /// Metadata of a column reference, searching the innermost query
    /// first and enclosing queries after it.
    pub fn resolve_column(&self, qualifier: Option<&QualifiedName>, name: &Identifier) -> Result<FieldInfo, AnalyzerError> {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if let (None, Some(outputs)) = (qualifier, &scope.outputs) {
                if let Some(info) = outputs.resolve(None, name)? {
                    return Ok(info);
                }
            }
            if let Some(info) = scope.from.resolve(qualifier, name)? {
                if depth > 0 {
                    trace!(column = %name, depth, "correlated column reference");
                }
                return Ok(info);
            }
        }

        match qualifier {
            Some(qualifier) => Err(AnalyzerError::TableNotFound(qualifier.to_sql())),
            None => Err(AnalyzerError::ColumnNotFound { name: name.text.clone() }),
        }
    }

    pub fn warn(&mut self, message: String) {
        warn!(%message, "annotation warning");
        self.warnings.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::sample_catalog;

    fn scope_of(table: &str, alias: Option<&str>) -> Rc<FieldInfos> {
        let name = QualifiedName::parse_dotted(table);
        let columns = sample_catalog().columns(&name).expect("Failed to look up table");
        Rc::new(FieldInfos::for_table(name, alias.map(Identifier::regular), columns))
    }

    #[test]
    fn test_inner_scope_wins() {
        let catalog = sample_catalog();
        let ufuncs = UfuncRegistry::new();
        let mut ctx = AnalysisContext::new(&catalog, &ufuncs);
        ctx.push_scope(scope_of("spatial", None));
        ctx.push_scope(scope_of("spatial2", None));

        let ra = ctx.resolve_column(None, &Identifier::regular("ra1")).expect("Failed to resolve ra1");
        assert_eq!(ra.ucd, "pos.eq.ra;meta.main");
        let width = ctx.resolve_column(None, &Identifier::regular("width")).expect("Failed to resolve width");
        assert_eq!(width.unit, "m");

        ctx.pop_scope();
        assert_eq!(ctx.depth(), 1);
        assert!(ctx.resolve_column(None, &Identifier::regular("dec")).is_err());
    }

    #[test]
    fn test_outputs_before_from() {
        let catalog = sample_catalog();
        let ufuncs = UfuncRegistry::new();
        let mut ctx = AnalysisContext::new(&catalog, &ufuncs);
        ctx.push_scope(scope_of("misc", None));
        ctx.expose_outputs(Rc::new(FieldInfos::for_query(vec![
            (Identifier::regular("mass"), FieldInfo::new("g", "")),
        ])));
        let mass = ctx.resolve_column(None, &Identifier::regular("mass")).expect("Failed to resolve mass");
        assert_eq!(mass.unit, "g");
        let qualified = ctx.resolve_column(Some(&QualifiedName::parse_dotted("misc")), &Identifier::regular("mass"))
            .expect("Failed to resolve misc.mass");
        assert_eq!(qualified.unit, "kg");
    }

    #[test]
    fn test_unknown_names() {
        let catalog = sample_catalog();
        let ufuncs = UfuncRegistry::new();
        let mut ctx = AnalysisContext::new(&catalog, &ufuncs);
        ctx.push_scope(scope_of("misc", Some("m")));

        match ctx.resolve_column(Some(&QualifiedName::parse_dotted("misc")), &Identifier::regular("mass")) {
            Err(AnalyzerError::TableNotFound(name)) => assert_eq!(name, "misc"),
            other => panic!("unexpected {:?}", other),
        }
        match ctx.resolve_column(None, &Identifier::regular("weight")) {
            Err(AnalyzerError::ColumnNotFound { name }) => assert_eq!(name, "weight"),
            other => panic!("unexpected {:?}", other),
        }
        match ctx.resolve_column(Some(&QualifiedName::parse_dotted("m")), &Identifier::regular("weight")) {
            Err(AnalyzerError::ColumnNotFound { name }) => assert_eq!(name, "m.weight"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
