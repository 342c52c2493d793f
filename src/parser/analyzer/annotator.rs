use std::rc::Rc;

use tracing::debug;

use crate::{
    catalog::CatalogLookup,
    parser::{
        analyzer::{AnalysisContext, AnalyzerError, QueryResolver},
        ast::Node,
    },
    ufuncs::UfuncRegistry,
};

/// An annotated tree and the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct Annotated {
    pub tree: Rc<Node>,
    pub warnings: Vec<String>,
}

/// Attaches `FieldInfo` to every value node and `FieldInfos` to every
/// table-like node of a parsed query specification.
///
/// The input tree is left alone; the result shares no annotated node
/// with it.
pub fn annotate(tree: &Rc<Node>, catalog: &dyn CatalogLookup, ufuncs: &UfuncRegistry) -> Result<Annotated, AnalyzerError> {
    let mut ctx = AnalysisContext::new(catalog, ufuncs);
    let tree = QueryResolver::annotate_query(tree, &mut ctx)?;
    debug!(
        columns = tree.field_infos().map(|infos| infos.len()).unwrap_or_default(),
        warnings = ctx.warnings.len(),
        "statement annotated");
    Ok(Annotated { tree, warnings: ctx.warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{fixtures::sample_catalog, FieldInfo},
        parser::{ast::NodeKind, parse},
    };

    fn run(query: &str) -> Result<Annotated, AnalyzerError> {
        let tree = parse(query).expect("Failed to parse query");
        annotate(&tree, &sample_catalog(), &UfuncRegistry::default_registry())
    }

    fn columns(query: &str) -> Vec<(String, FieldInfo)> {
        let result = run(query).expect("Failed to annotate query");
        result.tree.field_infos()
            .map(|infos| infos.seq().iter().map(|(n, fi)| (n.text.clone(), fi.clone())).collect())
            .unwrap_or_default()
    }

    fn names(query: &str) -> Vec<String> {
        columns(query).into_iter().map(|(n, _)| n).collect()
    }

    #[test]
    fn test_star_expansion() {
        assert_eq!(names("SELECT * FROM misc"), vec!["mass", "mag", "speed"]);
        assert_eq!(names("SELECT * FROM a NATURAL JOIN b"), vec!["id", "x", "y"]);
        assert_eq!(names("SELECT * FROM a JOIN b USING (id)"), vec!["id", "x", "y"]);
        assert_eq!(names("SELECT b.*, mass FROM b, misc"), vec!["id", "y", "mass"]);
        assert_eq!(names("SELECT q.* FROM misc AS q"), vec!["mass", "mag", "speed"]);
    }

    #[test]
    fn test_bare_join_merges_common_columns() {
        let cols = columns("SELECT id, x, y FROM a JOIN b");
        assert_eq!(cols[0].1.ucd, "meta.id");
        assert_eq!(cols[0].1.user_data[0].table, "a");
    }

    #[test]
    fn test_ambiguous_columns() {
        match run("SELECT z FROM c JOIN d ON (u=v)") {
            Err(AnalyzerError::AmbiguousColumn { name }) => assert_eq!(name, "z"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(run("SELECT c.z, d.z FROM c JOIN d ON (c.z=d.z)").is_ok());
        assert!(matches!(run("SELECT id FROM a, b"), Err(AnalyzerError::AmbiguousColumn { .. })));
        assert!(matches!(run("SELECT x FROM a AS l, a AS r"), Err(AnalyzerError::AmbiguousColumn { .. })));
    }

    #[test]
    fn test_unknown_names() {
        match run("SELECT foo.mass FROM misc") {
            Err(AnalyzerError::TableNotFound(name)) => assert_eq!(name, "foo"),
            other => panic!("unexpected {:?}", other),
        }
        match run("SELECT weight FROM misc") {
            Err(AnalyzerError::ColumnNotFound { name }) => assert_eq!(name, "weight"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(run("SELECT x FROM nowhere"), Err(AnalyzerError::TableNotFound(_))));
        assert!(matches!(run("SELECT q.* FROM misc"), Err(AnalyzerError::TableNotFound(_))));
        assert!(matches!(run("SELECT misc.mass FROM misc AS m"), Err(AnalyzerError::TableNotFound(_))));
    }

    #[test]
    fn test_schema_qualified_tables() {
        let cols = columns("SELECT data.alphaFloat, ppmx.data.deltaFloat, pmra FROM ppmx.data");
        assert_eq!(cols[0].1.unit, "deg");
        assert_eq!(cols[1].1.ucd, "pos.eq.dec;meta.main");
        assert_eq!(cols[2].1.unit, "deg/yr");
    }

    #[test]
    fn test_delimited_identifiers() {
        let cols = columns(r#"SELECT "left-right", "inch""ing", "plAin", alllower, AllLower FROM quoted"#);
        assert_eq!(cols[0].1.unit, "bg");
        assert_eq!(cols[1].1.unit, "fin");
        assert_eq!(cols[2].1.unit, "pc");
        assert_eq!(cols[3].1.unit, "km");
        assert_eq!(cols[4].1.unit, "km");
        assert!(matches!(run("SELECT plain FROM quoted"), Err(AnalyzerError::ColumnNotFound { .. })));
    }

    #[test]
    fn test_aliases() {
        let cols = columns("SELECT mass AS m, m.mag FROM misc AS m");
        assert_eq!(cols[0].0, "m");
        assert_eq!(cols[0].1.unit, "kg");
        assert_eq!(cols[1].0, "mag");
    }

    #[test]
    fn test_derived_tables() {
        let cols = columns("SELECT q.w, h FROM (SELECT width AS w, height AS h FROM spatial) AS q");
        assert_eq!(cols[0].1.unit, "m");
        assert_eq!(cols[1].1.unit, "km");

        let cols = columns("SELECT * FROM (SELECT ra1, dec FROM spatial2) AS s JOIN spatial ON (s.ra1=spatial.ra1)");
        assert_eq!(cols.len(), 7);
    }

    #[test]
    fn test_derived_table_does_not_see_siblings() {
        assert!(run("SELECT * FROM misc, (SELECT mass FROM spatial) AS q").is_err());
    }

    #[test]
    fn test_correlated_subqueries() {
        let result = run("SELECT mass FROM misc WHERE EXISTS (SELECT x FROM a WHERE x=mass)").expect("Failed to annotate query");
        let inner = result.tree.find_first(NodeKind::Subquery).expect("no subquery");
        assert_eq!(inner.field_infos().map(|infos| infos.len()), Some(1));

        assert!(run("SELECT mass FROM misc WHERE mass IN (SELECT y FROM b WHERE id>misc.speed)").is_ok());
        assert!(run("SELECT x FROM a WHERE EXISTS (SELECT y FROM b WHERE y=nothing)").is_err());
    }

    #[test]
    fn test_order_and_group_by_see_aliases() {
        assert!(run("SELECT mass*2 AS twice FROM misc ORDER BY twice").is_ok());
        assert!(run("SELECT mag AS m, COUNT(*) FROM misc GROUP BY m").is_ok());
        assert!(run("SELECT mag FROM misc ORDER BY speed").is_ok());
        assert!(run("SELECT mag FROM misc WHERE twice > 1").is_err());
    }

    #[test]
    fn test_every_value_node_annotated() {
        let result = run("SELECT ABS(mass)+1 FROM misc WHERE mag BETWEEN 1 AND 2").expect("Failed to annotate query");
        for kind in [NodeKind::ColumnReference, NodeKind::UnsignedLiteral, NodeKind::NumericValueFunction] {
            for node in result.tree.find_all(kind) {
                assert!(node.field_info().is_some(), "{} without field info", node.flatten());
            }
        }
        let from = result.tree.find_first(NodeKind::FromClause).expect("no FROM");
        assert_eq!(from.field_infos().map(|infos| infos.len()), Some(3));
    }

    #[test]
    fn test_input_tree_untouched() {
        let tree = parse("SELECT mass FROM misc").expect("Failed to parse query");
        annotate(&tree, &sample_catalog(), &UfuncRegistry::new()).expect("Failed to annotate query");
        assert!(tree.field_infos().is_none());
        assert!(tree.find_first(NodeKind::ColumnReference).and_then(|n| n.field_info()).is_none());
    }
}
