use std::rc::Rc;

use tracing::{debug, warn};

use crate::{
    catalog::{CatalogLookup, FieldInfo},
    config::CompilerConfig,
    morph::{insert_q3c_calls, morph_pgsphere, morph_syntax},
    parser::{
        analyzer::annotate,
        ast::{Child, Node},
        parse_with,
    },
    region::{RegionRegistry, RegionResolver},
    ufuncs::UfuncRegistry,
    AdqlError,
};

/// The result of compiling one ADQL statement.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    /// PostgreSQL text, ready for the driver.
    pub sql: String,
    /// Output columns in select-list order, with unique names.
    pub columns: Vec<(String, FieldInfo)>,
    pub warnings: Vec<String>,
    /// The annotated tree, before any dialect rewriting.
    pub tree: Rc<Node>,
}

/// Compiles ADQL into PostgreSQL/pgsphere SQL.
///
/// A compiler holds no per-statement state; one instance can serve any
/// number of statements.
#[derive(Debug, Clone)]
pub struct Compiler {
    config: CompilerConfig,
    regions: RegionRegistry,
    ufuncs: UfuncRegistry,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            regions: RegionRegistry::with_defaults(),
            ufuncs: UfuncRegistry::default_registry(),
        }
    }

    pub fn with_ufuncs(mut self, ufuncs: UfuncRegistry) -> Self {
        self.ufuncs = ufuncs;
        self
    }

    pub fn with_regions(mut self, regions: RegionRegistry) -> Self {
        self.regions = regions;
        self
    }

    /// Adds a region resolver after the ones already known.
    pub fn register_region_resolver<R: RegionResolver + 'static>(&mut self, resolver: R) {
        self.regions.register(resolver);
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn compile(&self, text: &str, catalog: &dyn CatalogLookup) -> Result<CompiledQuery, AdqlError> {
        let tree = parse_with(text, &self.config)?;
        let tree = self.regions.resolve_regions(&tree)?;
        debug!("regions resolved");

        let mut warnings = vec![];
        let tree = match self.config.default_limit {
            Some(limit) if tree.query_attrs().is_some_and(|q| q.limit.is_none()) => {
                warnings.push(format!("Query limited to {} rows; the result is probably truncated.", limit));
                with_limit(&tree, limit)
            }
            _ => tree,
        };

        let annotated = annotate(&tree, catalog, &self.ufuncs)?;
        warnings.extend(annotated.warnings);
        let columns = output_columns(&annotated.tree);

        let mut morphed = annotated.tree.clone();
        if self.config.spatial_index {
            let (state, tree) = insert_q3c_calls(&morphed)?;
            warnings.extend(state.warnings);
            morphed = tree;
        }
        let (state, tree) = morph_pgsphere(&morphed, &self.ufuncs)?;
        warnings.extend(state.warnings);
        let (state, tree) = morph_syntax(&tree, &self.config.upload_schema)?;
        warnings.extend(state.warnings);

        let mut sql = tree.flatten();
        if self.config.escape_percent {
            sql = sql.replace('%', "%%");
        }
        for warning in &warnings {
            warn!(%warning, "compile warning");
        }
        debug!(%sql, columns = columns.len(), "statement compiled");

        Ok(CompiledQuery { sql, columns, warnings, tree: annotated.tree })
    }
}

/// `tree` with `TOP limit` inserted in front of its select list.
fn with_limit(tree: &Rc<Node>, limit: u64) -> Rc<Node> {
    let mut children: Vec<Child> = tree.children().to_vec();
    let position = children.iter()
        .position(|child| child.as_node().is_some())
        .unwrap_or(children.len());
    children.insert(position, limit.to_string().into());
    children.insert(position, "TOP".into());
    Rc::new(tree.with_children(children))
}

/// Output columns of an annotated statement; repeated names get `_`
/// appended until they are unique.
fn output_columns(tree: &Node) -> Vec<(String, FieldInfo)> {
    let Some(infos) = tree.field_infos() else {
        return vec![];
    };
    let mut columns: Vec<(String, FieldInfo)> = Vec::with_capacity(infos.len());
    for (name, info) in infos.seq() {
        let mut name = name.key();
        while columns.iter().any(|(taken, _)| *taken == name) {
            name.push('_');
        }
        columns.push((name, info.clone()));
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{fixtures::sample_catalog, InMemoryCatalog},
        parser::{analyzer::AnalyzerError, ast::Identifier},
        morph::MorphError,
        region::{NamedObjectResolver, RegionError},
    };
    use pretty_assertions::assert_eq;

    fn compile(text: &str) -> CompiledQuery {
        Compiler::default().compile(text, &sample_catalog()).expect("Failed to compile")
    }

    fn names(query: &CompiledQuery) -> Vec<&str> {
        query.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    #[test]
    fn test_spatial_index_pipeline() {
        let query = compile(
            "SELECT ra1 FROM spatial2 WHERE CONTAINS(POINT('ICRS', ra1, dec), CIRCLE('ICRS', 10, 20, 1))=1");
        assert_eq!(query.sql, "SELECT ra1 FROM spatial2 WHERE q3c_join_symmetric(10, 20, ra1, dec, 1)");
        assert_eq!(names(&query), vec!["ra1"]);
        assert_eq!(query.columns[0].1.ucd, "pos.eq.ra;meta.main");
        assert!(query.warnings.is_empty());
    }

    #[test]
    fn test_pgsphere_without_index() {
        let compiler = Compiler::new(CompilerConfig::default().with_spatial_index(false));
        let query = compiler.compile(
            "SELECT ra1 FROM spatial2 WHERE CONTAINS(POINT('ICRS', ra1, dec), CIRCLE('ICRS', 10, 20, 1))=1",
            &sample_catalog()).expect("Failed to compile");
        assert_eq!(
            query.sql,
            "SELECT ra1 FROM spatial2 WHERE ((spoint(RADIANS(ra1), RADIANS(dec))) @ \
                (scircle(spoint(RADIANS(10), RADIANS(20)), RADIANS(1))))");
    }

    #[test]
    fn test_frames_from_metadata() {
        let query = compile("SELECT COORDSYS(pt), COORD1(pt) AS lon FROM geo");
        assert_eq!(query.sql, "SELECT 'ICRS', DEGREES(long(pt)) AS lon FROM geo");
        assert_eq!(names(&query), vec!["coordsys", "lon"]);
        assert_eq!(query.columns[1].1.unit, "deg");
    }

    #[test]
    fn test_default_limit() {
        let compiler = Compiler::new(CompilerConfig::default().with_default_limit(2000));
        let query = compiler.compile("SELECT mass FROM misc", &sample_catalog()).expect("Failed to compile");
        assert_eq!(query.sql, "SELECT mass FROM misc LIMIT 2000");
        assert_eq!(query.warnings, vec!["Query limited to 2000 rows; the result is probably truncated.".to_string()]);

        let query = compiler.compile("SELECT DISTINCT TOP 5 mass FROM misc", &sample_catalog())
            .expect("Failed to compile");
        assert_eq!(query.sql, "SELECT DISTINCT mass FROM misc LIMIT 5");
        assert!(query.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_output_names() {
        let query = compile("SELECT a.id, b.id, x, x FROM a JOIN b ON a.id = b.id");
        assert_eq!(names(&query), vec!["id", "id_", "x", "x_"]);
        assert_eq!(query.columns[2].1.unit, "m");
    }

    #[test]
    fn test_percent_escaping() {
        let query = compile("SELECT mass FROM misc WHERE mass LIKE 'a%'");
        assert_eq!(query.sql, "SELECT mass FROM misc WHERE mass LIKE 'a%%'");

        let compiler = Compiler::new(CompilerConfig::default().with_escape_percent(false));
        let query = compiler.compile("SELECT mass FROM misc WHERE mass LIKE 'a%'", &sample_catalog())
            .expect("Failed to compile");
        assert_eq!(query.sql, "SELECT mass FROM misc WHERE mass LIKE 'a%'");
    }

    #[test]
    fn test_uploads() {
        let catalog = InMemoryCatalog::new()
            .with_table("tap_upload.abc", vec![
                (Identifier::regular("b"), FieldInfo::new("deg", "pos.eq.ra").with_stc("ICRS")),
                (Identifier::regular("c"), FieldInfo::new("deg", "pos.eq.dec").with_stc("ICRS")),
            ]);
        let compiler = Compiler::default();
        let query = compiler.compile("select TAP_UPLOAD.abc.c from TAP_UPLOAD.abc", &catalog)
            .expect("Failed to compile");
        assert_eq!(query.sql, "SELECT abc.c FROM abc");
        let query = compiler.compile("select point('ICRS', TAP_UPLOAD.abc.b, TAP_UPLOAD.abc.c) from TAP_UPLOAD.abc", &catalog)
            .expect("Failed to compile");
        assert_eq!(query.sql, "SELECT spoint(RADIANS(abc.b), RADIANS(abc.c)) FROM abc");
    }

    #[test]
    fn test_regions() {
        let mut compiler = Compiler::default();
        compiler.register_region_resolver(NamedObjectResolver::new("simbad", |name| match name {
            "Aldebaran" => Ok(Some((68.98, 16.509))),
            _ => Ok(None),
        }));
        let query = compiler.compile(
            "SELECT mass FROM misc WHERE 1=CONTAINS(REGION('simbad Aldebaran'), CIRCLE('ICRS', 68, 16, 2))",
            &sample_catalog()).expect("Failed to compile");
        assert_eq!(query.sql, "SELECT mass FROM misc WHERE q3c_join_symmetric(68, 16, 68.98, 16.509, 2)");

        let query = compiler.compile(
            "SELECT mass FROM misc WHERE 1=CONTAINS(REGION('Position ICRS 1 2'), REGION('Circle ICRS 1 2 3'))",
            &sample_catalog()).expect("Failed to compile");
        assert_eq!(
            query.sql,
            "SELECT mass FROM misc WHERE ((spoint '(0.0174532925,0.0349065850)') @ \
                (scircle '< (0.0174532925, 0.0349065850), 0.0523598776 >'))");
    }

    #[test]
    fn test_errors_by_phase() {
        let compiler = Compiler::default();
        let catalog = sample_catalog();
        assert!(matches!(compiler.compile("SELECT FROM misc", &catalog), Err(AdqlError::Parse(_))));
        assert!(matches!(
            compiler.compile("SELECT weight FROM misc", &catalog),
            Err(AdqlError::Analyzer(AnalyzerError::ColumnNotFound { .. }))));
        assert!(matches!(
            compiler.compile("SELECT mass FROM nowhere", &catalog),
            Err(AdqlError::Analyzer(AnalyzerError::TableNotFound(_)))));
        assert!(matches!(
            compiler.compile("SELECT mass FROM misc WHERE 1=CONTAINS(p, REGION('Frob'))", &catalog),
            Err(AdqlError::Region(RegionError::NoMatch(_)))));
        assert!(matches!(
            compiler.compile("SELECT mass FROM misc WHERE 2=CONTAINS(POINT('', 1, 2), CIRCLE('', 1, 2, 3))", &catalog),
            Err(AdqlError::Morph(_))));
    }

    #[test]
    fn test_selected_comparison() {
        let query = compile(
            "SELECT CONTAINS(POINT('ICRS', ra1, dec), CIRCLE('ICRS', 10, 20, 1))=1 FROM spatial2");
        assert_eq!(query.sql, "SELECT CASE WHEN q3c_join_symmetric(10, 20, ra1, dec, 1) THEN 1 ELSE 0 END FROM spatial2");
        assert_eq!(names(&query), vec!["expr"]);

        let compiler = Compiler::new(CompilerConfig::default().with_spatial_index(false));
        let query = compiler.compile(
            "SELECT CONTAINS(POINT('ICRS', ra1, dec), CIRCLE('ICRS', 10, 20, 1))=0 AS outside FROM spatial2",
            &sample_catalog()).expect("Failed to compile");
        assert_eq!(
            query.sql,
            "SELECT CASE WHEN NOT ((spoint(RADIANS(ra1), RADIANS(dec))) @ \
                (scircle(spoint(RADIANS(10), RADIANS(20)), RADIANS(1)))) THEN 1 ELSE 0 END AS outside FROM spatial2");
        assert_eq!(names(&query), vec!["outside"]);
    }

    #[test]
    fn test_unconsumed_pseudo_boolean() {
        let text = "SELECT mass FROM misc WHERE CONTAINS(POINT('ICRS', 1, 2), CIRCLE('ICRS', 1, 2, 3))+1=2";
        for compiler in [
            Compiler::default(),
            Compiler::new(CompilerConfig::default().with_spatial_index(false)),
        ] {
            match compiler.compile(text, &sample_catalog()) {
                Err(AdqlError::Morph(MorphError::PseudoBooleanComparison(message))) => {
                    assert_eq!(message, "against 0 or 1")
                }
                other => panic!("unexpected {:?}", other.map(|q| q.sql)),
            }
        }
    }

    #[test]
    fn test_list_spacing() {
        let query = compile("SELECT COUNT(*), COUNT(DISTINCT mass), mag FROM misc GROUP BY mag ORDER BY mag");
        assert_eq!(query.sql, "SELECT COUNT(*), COUNT(DISTINCT mass), mag FROM misc GROUP BY mag ORDER BY mag");
    }

    #[test]
    fn test_annotated_tree_is_kept() {
        let query = compile("SELECT TOP 3 mass*2 AS m2 FROM misc");
        assert_eq!(query.sql, "SELECT mass * 2 AS m2 FROM misc LIMIT 3");
        assert_eq!(query.tree.flatten(), "SELECT TOP 3 mass * 2 AS m2 FROM misc");
        assert_eq!(names(&query), vec!["m2"]);
        assert_eq!(query.columns[0].1.unit, "kg");
        assert!(query.columns[0].1.tainted);
    }
}
