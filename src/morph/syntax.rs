use std::rc::Rc;

use tracing::debug;

use crate::{
    morph::{MorphError, MorphState, Morpher},
    parser::ast::{Child, Identifier, Node, NodeKind, QualifiedName, SetQuantifier},
};

/// Final PostgreSQL spellings: `TOP n` turns into `LIMIT n`, an explicit
/// `ALL` into `OFFSET 0`, and the upload schema disappears from table
/// and column names.
pub fn morph_syntax(tree: &Rc<Node>, upload_schema: &str) -> Result<(MorphState, Rc<Node>), MorphError> {
    let morpher: Morpher<'_, MorphError> = Morpher::new()
        .on(NodeKind::QuerySpecification, |node, _| Ok(limits(node)))
        .on(NodeKind::TableName, |node, _| Ok(strip_table_schema(node, upload_schema)))
        .on(NodeKind::ColumnReference, |node, _| Ok(strip_column_schema(node, upload_schema)));
    let result = morpher.morph(tree)?;
    debug!("syntax pass done");
    Ok(result)
}

fn limits(node: &Rc<Node>) -> Rc<Node> {
    let Some(attrs) = node.query_attrs() else {
        return node.clone();
    };
    let select_all = attrs.quantifier == Some(SetQuantifier::All);
    let has_top = node.children().iter().any(|c| c.token().is_some_and(|t| t.eq_ignore_ascii_case("TOP")));
    if !select_all && !has_top {
        return node.clone();
    }

    let mut children = Vec::with_capacity(node.children().len() + 2);
    let mut tokens = node.children().iter();
    while let Some(child) = tokens.next() {
        match child.token().map(str::to_uppercase).as_deref() {
            // the count of TOP and OFFSET is the next token
            Some("TOP") | Some("OFFSET") => {
                tokens.next();
            }
            Some("ALL") => {}
            _ => children.push(child.clone()),
        }
    }

    if let Some(limit) = attrs.limit {
        children.push("LIMIT".into());
        children.push(limit.to_string().into());
    }
    match (attrs.offset, select_all) {
        (Some(offset), _) => {
            children.push("OFFSET".into());
            children.push(offset.to_string().into());
        }
        (None, true) => {
            children.push("OFFSET".into());
            children.push("0".into());
        }
        (None, false) => {}
    }
    Rc::new(node.with_children(children))
}

fn dotted(parts: &[Identifier]) -> Vec<Child> {
    let mut children = vec![];
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            children.push(".".into());
        }
        children.push(part.to_sql().into());
    }
    children
}

fn strip_table_schema(node: &Rc<Node>, upload_schema: &str) -> Rc<Node> {
    match node.table_name().and_then(|name| name.without_schema(upload_schema)) {
        Some(name) => Rc::new(node.with_children(dotted(&name.parts))),
        None => node.clone(),
    }
}

fn strip_column_schema(node: &Rc<Node>, upload_schema: &str) -> Rc<Node> {
    let (Some(qualifier), Some(name)) = (node.qualifier(), node.column_name()) else {
        return node.clone();
    };
    match qualifier.without_schema(upload_schema) {
        Some(QualifiedName { mut parts }) => {
            parts.push(name.clone());
            Rc::new(node.with_children(dotted(&parts)))
        }
        None => node.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn morphed(query: &str) -> String {
        let tree = parse(query).expect("Failed to parse query");
        let (_, tree) = morph_syntax(&tree, "TAP_UPLOAD").expect("Failed to morph");
        tree.flatten()
    }

    #[test]
    fn test_top_becomes_limit() {
        assert_eq!(morphed("SELECT TOP 5 x FROM t"), "SELECT x FROM t LIMIT 5");
        assert_eq!(morphed("select distinct top 10 x, y from foo offset 3"),
            "SELECT DISTINCT x, y FROM foo LIMIT 10 OFFSET 3");
        assert_eq!(morphed("select x from foo order by x offset 3"), "SELECT x FROM foo ORDER BY x OFFSET 3");
    }

    #[test]
    fn test_all_means_offset_zero() {
        assert_eq!(morphed("SELECT ALL TOP 5 x FROM t"), "SELECT x FROM t LIMIT 5 OFFSET 0");
        assert_eq!(morphed("SELECT ALL x FROM t OFFSET 7"), "SELECT x FROM t OFFSET 7");
    }

    #[test]
    fn test_subqueries() {
        assert_eq!(
            morphed("select top 1 a from (select top 2 a from t) as q where a in (select top 3 b from u)"),
            "SELECT a FROM ( SELECT a FROM t LIMIT 2 ) AS q WHERE a IN ( SELECT b FROM u LIMIT 3 ) LIMIT 1");
    }

    #[test]
    fn test_upload_schema_removed() {
        assert_eq!(morphed("SELECT x FROM TAP_UPLOAD.mytable"), "SELECT x FROM mytable");
        assert_eq!(morphed("select * from tap_upload.abc as o"), "SELECT * FROM abc AS o");
        assert_eq!(morphed("select TAP_UPLOAD.abc.c from TAP_UPLOAD.abc"), "SELECT abc.c FROM abc");
        assert_eq!(morphed("select abc.c from ppmx.abc"), "SELECT abc.c FROM ppmx.abc");
        assert_eq!(morphed("select x from \"TAP_UPLOAD\".abc"), "SELECT x FROM \"TAP_UPLOAD\".abc");
    }

    #[test]
    fn test_untouched_queries_are_shared() {
        let tree = parse("SELECT x FROM ppmx.data WHERE x > 2").expect("Failed to parse query");
        let (_, morphed) = morph_syntax(&tree, "TAP_UPLOAD").expect("Failed to morph");
        assert!(Rc::ptr_eq(&tree, &morphed));
    }
}
