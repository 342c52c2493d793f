use std::rc::Rc;

use crate::parser::{
    ast::{Child, Node, NodeKind},
    grammar::{ConditionParser, LexemeParser, QuerySpecParser},
    ParseError, QueryParser, COMPARERS,
};

/// The FROM clause: table names, derived tables and joins.
///
/// Joins are read left to right into a left-deep tree: an opener (a
/// plain or derived table, or a parenthesized join) followed by any
/// number of join tails, each one wrapping everything to its left.
pub struct TableRefParser;

impl TableRefParser {
    /// `FROM table_reference (, table_reference)*`
    pub fn from_clause(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let from = parser.expect_keyword(&COMPARERS.from)?;
        let mut children: Vec<Child> = vec![from.into(), Self::table_reference(parser)?.into()];
        while parser.punct(",") {
            children.push(",".into());
            children.push(Self::table_reference(parser)?.into());
        }
        Ok(Node::build(NodeKind::FromClause, children))
    }

    pub fn table_reference(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        parser.enter()?;
        let result = Self::joins(parser);
        parser.leave();
        result
    }

    fn joins(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut table = Self::opener(parser)?;
        while let Some(joined) = parser.attempt(|p| Self::join_tail(p, table.clone()))? {
            table = joined;
        }
        Ok(table)
    }

    /// `[catalog.][schema.]table`
    pub fn table_name(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![LexemeParser::identifier(parser)?.into()];
        for _ in 0..2 {
            let part = parser.attempt(|p| {
                p.expect_punct(".")?;
                LexemeParser::identifier(p)
            })?;
            match part {
                Some(part) => {
                    children.push(".".into());
                    children.push(part.into());
                }
                None => break,
            }
        }
        Ok(Node::build(NodeKind::TableName, children))
    }

    /// `AS name`
    fn correlation(parser: &mut QueryParser) -> Result<Option<Vec<Child>>, ParseError> {
        match parser.keyword(&COMPARERS.alias) {
            Some(keyword) => {
                let alias = LexemeParser::identifier(parser)?;
                Ok(Some(vec![keyword.into(), alias.into()]))
            }
            None => Ok(None),
        }
    }

    fn opener(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        parser.next_non_whitespace();
        if parser.current() != '(' {
            let mut children: Vec<Child> = vec![Self::table_name(parser)?.into()];
            if let Some(correlation) = Self::correlation(parser)? {
                children.extend(correlation);
            }
            return Ok(Node::build(NodeKind::PlainTableRef, children));
        }

        if let Some(derived) = parser.attempt(|p| {
            let subquery = QuerySpecParser::subquery(p)?;
            let mut children: Vec<Child> = vec![subquery.into()];
            match Self::correlation(p)? {
                Some(correlation) => children.extend(correlation),
                None => return p.fail("correlation name for derived table"),
            }
            Ok(Node::build(NodeKind::DerivedTable, children))
        })? {
            return Ok(derived);
        }

        parser.expect_punct("(")?;
        let inner = Self::table_reference(parser)?;
        if inner.kind() != NodeKind::JoinedTable {
            return parser.fail("JOIN");
        }
        parser.expect_punct(")")?;
        Ok(Node::build(NodeKind::JoinedTable, vec!["(".into(), inner.into(), ")".into()]))
    }

    /// `[NATURAL] [INNER | (LEFT|RIGHT|FULL) [OUTER] | CROSS] JOIN opener [spec]`
    fn join_tail(parser: &mut QueryParser, left: Rc<Node>) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![left.into()];

        let natural = parser.keyword(&COMPARERS.natural);
        let natural_given = natural.is_some();
        if let Some(natural) = natural {
            children.push(natural.into());
        }

        let mut cross = false;
        if let Some(inner) = parser.keyword(&COMPARERS.inner) {
            children.push(inner.into());
        } else if let Some(outer_type) = parser.keyword(&COMPARERS.left)
            .or_else(|| parser.keyword(&COMPARERS.right))
            .or_else(|| parser.keyword(&COMPARERS.full)) {
            children.push(outer_type.into());
            if let Some(outer) = parser.keyword(&COMPARERS.outer) {
                children.push(outer.into());
            }
        } else if let Some(keyword) = parser.keyword(&COMPARERS.cross) {
            if natural_given {
                return parser.fail("JOIN");
            }
            cross = true;
            children.push(keyword.into());
        }

        children.push(parser.expect_keyword(&COMPARERS.join)?.into());
        children.push(Self::opener(parser)?.into());

        if let Some(spec) = parser.attempt(Self::join_specification)? {
            if natural_given || cross {
                return parser.fail("no join specification after NATURAL or CROSS JOIN");
            }
            children.push(spec.into());
        }
        Ok(Node::build(NodeKind::JoinedTable, children))
    }

    /// `ON condition` or `USING (col, ...)`
    pub fn join_specification(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        if let Some(on) = parser.keyword(&COMPARERS.on) {
            let condition = ConditionParser::search_condition(parser)?;
            return Ok(Node::build(NodeKind::JoinSpecification, vec![on.into(), condition.into()]));
        }

        let using = parser.expect_keyword(&COMPARERS.using)?;
        parser.expect_punct("(")?;
        let mut children: Vec<Child> = vec![using.into(), "(".into(), LexemeParser::identifier(parser)?.into()];
        while parser.punct(",") {
            children.push(",".into());
            children.push(LexemeParser::identifier(parser)?.into());
        }
        parser.expect_punct(")")?;
        children.push(")".into());
        Ok(Node::build(NodeKind::JoinSpecification, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CompilerConfig,
        parser::ast::{Identifier, JoinKind},
    };

    fn parse_from(text: &str) -> Result<Rc<Node>, ParseError> {
        let config = CompilerConfig::default();
        let mut parser = QueryParser::new(text, &config);
        let node = TableRefParser::from_clause(&mut parser)?;
        parser.next_non_whitespace();
        if !parser.eof() {
            return parser.fail("end of FROM clause");
        }
        Ok(node)
    }

    fn first_table(text: &str) -> Rc<Node> {
        let from = parse_from(text).expect("Failed to parse FROM clause");
        match from.children().get(1) {
            Some(Child::Node(node)) => node.clone(),
            _ => panic!("no table in {}", text),
        }
    }

    #[test]
    fn test_plain_tables() {
        let table = first_table("FROM ivoa.obscore AS o");
        assert_eq!(table.kind(), NodeKind::PlainTableRef);
        assert_eq!(table.table_name().map(|n| n.to_sql()), Some("ivoa.obscore".to_string()));
        assert_eq!(table.correlation_name(), Some(&Identifier::regular("o")));

        let table = first_table("from t");
        assert!(table.correlation_name().is_none());
        assert!(parse_from("from t x").is_err());
        assert!(parse_from("from a.b.c.d").is_err());
    }

    #[test]
    fn test_join_kinds() {
        for (text, kind) in [
            ("from a join b", JoinKind::Natural),
            ("from a natural join b", JoinKind::Natural),
            ("from a cross join b", JoinKind::Cross),
            ("from a inner join b on a.x = b.x", JoinKind::On),
            ("from a left outer join b using (x, y)",
                JoinKind::Using(vec![Identifier::regular("x"), Identifier::regular("y")])),
            ("from a right join b on x = y", JoinKind::On),
        ] {
            let table = first_table(text);
            assert_eq!(table.kind(), NodeKind::JoinedTable, "{}", text);
            assert_eq!(table.join_kind(), Some(&kind), "{}", text);
        }
    }

    #[test]
    fn test_joins_are_left_deep() {
        let table = first_table("from a join b join c");
        let left = table.children().first().and_then(Child::as_node).expect("no left side");
        assert_eq!(left.kind(), NodeKind::JoinedTable);
        assert_eq!(table.flatten(), "a JOIN b JOIN c");
    }

    #[test]
    fn test_nested_joins() {
        let table = first_table("from (a join b) cross join (c join d)");
        assert_eq!(table.join_kind(), Some(&JoinKind::Cross));
        let left = table.children().first().and_then(Child::as_node).expect("no left side");
        assert_eq!(left.join_kind(), Some(&JoinKind::Nested));
        assert!(parse_from("from (a)").is_err());
    }

    #[test]
    fn test_right_nested_join() {
        let table = first_table("from a join (b join c on b.id = c.z) on a.id = b.id");
        assert_eq!(table.join_kind(), Some(&JoinKind::On));
        assert_eq!(table.children().first().and_then(Child::as_node).map(|n| n.kind()), Some(NodeKind::PlainTableRef));

        let right = table.child_of_kind(NodeKind::JoinedTable).expect("no nested join");
        assert_eq!(right.join_kind(), Some(&JoinKind::Nested));
        let inner = right.child_of_kind(NodeKind::JoinedTable).expect("no inner join");
        assert_eq!(inner.join_kind(), Some(&JoinKind::On));
        assert_eq!(table.flatten(), "a JOIN ( b JOIN c ON b.id = c.z ) ON a.id = b.id");
    }

    #[test]
    fn test_derived_tables() {
        let table = first_table("from (select * from x) as q");
        assert_eq!(table.kind(), NodeKind::DerivedTable);
        assert_eq!(table.correlation_name(), Some(&Identifier::regular("q")));
        assert!(parse_from("from (select * from x)").is_err());
    }

    #[test]
    fn test_comma_joins() {
        let from = parse_from("from a, b as c").expect("Failed to parse FROM clause");
        assert_eq!(from.children_of_kind(NodeKind::PlainTableRef).len(), 2);
    }

    #[test]
    fn test_bad_joins() {
        for text in [
            "from a natural join b on a.x = b.x",
            "from a cross join b using (x)",
            "from a natural cross join b",
            "from a join",
            "from a outer join b",
            "from a join b using ()",
            "from t1 quatsch join t1",
            "from join t1",
        ] {
            assert!(parse_from(text).is_err(), "{}", text);
        }
    }
}
