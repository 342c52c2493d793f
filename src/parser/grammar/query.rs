use std::rc::Rc;

use tracing::debug;

use crate::{
    config::CompilerConfig,
    parser::{
        ast::{Child, Node, NodeKind},
        grammar::{ConditionParser, ExpressionParser, LexemeParser, TableRefParser},
        ParseError, QueryParser, COMPARERS,
    },
};

/// Parses one ADQL statement with the default configuration.
pub fn parse(text: &str) -> Result<Rc<Node>, ParseError> {
    parse_with(text, &CompilerConfig::default())
}

/// Parses one ADQL statement into its query specification; the whole
/// text must be consumed.
pub fn parse_with(text: &str, config: &CompilerConfig) -> Result<Rc<Node>, ParseError> {
    let mut parser = QueryParser::new(text, config);
    let tree = match parser.attempt(QuerySpecParser::parse)? {
        Some(tree) => tree,
        None => return Err(parser.furthest_error()),
    };

    parser.next_non_whitespace();
    if !parser.eof() {
        let _ = parser.fail::<()>("end of statement");
        return Err(parser.furthest_error());
    }
    debug!(length = text.len(), "statement parsed");
    Ok(tree)
}

/// The query specification and its clauses.
pub struct QuerySpecParser;

impl QuerySpecParser {
    /// `SELECT [DISTINCT|ALL] [TOP n] select_list FROM ... [WHERE ...]
    /// [GROUP BY ...] [HAVING ...] [ORDER BY ...] [OFFSET n]`
    pub fn parse(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        parser.enter()?;
        let result = Self::query_specification(parser);
        parser.leave();
        result
    }

    fn query_specification(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![parser.expect_keyword(&COMPARERS.select)?.into()];

        if let Some(quantifier) = parser.keyword(&COMPARERS.distinct)
            .or_else(|| parser.keyword(&COMPARERS.all)) {
            children.push(quantifier.into());
        }
        if let Some(top) = parser.keyword(&COMPARERS.top) {
            children.push(top.into());
            children.push(LexemeParser::unsigned_integer_value(parser)?.to_string().into());
        }

        children.push(Self::select_list(parser)?.into());
        children.push(TableRefParser::from_clause(parser)?.into());

        if let Some(keyword) = parser.keyword(&COMPARERS.r#where) {
            let condition = ConditionParser::search_condition(parser)?;
            children.push(Node::build(NodeKind::WhereClause, vec![keyword.into(), condition.into()]).into());
        }
        if let Some(group) = parser.attempt(Self::group_by_clause)? {
            children.push(group.into());
        }
        if let Some(keyword) = parser.keyword(&COMPARERS.having) {
            let condition = ConditionParser::search_condition(parser)?;
            children.push(Node::build(NodeKind::HavingClause, vec![keyword.into(), condition.into()]).into());
        }
        if let Some(order) = parser.attempt(Self::order_by_clause)? {
            children.push(order.into());
        }
        if let Some(offset) = parser.keyword(&COMPARERS.offset) {
            children.push(offset.into());
            children.push(LexemeParser::unsigned_integer_value(parser)?.to_string().into());
        }

        Ok(Node::build(NodeKind::QuerySpecification, children))
    }

    /// `'(' query_specification ')'`
    pub fn subquery(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        parser.expect_punct("(")?;
        let query = Self::parse(parser)?;
        parser.expect_punct(")")?;
        Ok(Node::build(NodeKind::Subquery, vec!["(".into(), query.into(), ")".into()]))
    }

    pub fn select_list(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        if parser.punct("*") {
            return Ok(Node::build(NodeKind::SelectList, vec!["*".into()]));
        }
        let mut children: Vec<Child> = vec![Self::select_sublist(parser)?.into()];
        while parser.punct(",") {
            children.push(",".into());
            children.push(Self::select_sublist(parser)?.into());
        }
        Ok(Node::build(NodeKind::SelectList, children))
    }

    fn select_sublist(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        if let Some(star) = parser.attempt(Self::qualified_star)? {
            return Ok(star);
        }

        let mut value = ExpressionParser::value_expression(parser)?;
        // `CONTAINS(...) = 1` and similar comparisons may be selected as 0/1 flags.
        if let Some(op) = parser.attempt(LexemeParser::comparison_operator)? {
            let other = ExpressionParser::value_expression(parser)?;
            value = Node::build(NodeKind::ComparisonPredicate, vec![value.into(), op.into(), other.into()]);
        }

        let mut children: Vec<Child> = vec![value.into()];
        if let Some(keyword) = parser.keyword(&COMPARERS.alias) {
            children.push(keyword.into());
            children.push(LexemeParser::identifier(parser)?.into());
        }
        Ok(Node::build(NodeKind::DerivedColumn, children))
    }

    /// `qualifier.*`
    fn qualified_star(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![LexemeParser::identifier(parser)?.into()];
        loop {
            parser.expect_punct(".")?;
            children.push(".".into());
            if parser.punct("*") {
                children.push("*".into());
                return Ok(Node::build(NodeKind::QualifiedStar, children));
            }
            if children.len() > 5 {
                return parser.fail("'*'");
            }
            children.push(LexemeParser::identifier(parser)?.into());
        }
    }

    fn group_by_clause(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let group = parser.expect_keyword(&COMPARERS.group)?;
        let by = parser.expect_keyword(&COMPARERS.by)?;
        let mut children: Vec<Child> = vec![group.into(), by.into(), ExpressionParser::column_reference(parser)?.into()];
        while parser.punct(",") {
            children.push(",".into());
            children.push(ExpressionParser::column_reference(parser)?.into());
        }
        Ok(Node::build(NodeKind::GroupByClause, children))
    }

    fn order_by_clause(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let order = parser.expect_keyword(&COMPARERS.order)?;
        let by = parser.expect_keyword(&COMPARERS.by)?;
        let mut children: Vec<Child> = vec![order.into(), by.into(), Self::sort_specification(parser)?.into()];
        while parser.punct(",") {
            children.push(",".into());
            children.push(Self::sort_specification(parser)?.into());
        }
        Ok(Node::build(NodeKind::OrderByClause, children))
    }

    fn sort_specification(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![ExpressionParser::value_expression(parser)?.into()];
        if let Some(direction) = parser.keyword(&COMPARERS.asc)
            .or_else(|| parser.keyword(&COMPARERS.desc)) {
            children.push(direction.into());
        }
        Ok(Node::build(NodeKind::SortSpecification, children))
    }
}
