use std::rc::Rc;

use crate::parser::{
    ast::{Child, Node, NodeKind},
    grammar::{ExpressionParser, LexemeParser, QuerySpecParser},
    ParseError, QueryParser, COMPARERS,
};

/// Search conditions and predicates.
pub struct ConditionParser;

impl ConditionParser {
    /// `term (OR term)*`
    pub fn search_condition(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        parser.enter()?;
        let result = Self::disjunction(parser);
        parser.leave();
        result
    }

    fn disjunction(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![Self::boolean_term(parser)?.into()];
        while let Some(or) = parser.keyword(&COMPARERS.or) {
            children.push(or.into());
            children.push(Self::boolean_term(parser)?.into());
        }
        Ok(Node::collapsible(NodeKind::SearchCondition, children))
    }

    /// `factor (AND factor)*`
    pub fn boolean_term(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![Self::boolean_factor(parser)?.into()];
        while let Some(and) = parser.keyword(&COMPARERS.and) {
            children.push(and.into());
            children.push(Self::boolean_factor(parser)?.into());
        }
        Ok(Node::collapsible(NodeKind::BooleanTerm, children))
    }

    /// `[NOT] primary`
    pub fn boolean_factor(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![];
        if let Some(not) = parser.keyword(&COMPARERS.not) {
            children.push(not.into());
        }
        children.push(Self::boolean_primary(parser)?.into());
        Ok(Node::collapsible(NodeKind::BooleanFactor, children))
    }

    /// A parenthesized condition or a predicate.
    pub fn boolean_primary(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let nested = parser.attempt(|p| {
            p.expect_punct("(")?;
            let condition = Self::search_condition(p)?;
            p.expect_punct(")")?;
            Ok(Node::build(NodeKind::BooleanPrimary, vec!["(".into(), condition.into(), ")".into()]))
        })?;
        match nested {
            Some(node) => Ok(node),
            None => Self::predicate(parser),
        }
    }

    pub fn predicate(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        if let Some(exists) = parser.keyword(&COMPARERS.exists) {
            let subquery = QuerySpecParser::subquery(parser)?;
            return Ok(Node::build(NodeKind::ExistsPredicate, vec![exists.into(), subquery.into()]));
        }

        let value = ExpressionParser::value_expression(parser)?;

        if let Some(op) = parser.attempt(LexemeParser::comparison_operator)? {
            let other = ExpressionParser::value_expression(parser)?;
            return Ok(Node::build(NodeKind::ComparisonPredicate, vec![value.into(), op.into(), other.into()]));
        }

        if let Some(is) = parser.keyword(&COMPARERS.is) {
            let mut children: Vec<Child> = vec![value.into(), is.into()];
            if let Some(not) = parser.keyword(&COMPARERS.not) {
                children.push(not.into());
            }
            children.push(parser.expect_keyword(&COMPARERS.null)?.into());
            return Ok(Node::build(NodeKind::NullPredicate, children));
        }

        let mut children: Vec<Child> = vec![value.into()];
        if let Some(not) = parser.keyword(&COMPARERS.not) {
            children.push(not.into());
        }

        if let Some(between) = parser.keyword(&COMPARERS.between) {
            children.push(between.into());
            children.push(ExpressionParser::value_expression(parser)?.into());
            children.push(parser.expect_keyword(&COMPARERS.and)?.into());
            children.push(ExpressionParser::value_expression(parser)?.into());
            return Ok(Node::build(NodeKind::BetweenPredicate, children));
        }

        if let Some(like) = parser.keyword(&COMPARERS.like) {
            children.push(like.into());
            children.push(ExpressionParser::character_value_expression(parser)?.into());
            return Ok(Node::build(NodeKind::LikePredicate, children));
        }

        if let Some(keyword) = parser.keyword(&COMPARERS.r#in) {
            children.push(keyword.into());
            children.push(Self::in_predicate_value(parser)?.into());
            return Ok(Node::build(NodeKind::InPredicate, children));
        }

        parser.fail("comparison operator, BETWEEN, IN, LIKE or IS")
    }

    fn in_predicate_value(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        if let Some(subquery) = parser.attempt(QuerySpecParser::subquery)? {
            return Ok(subquery);
        }
        parser.expect_punct("(")?;
        let mut children: Vec<Child> = vec!["(".into(), ExpressionParser::value_expression(parser)?.into()];
        while parser.punct(",") {
            children.push(",".into());
            children.push(ExpressionParser::value_expression(parser)?.into());
        }
        parser.expect_punct(")")?;
        children.push(")".into());
        Ok(Node::build(NodeKind::InValueList, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;

    fn parse_condition(text: &str) -> Result<Rc<Node>, ParseError> {
        let config = CompilerConfig::default();
        let mut parser = QueryParser::new(text, &config);
        let node = ConditionParser::search_condition(&mut parser)?;
        parser.next_non_whitespace();
        if !parser.eof() {
            return parser.fail("end of condition");
        }
        Ok(node)
    }

    #[test]
    fn test_single_predicate_collapses() {
        let node = parse_condition("x = 1").expect("Failed to parse condition");
        assert_eq!(node.kind(), NodeKind::ComparisonPredicate);
        assert_eq!(node.comparison_operator(), Some("="));
    }

    #[test]
    fn test_boolean_structure() {
        let node = parse_condition("a < 1 OR b >= 2 AND NOT c <> 3").expect("Failed to parse condition");
        assert_eq!(node.kind(), NodeKind::SearchCondition);
        assert_eq!(node.children()[2].kind(), Some(NodeKind::BooleanTerm));
        let term = node.children()[2].as_node().expect("no term");
        assert_eq!(term.children()[2].kind(), Some(NodeKind::BooleanFactor));
    }

    #[test]
    fn test_parenthesized_conditions() {
        let node = parse_condition("(a = 1 OR b = 2) AND c = 3").expect("Failed to parse condition");
        assert_eq!(node.kind(), NodeKind::BooleanTerm);
        assert_eq!(node.children()[0].kind(), Some(NodeKind::BooleanPrimary));

        let node = parse_condition("(a + b) * 2 > c").expect("Failed to parse condition");
        assert_eq!(node.kind(), NodeKind::ComparisonPredicate);
    }

    #[test]
    fn test_predicates() {
        for (text, kind) in [
            ("x BETWEEN 1 AND 2", NodeKind::BetweenPredicate),
            ("x NOT BETWEEN a AND b+1", NodeKind::BetweenPredicate),
            ("x IN (1, 2, 3)", NodeKind::InPredicate),
            ("x NOT IN (SELECT y FROM t)", NodeKind::InPredicate),
            ("name LIKE 'M%'", NodeKind::LikePredicate),
            ("name NOT LIKE 'M' || '%'", NodeKind::LikePredicate),
            ("x IS NULL", NodeKind::NullPredicate),
            ("x IS NOT NULL", NodeKind::NullPredicate),
            ("EXISTS (SELECT * FROM t)", NodeKind::ExistsPredicate),
        ] {
            let node = parse_condition(text).unwrap_or_else(|e| panic!("{}: {}", text, e));
            assert_eq!(node.kind(), kind, "{}", text);
        }
    }

    #[test]
    fn test_in_value_list() {
        let node = parse_condition("x IN (1, 2)").expect("Failed to parse condition");
        let list = node.child_of_kind(NodeKind::InValueList).expect("no value list");
        assert_eq!(list.flatten(), "( 1, 2 )");
    }

    #[test]
    fn test_bad_conditions() {
        for text in ["x", "x = ", "x BETWEEN 1", "x IS 1", "x IN ()", "NOT"] {
            assert!(parse_condition(text).is_err(), "{}", text);
        }
    }
}
