use std::rc::Rc;

use crate::parser::{
    ast::{Child, Node, NodeKind},
    function_class,
    grammar::{ExpressionParser, GeometryParser, LexemeParser},
    FunctionClass, ParseError, QueryParser, COMPARERS,
};

/// Numeric, set and user defined function calls.
pub struct FunctionParser;

impl FunctionParser {
    /// Reads `NAME (` and returns the children so far.
    pub fn open_call(parser: &mut QueryParser) -> Result<Vec<Child>, ParseError> {
        let name = match parser.take_word() {
            Some(name) => name,
            None => return parser.fail("function name"),
        };
        parser.expect_punct("(")?;
        Ok(vec![name.into(), "(".into()])
    }

    /// Reads `value (, value)* )` into `children`.
    pub fn arguments(
        parser: &mut QueryParser,
        children: &mut Vec<Child>,
        argument: fn(&mut QueryParser) -> Result<Rc<Node>, ParseError>,
    ) -> Result<(), ParseError> {
        children.push(argument(parser)?.into());
        while parser.punct(",") {
            children.push(",".into());
            children.push(argument(parser)?.into());
        }
        parser.expect_punct(")")?;
        children.push(")".into());
        Ok(())
    }

    /// Reads exactly `count` comma-separated arguments and the closing paren.
    pub fn fixed_arguments(
        parser: &mut QueryParser,
        children: &mut Vec<Child>,
        argument: fn(&mut QueryParser) -> Result<Rc<Node>, ParseError>,
        count: usize,
    ) -> Result<(), ParseError> {
        for index in 0..count {
            if index > 0 {
                parser.expect_punct(",")?;
                children.push(",".into());
            }
            children.push(argument(parser)?.into());
        }
        parser.expect_punct(")")?;
        children.push(")".into());
        Ok(())
    }

    pub fn numeric_value_function(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let class = match parser.peek_word().and_then(|w| function_class(&w)) {
            Some(class) => class,
            None => return parser.fail("function name"),
        };

        match class {
            FunctionClass::SetFunction => return Self::set_function(parser),
            FunctionClass::GeometryPredicate => {
                let mut children = Self::open_call(parser)?;
                Self::fixed_arguments(parser, &mut children, GeometryParser::geometry_value_expression, 2)?;
                return Ok(Node::build(NodeKind::PredicateGeometryFunction, children));
            }
            FunctionClass::Distance => {
                let mut children = Self::open_call(parser)?;
                Self::fixed_arguments(parser, &mut children, GeometryParser::coord_value, 2)?;
                return Ok(Node::build(NodeKind::Distance, children));
            }
            FunctionClass::PointAccessor => {
                let mut children = Self::open_call(parser)?;
                Self::fixed_arguments(parser, &mut children, GeometryParser::coord_value, 1)?;
                return Ok(Node::build(NodeKind::PointFunction, children));
            }
            FunctionClass::Area => {
                let mut children = Self::open_call(parser)?;
                Self::fixed_arguments(parser, &mut children, GeometryParser::geometry_value_expression, 1)?;
                return Ok(Node::build(NodeKind::Area, children));
            }
            _ => {}
        }

        let mut children = Self::open_call(parser)?;
        match class {
            FunctionClass::Nullary => {
                parser.expect_punct(")")?;
                children.push(")".into());
            }
            FunctionClass::Unary => {
                Self::fixed_arguments(parser, &mut children, ExpressionParser::numeric_value_expression, 1)?;
            }
            FunctionClass::Binary => {
                Self::fixed_arguments(parser, &mut children, ExpressionParser::numeric_value_expression, 2)?;
            }
            FunctionClass::Rand => {
                if let Some(seed) = parser.attempt(LexemeParser::unsigned_integer)? {
                    children.push(Node::build(NodeKind::UnsignedLiteral, vec![seed.into()]).into());
                }
                parser.expect_punct(")")?;
                children.push(")".into());
            }
            FunctionClass::Rounding => {
                children.push(ExpressionParser::numeric_value_expression(parser)?.into());
                if parser.punct(",") {
                    children.push(",".into());
                    let digits = LexemeParser::signed_integer(parser)?;
                    children.push(Node::build(NodeKind::UnsignedLiteral, vec![digits.into()]).into());
                }
                parser.expect_punct(")")?;
                children.push(")".into());
            }
            _ => return parser.fail("numeric function"),
        }
        Ok(Node::build(NodeKind::NumericValueFunction, children))
    }

    /// `COUNT(*)` or `AVG|MAX|MIN|SUM|COUNT([DISTINCT|ALL] value)`.
    pub fn set_function(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children = Self::open_call(parser)?;

        let is_count = children.first()
            .and_then(Child::token)
            .is_some_and(|name| name.eq_ignore_ascii_case("COUNT"));
        if is_count && parser.punct("*") {
            parser.expect_punct(")")?;
            children.push("*".into());
            children.push(")".into());
            return Ok(Node::build(NodeKind::CountAll, children));
        }

        if let Some(quantifier) = parser.keyword(&COMPARERS.distinct)
            .or_else(|| parser.keyword(&COMPARERS.all)) {
            children.push(quantifier.into());
        }
        children.push(ExpressionParser::value_expression(parser)?.into());
        parser.expect_punct(")")?;
        children.push(")".into());
        Ok(Node::build(NodeKind::SetFunction, children))
    }

    pub fn is_user_function(parser: &QueryParser, word: &str) -> bool {
        let word = word.to_lowercase();
        parser.config.ufunc_prefixes.iter()
            .any(|prefix| word.len() > prefix.len() && word.starts_with(&prefix.to_lowercase()))
    }

    /// `prefix_name(value (, value)*)`
    pub fn user_defined_function(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let pivot = parser.position;
        let mut children = Self::open_call(parser)?;
        let name = children.first().map(Child::flatten).unwrap_or_default();
        if !Self::is_user_function(parser, &name) {
            parser.position = pivot;
            return parser.fail("user defined function");
        }
        Self::arguments(parser, &mut children, ExpressionParser::value_expression)?;
        Ok(Node::build(NodeKind::UserDefinedFunction, children))
    }
}
