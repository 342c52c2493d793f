use std::rc::Rc;

use crate::parser::{
    ast::{Child, Node, NodeKind},
    function_class,
    grammar::{FunctionParser, GeometryParser, LexemeParser},
    ParseError, QueryParser, COMPARERS,
};

/// Value expressions: numeric, character and geometry.
pub struct ExpressionParser;

impl ExpressionParser {
    pub fn value_expression(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let pivot = parser.position;
        if let Some(known) = parser.recall(pivot) {
            let (node, end) = known?;
            parser.position = end;
            return Ok(node);
        }

        parser.enter()?;
        let result = Self::value_expression_inner(parser);
        parser.leave();

        let end = parser.position;
        parser.remember(pivot, result.clone().map(|node| (node, end)));
        result
    }

    fn value_expression_inner(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        if GeometryParser::at_geometry(parser) {
            return GeometryParser::geometry_value_expression(parser);
        }

        if let Some(numeric) = parser.attempt(|p| {
            let node = Self::numeric_value_expression(p)?;
            p.next_non_whitespace();
            if COMPARERS.concat.compare(p) {
                return p.fail("end of numeric expression");
            }
            Ok(node)
        })? {
            return Ok(numeric);
        }
        Self::character_value_expression(parser)
    }

    pub fn numeric_value_expression(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![Self::term(parser)?.into()];
        loop {
            let op = parser.attempt(|p| {
                let op = if p.punct("+") {
                    "+"
                } else if p.punct("-") {
                    "-"
                } else {
                    return p.fail("'+' or '-'");
                };
                Ok((op, Self::term(p)?))
            })?;
            match op {
                Some((op, term)) => {
                    children.push(op.into());
                    children.push(term.into());
                }
                None => break,
            }
        }
        Ok(Node::collapsible(NodeKind::NumericValueExpression, children))
    }

    pub fn term(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![Self::factor(parser)?.into()];
        loop {
            let op = parser.attempt(|p| {
                let op = if p.punct("*") {
                    "*"
                } else if p.punct("/") {
                    "/"
                } else {
                    return p.fail("'*' or '/'");
                };
                Ok((op, Self::factor(p)?))
            })?;
            match op {
                Some((op, factor)) => {
                    children.push(op.into());
                    children.push(factor.into());
                }
                None => break,
            }
        }
        Ok(Node::collapsible(NodeKind::Term, children))
    }

    pub fn factor(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![];
        if parser.punct("-") {
            children.push("-".into());
        } else if parser.punct("+") {
            children.push("+".into());
        }
        children.push(Self::numeric_primary(parser)?.into());
        Ok(Node::collapsible(NodeKind::Factor, children))
    }

    pub fn numeric_primary(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        parser.next_non_whitespace();

        if parser.current() == '(' {
            return Self::parenthesized(parser);
        }
        if parser.current().is_ascii_digit() || parser.current() == '.' {
            let number = LexemeParser::unsigned_number(parser)?;
            return Ok(Node::build(NodeKind::UnsignedLiteral, vec![number.into()]));
        }
        if parser.current() == '\'' {
            return parser.fail("numeric expression");
        }

        match parser.peek_word() {
            Some(word) if parser.word_opens_call() => {
                if function_class(&word).is_some() {
                    return FunctionParser::numeric_value_function(parser);
                }
                if FunctionParser::is_user_function(parser, &word) {
                    return FunctionParser::user_defined_function(parser);
                }
                Self::column_reference(parser)
            }
            _ => Self::column_reference(parser),
        }
    }

    fn parenthesized(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        parser.expect_punct("(")?;
        let inner = Self::value_expression(parser)?;
        parser.expect_punct(")")?;
        Ok(Node::build(NodeKind::Factor, vec!["(".into(), inner.into(), ")".into()]))
    }

    pub fn character_value_expression(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![Self::character_primary(parser)?.into()];
        while parser.punct("||") {
            children.push("||".into());
            children.push(Self::character_primary(parser)?.into());
        }
        Ok(Node::collapsible(NodeKind::CharacterValueExpression, children))
    }

    fn character_primary(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        parser.next_non_whitespace();
        if parser.current() == '\'' {
            let literal = LexemeParser::string_literal(parser)?;
            return Ok(Node::build(NodeKind::CharacterStringLiteral, vec![literal.into()]));
        }
        Self::numeric_primary(parser)
    }

    /// `[catalog.][schema.][table.]column`
    pub fn column_reference(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let mut children: Vec<Child> = vec![LexemeParser::identifier(parser)?.into()];
        for _ in 0..3 {
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
        Ok(Node::build(NodeKind::ColumnReference, children))
    }
}
