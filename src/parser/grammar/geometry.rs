use std::rc::Rc;

use crate::parser::{
    ast::{Child, Node, NodeKind},
    function_class,
    grammar::{ExpressionParser, FunctionParser},
    FunctionClass, ParseError, QueryParser, COMPARERS,
};

/// Geometry constructors and geometry-valued expressions.
pub struct GeometryParser;

impl GeometryParser {
    /// Whether the cursor sits on a call producing a geometry.
    pub fn at_geometry(parser: &mut QueryParser) -> bool {
        let class = parser.peek_word().and_then(|w| function_class(&w));
        matches!(class, Some(
            FunctionClass::Point
            | FunctionClass::Circle
            | FunctionClass::Box
            | FunctionClass::Polygon
            | FunctionClass::Region
            | FunctionClass::Centroid))
            && parser.word_opens_call()
    }

    /// A geometry constructor, `CENTROID(...)`, or a column holding a geometry.
    pub fn geometry_value_expression(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        if Self::at_geometry(parser) {
            return Self::geometry_expression(parser);
        }
        ExpressionParser::column_reference(parser)
    }

    /// A point constructor or a column.
    pub fn coord_value(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let class = parser.peek_word().and_then(|w| function_class(&w));
        if class == Some(FunctionClass::Point) && parser.word_opens_call() {
            return Self::geometry_expression(parser);
        }
        ExpressionParser::column_reference(parser)
    }

    pub fn geometry_expression(parser: &mut QueryParser) -> Result<Rc<Node>, ParseError> {
        let class = parser.peek_word().and_then(|w| function_class(&w));
        let (kind, coordinates) = match class {
            Some(FunctionClass::Point) => (NodeKind::Point, Some(2)),
            Some(FunctionClass::Circle) => (NodeKind::Circle, Some(3)),
            Some(FunctionClass::Box) => (NodeKind::Rectangle, Some(4)),
            Some(FunctionClass::Polygon) => (NodeKind::Polygon, None),
            Some(FunctionClass::Region) => {
                let mut children = FunctionParser::open_call(parser)?;
                FunctionParser::fixed_arguments(
                    parser, &mut children, ExpressionParser::character_value_expression, 1)?;
                return Ok(Node::build(NodeKind::Region, children));
            }
            Some(FunctionClass::Centroid) => {
                let mut children = FunctionParser::open_call(parser)?;
                FunctionParser::fixed_arguments(parser, &mut children, Self::geometry_value_expression, 1)?;
                return Ok(Node::build(NodeKind::Centroid, children));
            }
            _ => return parser.fail("geometry"),
        };

        let mut children = FunctionParser::open_call(parser)?;
        children.push(Self::coord_sys(parser)?);

        match coordinates {
            Some(count) => {
                for _ in 0..count {
                    parser.expect_punct(",")?;
                    children.push(",".into());
                    children.push(ExpressionParser::numeric_value_expression(parser)?.into());
                }
            }
            None => {
                let mut values = 0;
                while parser.punct(",") {
                    children.push(",".into());
                    children.push(ExpressionParser::numeric_value_expression(parser)?.into());
                    values += 1;
                }
                if values < 6 || values % 2 != 0 {
                    return parser.fail("at least three vertices of coordinate pairs");
                }
            }
        }
        parser.expect_punct(")")?;
        children.push(")".into());
        Ok(Node::build(kind, children))
    }

    /// The frame argument: a string expression or `NULL`.
    fn coord_sys(parser: &mut QueryParser) -> Result<Child, ParseError> {
        if let Some(null) = parser.keyword(&COMPARERS.null) {
            return Ok(null.into());
        }
        Ok(ExpressionParser::character_value_expression(parser)?.into())
    }
}
