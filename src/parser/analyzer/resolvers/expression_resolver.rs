use std::rc::Rc;

use crate::{
    catalog::{concat_user_data, FieldInfo},
    parser::{
        analyzer::{AnalysisContext, AnalyzerError, FunctionResolver, GeometryResolver, QueryResolver},
        ast::{Child, Identifier, Node, NodeKind},
    },
};

/// Metadata of a node that has already been annotated; nodes without it
/// count as dimensionless.
pub fn info_of(node: &Node) -> FieldInfo {
    node.field_info().cloned().unwrap_or_default()
}

pub struct ExpressionResolver;

impl ExpressionResolver {
    /// Annotates a subtree bottom-up, returning the rebuilt subtree.
    /// Nested query specifications open their own scope.
    pub fn annotate(node: &Rc<Node>, ctx: &mut AnalysisContext) -> Result<Rc<Node>, AnalyzerError> {
        if node.kind() == NodeKind::QuerySpecification {
            return QueryResolver::annotate_query(node, ctx);
        }

        let mut children = Vec::with_capacity(node.children().len());
        for child in node.children() {
            children.push(match child {
                Child::Node(n) => Self::annotate(n, ctx)?.into(),
                Child::Token(_) => child.clone(),
            });
        }
        let mut rebuilt = node.with_children(children);

        if node.kind() == NodeKind::Subquery {
            if let Some(infos) = rebuilt.child_of_kind(NodeKind::QuerySpecification).and_then(|q| q.field_infos()).cloned() {
                rebuilt = rebuilt.with_field_infos(infos);
            }
        }
        if node.kind().has_field_info() {
            let info = Self::field_info(&rebuilt, ctx)?;
            rebuilt = rebuilt.with_field_info(info);
        }
        Ok(Rc::new(rebuilt))
    }

    /// Metadata of a node whose children are annotated.
    fn field_info(node: &Node, ctx: &mut AnalysisContext) -> Result<FieldInfo, AnalyzerError> {
        let info = match node.kind() {
            NodeKind::ColumnReference => {
                let fallback = Identifier::regular("");
                ctx.resolve_column(node.qualifier(), node.column_name().unwrap_or(&fallback))?
            }
            NodeKind::DerivedColumn | NodeKind::Factor => node.child_nodes()
                .next()
                .map(|child| info_of(child))
                .unwrap_or_default(),
            NodeKind::NumericValueExpression => Self::fold(node, |_, a, b| FieldInfo::from_add_expression(a, b)),
            NodeKind::Term => Self::fold(node, |op, a, b| FieldInfo::from_mul_expression(op == "/", a, b)),
            NodeKind::CharacterValueExpression => Self::concatenation(node),
            NodeKind::UnsignedLiteral => FieldInfo::dimensionless().with_type(Self::literal_type(node)),
            NodeKind::CharacterStringLiteral => FieldInfo::dimensionless().with_type("text"),
            NodeKind::CountAll => FieldInfo::new("", "meta.number").with_type("bigint"),
            NodeKind::SetFunction => {
                let arg = node.argument(0).map(|a| info_of(a));
                FieldInfo::from_set_function(node.function_name().unwrap_or_default(), arg.as_ref())
            }
            NodeKind::NumericValueFunction => FunctionResolver::numeric_function(node),
            NodeKind::UserDefinedFunction => FunctionResolver::user_function(node, ctx)?,
            NodeKind::PredicateGeometryFunction
            | NodeKind::Distance
            | NodeKind::PointFunction
            | NodeKind::Area
            | NodeKind::Centroid
            | NodeKind::Point
            | NodeKind::Circle
            | NodeKind::Rectangle
            | NodeKind::Polygon
            | NodeKind::Region
            | NodeKind::StcRegion => GeometryResolver::field_info(node, ctx),
            _ => FieldInfo::dimensionless(),
        };
        Ok(info)
    }

    /// Folds `a op b op c ...` left to right.
    fn fold(node: &Node, combine: impl Fn(&str, &FieldInfo, &FieldInfo) -> FieldInfo) -> FieldInfo {
        let mut result: Option<FieldInfo> = None;
        let mut operator = "";
        for child in node.children() {
            match child {
                Child::Token(token) => operator = token.as_str(),
                Child::Node(operand) => {
                    let info = info_of(operand);
                    result = Some(match result {
                        None => info,
                        Some(previous) => combine(operator, &previous, &info),
                    });
                }
            }
        }
        result.unwrap_or_default()
    }

    /// `a || b`: keeps the metadata if all parts agree on it.
    fn concatenation(node: &Node) -> FieldInfo {
        let infos: Vec<FieldInfo> = node.child_nodes().map(|n| info_of(n)).collect();
        let info = match infos.split_first() {
            Some((first, rest)) if rest.iter().all(|i| i.unit == first.unit && i.ucd == first.ucd) => FieldInfo {
                user_data: concat_user_data(&infos),
                ..first.clone()
            }.tainted(),
            _ => FieldInfo::from_opaque(&infos),
        };
        info.with_type("text")
    }

    /// Integers stay integers, anything with a fraction or exponent is
    /// double precision.
    fn literal_type(node: &Node) -> &'static str {
        let text = node.children().first().and_then(Child::token).unwrap_or_default();
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if text.parse::<i32>().is_ok() { "integer" } else { "bigint" }
        } else {
            "double precision"
        }
    }
}
