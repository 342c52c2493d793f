use std::rc::Rc;

use tracing::debug;

use crate::{
    catalog::frames_compatible,
    morph::{
        helpers::{collapse_comparison, is_numeric_constant, select_boolean},
        MorphError, MorphState, Morpher,
    },
    parser::ast::{Child, Node, NodeKind},
};

/// Rewrites point-in-circle and point-in-polygon tests on literal
/// geometries into q3c index calls. Everything else is left for the
/// general geometry pass.
pub fn insert_q3c_calls(tree: &Rc<Node>) -> Result<(MorphState, Rc<Node>), MorphError> {
    let morpher = Morpher::new()
        .on(NodeKind::PredicateGeometryFunction, q3c_predicate)
        .on(NodeKind::ComparisonPredicate, collapse_comparison)
        .on(NodeKind::DerivedColumn, select_boolean);
    let (state, tree) = morpher.morph(tree)?;
    if state.has_pending() {
        return Err(MorphError::PseudoBooleanComparison("against 0 or 1".to_string()));
    }
    debug!("spatial index pass done");
    Ok((state, tree))
}

fn q3c_predicate(node: &Rc<Node>, state: &mut MorphState) -> Result<Rc<Node>, MorphError> {
    let (Some(first), Some(second)) = (node.argument(0), node.argument(1)) else {
        return Ok(node.clone());
    };
    let (point, shape) = match (node.function_name(), first.kind(), second.kind()) {
        (Some("CONTAINS"), NodeKind::Point, NodeKind::Circle | NodeKind::Polygon) => (first, second),
        (Some("INTERSECTS"), NodeKind::Point, NodeKind::Circle) => (first, second),
        (Some("INTERSECTS"), NodeKind::Circle, NodeKind::Point) => (second, first),
        _ => return Ok(node.clone()),
    };
    if !frames_compatible(point.frame(), shape.frame()) {
        return Ok(node.clone());
    }

    let call = match shape.kind() {
        NodeKind::Circle => circle_call(node, point, shape),
        _ => polygon_call(node, point, shape),
    };
    let Some(call) = call else {
        return Ok(node.clone());
    };
    debug!(call = %call.flatten(), "spatial index call");
    state.signal_boolean(&call);
    Ok(call)
}

/// Argument nodes `from..` of a geometry literal.
fn coordinates(node: &Node, from: usize) -> Option<Vec<Rc<Node>>> {
    (from..node.arguments().len())
        .map(|index| node.argument(index).cloned())
        .collect()
}

/// `q3c_join_symmetric(x1, y1, x2, y2, r)`; a constant position goes
/// first so the index is used on the column side.
fn circle_call(node: &Node, point: &Node, circle: &Node) -> Option<Rc<Node>> {
    let point_coords = coordinates(point, 1)?;
    let circle_coords = coordinates(circle, 1)?;
    let [px, py] = point_coords.as_slice() else { return None };
    let [cx, cy, radius] = circle_coords.as_slice() else { return None };

    let point_is_constant = is_numeric_constant(px) && is_numeric_constant(py);
    let circle_is_constant = is_numeric_constant(cx) && is_numeric_constant(cy);
    let (first, second) = if point_is_constant && !circle_is_constant {
        ([px, py], [cx, cy])
    } else {
        ([cx, cy], [px, py])
    };

    let mut parts: Vec<Child> = vec!["q3c_join_symmetric(".into()];
    for coordinate in first.into_iter().chain(second).chain([radius]) {
        parts.push(coordinate.clone().into());
        parts.push(", ".into());
    }
    parts.pop();
    parts.push(")".into());
    Some(Node::sql_template(node, parts))
}

/// `q3c_poly_query(x, y, ARRAY[x1, y1, ...])`
fn polygon_call(node: &Node, point: &Node, polygon: &Node) -> Option<Rc<Node>> {
    let point_coords = coordinates(point, 1)?;
    let [px, py] = point_coords.as_slice() else { return None };
    let vertices = coordinates(polygon, 1)?;

    let mut parts: Vec<Child> = vec![
        "q3c_poly_query(".into(), px.clone().into(), ", ".into(), py.clone().into(), ", ARRAY[".into(),
    ];
    for (index, value) in vertices.into_iter().enumerate() {
        if index > 0 {
            parts.push(", ".into());
        }
        parts.push(value.into());
    }
    parts.push("])".into());
    Some(Node::sql_template(node, parts))
}
