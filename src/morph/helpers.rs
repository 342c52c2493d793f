use std::rc::Rc;

use crate::{
    morph::{MorphError, MorphState},
    parser::ast::{Child, Node, NodeKind},
};

/// Removes the comparison around a signalled pseudo-boolean:
/// `1 = CONTAINS(...)` becomes the boolean call, `0 = CONTAINS(...)` its
/// negation. Comparisons without a signalled operand pass unchanged.
pub fn collapse_comparison(node: &Rc<Node>, state: &mut MorphState) -> Result<Rc<Node>, MorphError> {
    let Some(index) = state.take_boolean(node) else {
        return Ok(node.clone());
    };
    let children = node.children();
    let other_index = if index == 0 { 2 } else { 0 };
    let (Some(Child::Node(call)), Some(other)) = (children.get(index), children.get(other_index)) else {
        return Ok(node.clone());
    };

    let operator = node.comparison_operator().unwrap_or_default();
    let negated = match (operator, other.flatten().as_str()) {
        ("=", "1") | ("!=" | "<>", "0") => false,
        ("=", "0") | ("!=" | "<>", "1") => true,
        ("=" | "!=" | "<>", _) => {
            return Err(MorphError::PseudoBooleanComparison("against 0 or 1".to_string()));
        }
        _ => return Err(MorphError::PseudoBooleanComparison("using = or !=".to_string())),
    };

    let collapsed = if negated {
        Node::sql_template(node, vec!["NOT ".into(), call.clone().into()])
    } else {
        call.clone()
    };
    state.mark_collapsed(&collapsed);
    Ok(collapsed)
}

/// A boolean selected as a column becomes a 0/1 value. That covers a
/// signalled pseudo-boolean, a collapsed comparison and a plain comparison.
pub fn select_boolean(node: &Rc<Node>, state: &mut MorphState) -> Result<Rc<Node>, MorphError> {
    let signalled = state.take_boolean(node) == Some(0);
    let Some(first) = node.children().first() else {
        return Ok(node.clone());
    };
    let collapsed = state.take_collapsed(first);
    let Child::Node(call) = first else {
        return Ok(node.clone());
    };
    if !signalled && !collapsed && call.kind() != NodeKind::ComparisonPredicate {
        return Ok(node.clone());
    }
    let flag = Node::sql_template(call, vec![
        "CASE WHEN ".into(),
        call.clone().into(),
        " THEN 1 ELSE 0 END".into(),
    ]);
    let mut children = node.children().to_vec();
    children[0] = flag.into();
    Ok(Rc::new(node.with_children(children)))
}

/// Whether `node` is a number written out in the query, possibly signed.
pub fn is_numeric_constant(node: &Node) -> bool {
    match node.kind() {
        NodeKind::UnsignedLiteral => true,
        NodeKind::Factor => matches!(node.children(),
            [Child::Token(sign), Child::Node(inner)]
                if matches!(sign.as_str(), "-" | "+") && inner.kind() == NodeKind::UnsignedLiteral),
        _ => false,
    }
}
