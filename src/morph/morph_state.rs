use std::rc::Rc;

use crate::parser::ast::{Child, Node};

/// Scratchpad shared by the handlers of one morph pass.
///
/// Geometry predicates rewritten into real booleans register the
/// replacement here; the enclosing comparison or select-list item finds
/// it by identity and consumes it.
#[derive(Debug, Default)]
pub struct MorphState {
    pending: Vec<Rc<Node>>,
    collapsed: Vec<Rc<Node>>,
    pub warnings: Vec<String>,
}

impl MorphState {
    pub fn signal_boolean(&mut self, node: &Rc<Node>) {
        self.pending.push(node.clone());
    }

    /// Index of the first child of `parent` that is a signalled boolean;
    /// the signal is consumed.
    pub fn take_boolean(&mut self, parent: &Node) -> Option<usize> {
        let (child, slot) = parent.children().iter().enumerate().find_map(|(index, child)| {
            self.pending.iter()
                .position(|pending| child.is(pending))
                .map(|slot| (index, slot))
        })?;
        self.pending.swap_remove(slot);
        Some(child)
    }

    pub fn is_pending(&self, child: &Child) -> bool {
        self.pending.iter().any(|pending| child.is(pending))
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Records the boolean a pseudo-boolean comparison was reduced to.
    pub fn mark_collapsed(&mut self, node: &Rc<Node>) {
        self.collapsed.push(node.clone());
    }

    pub fn take_collapsed(&mut self, child: &Child) -> bool {
        match self.collapsed.iter().position(|collapsed| child.is(collapsed)) {
            Some(slot) => {
                self.collapsed.swap_remove(slot);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::NodeKind;

    #[test]
    fn test_signals_match_by_identity() {
        let call = Node::sql_literal("q3c_radial_query(a, b)");
        let lookalike = Node::sql_literal("q3c_radial_query(a, b)");
        let one = Node::build(NodeKind::UnsignedLiteral, vec!["1".into()]);
        let comparison = Node::build(NodeKind::ComparisonPredicate, vec![one.into(), "=".into(), call.clone().into()]);
        let other = Node::build(NodeKind::ComparisonPredicate, vec![lookalike.into(), "=".into(), "1".into()]);

        let mut state = MorphState::default();
        state.signal_boolean(&call);
        assert_eq!(state.take_boolean(&other), None);
        assert!(state.is_pending(&comparison.children()[2]));
        assert_eq!(state.take_boolean(&comparison), Some(2));
        assert!(!state.has_pending());
        assert_eq!(state.take_boolean(&comparison), None);
    }
}
