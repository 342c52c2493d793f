use std::{collections::HashMap, rc::Rc};

use crate::{
    morph::MorphState,
    parser::ast::{Child, Node, NodeKind},
};

/// A rewrite for one node kind. It receives the node with its children
/// already morphed and returns the replacement, possibly the node itself.
pub type Handler<'h, E> = Box<dyn Fn(&Rc<Node>, &mut MorphState) -> Result<Rc<Node>, E> + 'h>;

/// Postorder tree rewriter driven by a table of per-kind handlers.
///
/// Subtrees no handler touched are shared with the input tree, which
/// stays valid.
pub struct Morpher<'h, E> {
    handlers: HashMap<NodeKind, Handler<'h, E>>,
}

impl<'h, E> Default for Morpher<'h, E> {
    fn default() -> Self {
        Self { handlers: HashMap::new() }
    }
}

impl<'h, E> Morpher<'h, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`, replacing any earlier one.
    pub fn on<F>(mut self, kind: NodeKind, handler: F) -> Self
    where
        F: Fn(&Rc<Node>, &mut MorphState) -> Result<Rc<Node>, E> + 'h,
    {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    pub fn handles(&self, kind: NodeKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn morph(&self, tree: &Rc<Node>) -> Result<(MorphState, Rc<Node>), E> {
        let mut state = MorphState::default();
        let morphed = self.morph_node(tree, &mut state)?;
        Ok((state, morphed))
    }

    fn morph_node(&self, node: &Rc<Node>, state: &mut MorphState) -> Result<Rc<Node>, E> {
        let mut changed = false;
        let mut children = Vec::with_capacity(node.children().len());
        for child in node.children() {
            match child {
                Child::Node(inner) => {
                    let morphed = self.morph_node(inner, state)?;
                    changed |= !Rc::ptr_eq(&morphed, inner);
                    children.push(Child::Node(morphed));
                }
                Child::Token(_) => children.push(child.clone()),
            }
        }

        let node = if changed {
            Rc::new(node.with_children(children))
        } else {
            node.clone()
        };
        match self.handlers.get(&node.kind()) {
            Some(handler) => handler(&node, state),
            None => Ok(node),
        }
    }
}
