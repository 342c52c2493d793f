use std::rc::Rc;

use thiserror::Error;

use crate::{
    catalog::FieldInfo,
    parser::{
        analyzer::FieldInfos,
        ast::{attrs::flatten_children, FunctionAttrs, Identifier, JoinKind, NodeAttrs, NodeKind, QualifiedName, QueryAttrs},
    },
    region::StcRegion,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("no {kind} child in {parent}")]
    NoSuchChild { kind: NodeKind, parent: NodeKind },
    #[error("more than one {kind} child in {parent}")]
    AmbiguousChild { kind: NodeKind, parent: NodeKind },
}

/// A child slot: either a subtree or a raw lexeme (keyword, operator,
/// punctuation).
#[derive(Debug, Clone)]
pub enum Child {
    Node(Rc<Node>),
    Token(String),
}

impl Child {
    pub fn as_node(&self) -> Option<&Rc<Node>> {
        match self {
            Child::Node(node) => Some(node),
            Child::Token(_) => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Child::Token(token) => Some(token),
            Child::Node(_) => None,
        }
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.as_node().map(|n| n.kind())
    }

    pub fn flatten(&self) -> String {
        match self {
            Child::Node(node) => node.flatten(),
            Child::Token(token) => token.clone(),
        }
    }

    /// True if this is exactly `node` (pointer identity).
    pub fn is(&self, node: &Rc<Node>) -> bool {
        matches!(self, Child::Node(n) if Rc::ptr_eq(n, node))
    }
}

impl From<Rc<Node>> for Child {
    fn from(node: Rc<Node>) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(token: &str) -> Self {
        Child::Token(token.to_string())
    }
}

impl From<String> for Child {
    fn from(token: String) -> Self {
        Child::Token(token)
    }
}

/// An immutable parse tree node.
///
/// Rewrites never mutate a node; they build a new one through
/// [`Node::with_children`] and friends, so unchanged subtrees are shared
/// between the old and the new tree.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    children: Vec<Child>,
    attrs: NodeAttrs,
    field_info: Option<FieldInfo>,
    field_infos: Option<Rc<FieldInfos>>,
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Child>) -> Self {
        let attrs = NodeAttrs::derive(kind, &children);
        Self { kind, children, attrs, field_info: None, field_infos: None }
    }

    pub fn build(kind: NodeKind, children: Vec<Child>) -> Rc<Node> {
        Rc::new(Self::new(kind, children))
    }

    /// Builds a node of `kind`, unless the production matched a single
    /// typed child, in which case that child stands in for it.
    pub fn collapsible(kind: NodeKind, children: Vec<Child>) -> Rc<Node> {
        if let (true, [Child::Node(node)]) = (kind.is_collapsible(), children.as_slice()) {
            return node.clone();
        }
        Self::build(kind, children)
    }

    /// A piece of target SQL standing in for a whole subtree.
    pub fn sql_literal(text: impl Into<String>) -> Rc<Node> {
        Rc::new(Self {
            kind: NodeKind::SqlLiteral,
            children: vec![Child::Token(text.into())],
            attrs: NodeAttrs::Sql { frame: None },
            field_info: None,
            field_infos: None,
        })
    }

    /// Like [`Node::sql_literal`], keeping the metadata and frame of the
    /// node being replaced.
    pub fn sql_literal_for(original: &Node, text: impl Into<String>) -> Rc<Node> {
        Self::sql_template(original, vec![Child::Token(text.into())])
    }

    /// Target SQL mixing literal text and subtrees, glued without
    /// separators. Later passes still reach the embedded subtrees.
    pub fn sql_template(original: &Node, parts: Vec<Child>) -> Rc<Node> {
        Rc::new(Self {
            kind: NodeKind::SqlLiteral,
            children: parts,
            attrs: NodeAttrs::Sql { frame: original.frame().map(str::to_string) },
            field_info: original.field_info.clone(),
            field_infos: None,
        })
    }

    /// A resolved STC-S region; it flattens back to its `REGION` call.
    pub fn stc_region(region: StcRegion, original: &Node) -> Rc<Node> {
        Rc::new(Self {
            kind: NodeKind::StcRegion,
            children: vec![Child::Token(original.flatten())],
            attrs: NodeAttrs::Region(region),
            field_info: original.field_info.clone(),
            field_infos: None,
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn attrs(&self) -> &NodeAttrs {
        &self.attrs
    }

    pub fn field_info(&self) -> Option<&FieldInfo> {
        self.field_info.as_ref()
    }

    pub fn field_infos(&self) -> Option<&Rc<FieldInfos>> {
        self.field_infos.as_ref()
    }

    /// Copy of this node with `children` replaced; metadata is kept.
    pub fn with_children(&self, children: Vec<Child>) -> Node {
        let attrs = if self.kind.has_intrinsic_attrs() {
            self.attrs.clone()
        } else {
            NodeAttrs::derive(self.kind, &children)
        };
        Self {
            kind: self.kind,
            children,
            attrs,
            field_info: self.field_info.clone(),
            field_infos: self.field_infos.clone(),
        }
    }

    pub fn with_field_info(mut self, field_info: FieldInfo) -> Node {
        self.field_info = Some(field_info);
        self
    }

    pub fn with_field_infos(mut self, field_infos: Rc<FieldInfos>) -> Node {
        self.field_infos = Some(field_infos);
        self
    }

    /// Renders the subtree back to SQL text.
    pub fn flatten(&self) -> String {
        if self.kind == NodeKind::CountAll {
            return "COUNT(*)".to_string();
        }
        if self.kind.is_functional() {
            if let NodeAttrs::Function(f) = &self.attrs {
                return format!("{}({})", f.name, f.arguments.join(", "));
            }
        }
        if self.kind.is_dotted() {
            return self.children.iter().map(Child::flatten).collect();
        }
        flatten_children(&self.children)
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = &Rc<Node>> {
        self.children.iter().filter_map(Child::as_node)
    }

    /// Depth-first search for the first node of `kind`, starting with self.
    pub fn find_first(&self, kind: NodeKind) -> Option<&Node> {
        if self.kind == kind {
            return Some(self);
        }
        self.child_nodes().find_map(|child| child.find_first(kind))
    }

    /// All nodes of `kind` in the subtree, in depth-first order.
    pub fn find_all(&self, kind: NodeKind) -> Vec<&Node> {
        let mut found = vec![];
        self.collect_kind(kind, &mut found);
        found
    }

    fn collect_kind<'a>(&'a self, kind: NodeKind, found: &mut Vec<&'a Node>) {
        if self.kind == kind {
            found.push(self);
        }
        for child in self.child_nodes() {
            child.collect_kind(kind, found);
        }
    }

    pub fn children_of_kind(&self, kind: NodeKind) -> Vec<&Rc<Node>> {
        self.child_nodes().filter(|n| n.kind == kind).collect()
    }

    pub fn child_of_kind(&self, kind: NodeKind) -> Option<&Rc<Node>> {
        self.child_nodes().find(|n| n.kind == kind)
    }

    pub fn unique_child_of_kind(&self, kind: NodeKind) -> Result<&Rc<Node>, NodeError> {
        let mut matches = self.child_nodes().filter(|n| n.kind == kind);
        match (matches.next(), matches.next()) {
            (Some(node), None) => Ok(node),
            (None, _) => Err(NodeError::NoSuchChild { kind, parent: self.kind }),
            (Some(_), Some(_)) => Err(NodeError::AmbiguousChild { kind, parent: self.kind }),
        }
    }

    pub fn function(&self) -> Option<&FunctionAttrs> {
        match &self.attrs {
            NodeAttrs::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn function_name(&self) -> Option<&str> {
        self.function().map(|f| f.name.as_str())
    }

    pub fn arguments(&self) -> &[String] {
        self.function().map(|f| f.arguments.as_slice()).unwrap_or(&[])
    }

    pub fn argument(&self, index: usize) -> Option<&Rc<Node>> {
        self.function()
            .and_then(|f| f.args.get(index))
            .and_then(Option::as_ref)
    }

    /// Coordinate frame of a geometry value, from its literal or, failing
    /// that, its annotation.
    pub fn frame(&self) -> Option<&str> {
        let literal = match &self.attrs {
            NodeAttrs::Function(f) => f.frame.as_deref(),
            NodeAttrs::Sql { frame } => frame.as_deref(),
            NodeAttrs::Region(region) => region.frame.as_deref(),
            _ => None,
        };
        literal.or_else(|| self.field_info.as_ref()
            .and_then(|fi| fi.stc.as_ref())
            .map(|stc| stc.frame.as_str()))
    }

    pub fn table_name(&self) -> Option<&QualifiedName> {
        match &self.attrs {
            NodeAttrs::TableName(name) | NodeAttrs::TableRef { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn correlation_name(&self) -> Option<&Identifier> {
        match &self.attrs {
            NodeAttrs::TableRef { alias, .. } => alias.as_ref(),
            NodeAttrs::DerivedTable { alias } => Some(alias),
            _ => None,
        }
    }

    pub fn column_name(&self) -> Option<&Identifier> {
        match &self.attrs {
            NodeAttrs::ColumnRef { name, .. } | NodeAttrs::DerivedColumn { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn qualifier(&self) -> Option<&QualifiedName> {
        match &self.attrs {
            NodeAttrs::ColumnRef { qualifier, .. } => qualifier.as_ref(),
            _ => None,
        }
    }

    pub fn join_kind(&self) -> Option<&JoinKind> {
        match &self.attrs {
            NodeAttrs::Join(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn query_attrs(&self) -> Option<&QueryAttrs> {
        match &self.attrs {
            NodeAttrs::Query(q) => Some(q),
            _ => None,
        }
    }

    pub fn comparison_operator(&self) -> Option<&str> {
        match &self.attrs {
            NodeAttrs::Comparison { operator } => Some(operator),
            _ => None,
        }
    }

    pub fn numeric_value(&self) -> Option<f64> {
        match &self.attrs {
            NodeAttrs::Number(n) => Some(n.into_inner()),
            _ => None,
        }
    }

    pub fn text_value(&self) -> Option<&str> {
        match &self.attrs {
            NodeAttrs::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn region(&self) -> Option<&StcRegion> {
        match &self.attrs {
            NodeAttrs::Region(region) => Some(region),
            _ => None,
        }
    }
}
