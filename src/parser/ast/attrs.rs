use std::rc::Rc;

use ordered_float::NotNan;

use crate::{
    parser::ast::{Child, Identifier, Node, NodeKind, QualifiedName},
    region::StcRegion,
};

/// Attributes of a function-like node, computed once when the node is built.
#[derive(Debug, Clone, Default)]
pub struct FunctionAttrs {
    /// Normalized (uppercase) function name.
    pub name: String,
    /// Flattened actual arguments.
    pub arguments: Vec<String>,
    /// The argument node, when an argument consists of a single node.
    pub args: Vec<Option<Rc<Node>>>,
    /// Coordinate frame for geometry literals (`None` for empty or non-literal frames).
    pub frame: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinKind {
    Natural,
    Using(Vec<Identifier>),
    On,
    Cross,
    /// `'(' joined-table ')'`
    Nested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetQuantifier {
    Distinct,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryAttrs {
    pub quantifier: Option<SetQuantifier>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Per-kind derived fields.
#[derive(Debug, Clone, Default)]
pub enum NodeAttrs {
    #[default]
    None,
    Function(FunctionAttrs),
    TableName(QualifiedName),
    ColumnRef { qualifier: Option<QualifiedName>, name: Identifier },
    TableRef { name: QualifiedName, alias: Option<Identifier> },
    DerivedTable { alias: Identifier },
    Join(JoinKind),
    JoinSpec { using: Option<Vec<Identifier>> },
    DerivedColumn { alias: Option<Identifier>, name: Identifier },
    Query(QueryAttrs),
    Comparison { operator: String },
    Number(NotNan<f64>),
    Text(String),
    Sql { frame: Option<String> },
    Region(StcRegion),
}

impl NodeAttrs {
    /// Computes the derived fields of a node of `kind` from its children.
    pub fn derive(kind: NodeKind, children: &[Child]) -> NodeAttrs {
        match kind {
            NodeKind::SetFunction
            | NodeKind::NumericValueFunction
            | NodeKind::UserDefinedFunction
            | NodeKind::PredicateGeometryFunction
            | NodeKind::Distance
            | NodeKind::PointFunction
            | NodeKind::Area
            | NodeKind::Centroid
            | NodeKind::Region => NodeAttrs::Function(Self::function(children, false)),
            NodeKind::Point
            | NodeKind::Circle
            | NodeKind::Rectangle
            | NodeKind::Polygon => NodeAttrs::Function(Self::function(children, true)),
            NodeKind::TableName => NodeAttrs::TableName(Self::dotted_name(children)),
            NodeKind::ColumnReference => {
                let mut parts = Self::dotted_name(children).parts;
                let name = parts.pop().unwrap_or_else(|| Identifier::regular(""));
                let qualifier = if parts.is_empty() { None } else { Some(QualifiedName::new(parts)) };
                NodeAttrs::ColumnRef { qualifier, name }
            }
            NodeKind::PlainTableRef => {
                let name = children.first()
                    .and_then(Child::as_node)
                    .and_then(|n| n.table_name().cloned())
                    .unwrap_or_else(|| QualifiedName::new(vec![]));
                NodeAttrs::TableRef { name, alias: Self::trailing_alias(children) }
            }
            NodeKind::DerivedTable => match Self::trailing_alias(children) {
                Some(alias) => NodeAttrs::DerivedTable { alias },
                None => NodeAttrs::None,
            },
            NodeKind::JoinedTable => NodeAttrs::Join(Self::join_kind(children)),
            NodeKind::JoinSpecification => {
                let using = match children.first().and_then(Child::token) {
                    Some(t) if t.eq_ignore_ascii_case("USING") => Some(children.iter()
                        .filter_map(Child::token)
                        .filter(|t| !matches!(*t, "(" | ")" | ",") && !t.eq_ignore_ascii_case("USING"))
                        .map(Identifier::from_lexeme)
                        .collect()),
                    _ => None,
                };
                NodeAttrs::JoinSpec { using }
            }
            NodeKind::DerivedColumn => Self::derived_column(children),
            NodeKind::QuerySpecification => NodeAttrs::Query(Self::query(children)),
            NodeKind::ComparisonPredicate => match children.get(1).and_then(Child::token) {
                Some(op) => NodeAttrs::Comparison { operator: op.to_string() },
                None => NodeAttrs::None,
            },
            NodeKind::UnsignedLiteral => children.first()
                .and_then(Child::token)
                .and_then(|t| t.parse::<f64>().ok())
                .and_then(|v| NotNan::new(v).ok())
                .map(NodeAttrs::Number)
                .unwrap_or_default(),
            NodeKind::CharacterStringLiteral => children.first()
                .and_then(Child::token)
                .map(|t| NodeAttrs::Text(unquote_string(t)))
                .unwrap_or_default(),
            NodeKind::SqlLiteral => NodeAttrs::Sql { frame: None },
            NodeKind::StcRegion
            | NodeKind::SelectList
            | NodeKind::QualifiedStar
            | NodeKind::FromClause
            | NodeKind::Subquery
            | NodeKind::WhereClause
            | NodeKind::GroupByClause
            | NodeKind::HavingClause
            | NodeKind::OrderByClause
            | NodeKind::SortSpecification
            | NodeKind::SearchCondition
            | NodeKind::BooleanTerm
            | NodeKind::BooleanFactor
            | NodeKind::BooleanPrimary
            | NodeKind::BetweenPredicate
            | NodeKind::InPredicate
            | NodeKind::InValueList
            | NodeKind::LikePredicate
            | NodeKind::NullPredicate
            | NodeKind::ExistsPredicate
            | NodeKind::NumericValueExpression
            | NodeKind::Term
            | NodeKind::Factor
            | NodeKind::CharacterValueExpression
            | NodeKind::CountAll => NodeAttrs::None,
        }
    }

    fn function(children: &[Child], with_frame: bool) -> FunctionAttrs {
        let name = children.first()
            .and_then(Child::token)
            .map(str::to_uppercase)
            .unwrap_or_default();
        let segments = split_arguments(children);
        let arguments = segments.iter()
            .map(|segment| flatten_children(segment))
            .collect();
        let args: Vec<Option<Rc<Node>>> = segments.iter()
            .map(|segment| match segment.as_slice() {
                [Child::Node(node)] => Some(node.clone()),
                [Child::Token(_), Child::Node(node)] => Some(node.clone()),
                _ => None,
            })
            .collect();
        let frame = if with_frame {
            args.first()
                .and_then(Option::as_ref)
                .and_then(|n| n.text_value())
                .map(|f| f.trim().to_uppercase())
                .filter(|f| !f.is_empty())
        } else {
            None
        };
        FunctionAttrs { name, arguments, args, frame }
    }

    fn dotted_name(children: &[Child]) -> QualifiedName {
        QualifiedName::new(children.iter()
            .filter_map(Child::token)
            .filter(|t| *t != ".")
            .map(Identifier::from_lexeme)
            .collect())
    }

    fn trailing_alias(children: &[Child]) -> Option<Identifier> {
        if children.len() < 2 {
            return None;
        }
        match children.last() {
            Some(Child::Token(t)) if !t.eq_ignore_ascii_case("AS") => Some(Identifier::from_lexeme(t)),
            _ => None,
        }
    }

    fn join_kind(children: &[Child]) -> JoinKind {
        if matches!(children.first().and_then(Child::token), Some("(")) {
            return JoinKind::Nested;
        }
        let has_token = |word: &str| children.iter()
            .filter_map(Child::token)
            .any(|t| t.eq_ignore_ascii_case(word));
        if has_token("NATURAL") {
            return JoinKind::Natural;
        }
        if has_token("CROSS") {
            return JoinKind::Cross;
        }
        let spec = children.iter()
            .filter_map(Child::as_node)
            .find(|n| n.kind() == NodeKind::JoinSpecification);
        match spec.map(|s| s.attrs()) {
            Some(NodeAttrs::JoinSpec { using: Some(cols) }) => JoinKind::Using(cols.clone()),
            Some(_) => JoinKind::On,
            // a bare JOIN joins on the common columns
            None => JoinKind::Natural,
        }
    }

    fn derived_column(children: &[Child]) -> NodeAttrs {
        let alias = Self::trailing_alias(children);
        let name = match (&alias, children.first().and_then(Child::as_node)) {
            (Some(alias), _) => alias.clone(),
            (None, Some(expr)) => match expr.attrs() {
                NodeAttrs::ColumnRef { name, .. } => name.clone(),
                NodeAttrs::Function(f) => Identifier::regular(&f.name.to_lowercase()),
                _ if expr.kind() == NodeKind::CountAll => Identifier::regular("count"),
                _ => Identifier::regular("expr"),
            },
            (None, None) => Identifier::regular("expr"),
        };
        NodeAttrs::DerivedColumn { alias, name }
    }

    fn query(children: &[Child]) -> QueryAttrs {
        let tokens: Vec<&str> = children.iter().filter_map(Child::token).collect();
        let mut attrs = QueryAttrs::default();
        for (i, token) in tokens.iter().enumerate() {
            let next = tokens.get(i + 1).and_then(|t| t.parse::<u64>().ok());
            match token.to_uppercase().as_str() {
                "DISTINCT" => attrs.quantifier = Some(SetQuantifier::Distinct),
                "ALL" => attrs.quantifier = Some(SetQuantifier::All),
                "TOP" | "LIMIT" => attrs.limit = next,
                "OFFSET" => attrs.offset = next,
                _ => {}
            }
        }
        attrs
    }
}

/// Splits the children of a call `NAME ( a , b )` into per-argument runs.
pub fn split_arguments(children: &[Child]) -> Vec<Vec<Child>> {
    let open = children.iter().position(|c| c.token() == Some("("));
    let close = children.iter().rposition(|c| c.token() == Some(")"));
    let (Some(open), Some(close)) = (open, close) else {
        return vec![];
    };
    if close <= open + 1 {
        return vec![];
    }

    let mut segments = vec![vec![]];
    for child in &children[open + 1..close] {
        if child.token() == Some(",") {
            segments.push(vec![]);
        } else if let Some(segment) = segments.last_mut() {
            segment.push(child.clone());
        }
    }
    segments
}

/// Joins children with single spaces; a comma sticks to what precedes it.
pub fn flatten_children(children: &[Child]) -> String {
    let mut text = String::new();
    for part in children.iter().map(Child::flatten).filter(|s| !s.is_empty()) {
        if !text.is_empty() && part != "," {
            text.push(' ');
        }
        text.push_str(&part);
    }
    text
}

/// Undoes SQL string quoting: `'it''s'` becomes `it's`.
pub fn unquote_string(literal: &str) -> String {
    let inner = literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(literal);
    inner.replace("''", "'")
}

pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
