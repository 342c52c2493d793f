pub mod names;
pub use names::*;

pub mod node_kind;
pub use node_kind::*;

pub mod attrs;
pub use attrs::{quote_string, unquote_string, FunctionAttrs, JoinKind, NodeAttrs, QueryAttrs, SetQuantifier};

pub mod node;
pub use node::*;
