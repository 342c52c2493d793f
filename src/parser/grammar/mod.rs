pub mod lexemes;
pub use lexemes::*;

pub mod expressions;
pub use expressions::*;

pub mod functions;
pub use functions::*;

pub mod geometry;
pub use geometry::*;

pub mod conditions;
pub use conditions::*;

pub mod tables;
pub use tables::*;

pub mod query;
pub use query::*;
