pub mod query_resolver;
pub use query_resolver::*;

pub mod table_resolver;
pub use table_resolver::*;

pub mod expression_resolver;
pub use expression_resolver::*;

pub mod function_resolver;
pub use function_resolver::*;

pub mod geometry_resolver;
pub use geometry_resolver::*;
