pub mod analyzer_error;
pub use analyzer_error::*;

pub mod field_infos;
pub use field_infos::*;

pub mod analysis_context;
pub use analysis_context::*;

pub mod resolvers;
pub use resolvers::*;

pub mod annotator;
pub use annotator::*;
