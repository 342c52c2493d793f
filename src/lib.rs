pub mod parser;
pub use parser::{parse, parse_with, ParseError};

pub mod catalog;
pub use catalog::{CatalogLookup, FieldInfo, InMemoryCatalog};

pub mod region;
pub use region::{NamedObjectResolver, RegionRegistry, RegionResolver};

pub mod ufuncs;
pub use ufuncs::{UfuncImpl, UfuncRegistry};

pub mod morph;

pub mod config;
pub use config::CompilerConfig;

pub mod error;
pub use error::AdqlError;

pub mod compiler;
pub use compiler::{CompiledQuery, Compiler};
