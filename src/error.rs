use thiserror::Error;

use crate::{
    catalog::GeometryError,
    morph::MorphError,
    parser::{analyzer::AnalyzerError, ParseError},
    region::RegionError,
    ufuncs::UfuncError,
};

/// Any failure while compiling one statement.
#[derive(Debug, Error)]
pub enum AdqlError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error(transparent)]
    Morph(#[from] MorphError),
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error(transparent)]
    Ufunc(#[from] UfuncError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("bad configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
