use thiserror::Error;

use crate::{catalog::GeometryError, ufuncs::UfuncError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MorphError {
    /// A 0/1 geometry predicate compared in a way that has no boolean reading.
    #[error("Pseudo-Booleans in ADQL may only be compared {0}")]
    PseudoBooleanComparison(String),
    #[error("Cannot have compound regions in both arguments of a geometry predicate")]
    NoDualTransform,
    #[error("{0}")]
    Unsupported(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Ufunc(#[from] UfuncError),
}
