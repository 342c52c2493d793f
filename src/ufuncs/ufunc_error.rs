use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UfuncError {
    #[error("No such function: {0}")]
    Unknown(String),
    #[error("{name} takes exactly {expected} arguments, got {got}")]
    Arity { name: String, expected: usize, got: usize },
}
