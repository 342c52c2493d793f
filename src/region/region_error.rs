use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("'{0}' is not a region specification I understand.")]
    NoMatch(String),
    #[error("Invalid STC-S: {0}")]
    Invalid(String),
    #[error("region resolver failed: {0}")]
    Resolver(String),
}
