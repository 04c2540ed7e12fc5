use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("application id is empty")]
    EmptyApplicationId,
    #[error("application id {0:?} contains characters unsafe for a file name or shell word")]
    UnsafeApplicationId(String),
}
