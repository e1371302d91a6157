pub type Result<T> = std::result::Result<T, CloudFreeError>;

#[derive(thiserror::Error, Debug)]
pub enum CloudFreeError {
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    /// Failure reported by the remote compute service, passed through as is.
    #[error("Compute service error: {0}")]
    Service(String),
    #[error("Compute service response is missing `{0}`")]
    MalformedResponse(&'static str),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Unknown metadata filter operator `{0}`")]
    UnknownOperator(String),
}
