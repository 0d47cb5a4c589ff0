#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Malformed payload: {0}")]
    Decode(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}
