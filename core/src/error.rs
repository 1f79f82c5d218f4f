use crate::DocumentId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Bad document id, bad document text or a malformed query term.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("document {0} not found")]
    NotFound(DocumentId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SearchError::InvalidArgument(msg.into())
    }
}
