use reqwest::StatusCode;
use thiserror::Error;

/// All different error types this crate uses.
#[derive(Error, Debug)]
pub enum AvizierError {
    /// The page does not have the structure of a publication page.
    #[error("Page structure mismatch: {0}")]
    StructuralMismatch(#[from] Mismatch),
    /// Received a good non success Http response
    #[error("Expected a 2xx Success but got: {status}")]
    NoHttpSuccess {
        /// Status of the response.
        status: StatusCode,
    },
    /// Failed to get a response.
    #[error("Request failed: {0}")]
    HttpRequestFailure(#[from] reqwest::Error),
    /// The publication store rejected a record.
    #[error("Storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
    /// A record could not be (de)serialized.
    #[error("Serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AvizierError {
    /// Whether this error only concerns a single incompatible page.
    pub fn is_structural_mismatch(&self) -> bool {
        matches!(self, AvizierError::StructuralMismatch(_))
    }
}

/// A mandatory part of a publication page is absent or malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// No article container on the page.
    #[error("no article container found")]
    MissingArticle,
    /// The article container carries no identifier attribute.
    #[error("article has no identifier attribute")]
    MissingIdentifier,
    /// The identifier attribute doesn't follow the expected pattern.
    #[error("malformed identifier attribute `{0}`")]
    InvalidIdentifier(String),
    /// The article has no publishing timestamp.
    #[error("article has no timestamp")]
    MissingTimestamp,
    /// The timestamp doesn't start with a `YYYY-MM-DD` date.
    #[error("malformed timestamp `{0}`")]
    InvalidTimestamp(String),
}

pub type Result<T, E = AvizierError> = std::result::Result<T, E>;
