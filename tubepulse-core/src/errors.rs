//! Error types for TubePulse

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Transient source failure. Retried with backoff before a run is failed.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl CoreError {
    /// Whether retrying the operation can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::SourceUnavailable(_))
    }
}
