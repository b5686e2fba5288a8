//! # Blob Store Errors

use thiserror::Error;

/// Result type for blob store operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Blob store errors
#[derive(Debug, Clone, Error)]
pub enum BlobError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Backend error: {0}")]
    Backend(String),

    // Signed reference errors
    #[error("Download reference expired")]
    UrlExpired,

    #[error("Invalid signature")]
    InvalidSignature,
}

impl BlobError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            BlobError::NotFound(_) => 404,
            BlobError::Io(_) => 500,
            BlobError::Backend(_) => 500,
            BlobError::UrlExpired => 403,
            BlobError::InvalidSignature => 403,
        }
    }
}
