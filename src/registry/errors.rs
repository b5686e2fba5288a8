//! # Registry Errors
//!
//! The caller-visible error taxonomy. Access denials and not-found are
//! surfaced unmodified; storage backend detail is kept on the variant
//! for logging but never reaches the caller-visible message.

use thiserror::Error;

use crate::blobstore::BlobError;

use super::metadata::MetadataError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry errors
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// Document or version absent
    #[error("Not found")]
    NotFound,

    /// Access policy denial
    #[error("Access denied")]
    Forbidden,

    /// Malformed input: bad permission, self-share, missing content
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Blob or metadata backend error. The display is deliberately
    /// generic; the detail field is for logs only.
    #[error("Storage backend error")]
    StorageFailure(String),

    /// A concurrent mutation won the race; the caller should retry
    #[error("Concurrent modification")]
    Conflict,
}

impl RegistryError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            RegistryError::NotFound => 404,
            RegistryError::Forbidden => 403,
            RegistryError::InvalidArgument(_) => 400,
            RegistryError::StorageFailure(_) => 502,
            RegistryError::Conflict => 409,
        }
    }
}

impl From<BlobError> for RegistryError {
    fn from(e: BlobError) -> Self {
        RegistryError::StorageFailure(e.to_string())
    }
}

impl From<MetadataError> for RegistryError {
    fn from(e: MetadataError) -> Self {
        match e {
            MetadataError::NotFound => RegistryError::NotFound,
            MetadataError::Stale => RegistryError::Conflict,
            MetadataError::Backend(detail) => RegistryError::StorageFailure(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RegistryError::NotFound.status_code(), 404);
        assert_eq!(RegistryError::Forbidden.status_code(), 403);
        assert_eq!(RegistryError::InvalidArgument("x".into()).status_code(), 400);
        assert_eq!(RegistryError::StorageFailure("x".into()).status_code(), 502);
        assert_eq!(RegistryError::Conflict.status_code(), 409);
    }

    #[test]
    fn test_storage_failure_hides_detail() {
        let err = RegistryError::StorageFailure("s3 bucket xyz unreachable".into());
        assert_eq!(err.to_string(), "Storage backend error");
    }

    #[test]
    fn test_stale_metadata_is_conflict() {
        let err: RegistryError = MetadataError::Stale.into();
        assert!(matches!(err, RegistryError::Conflict));
    }
}
