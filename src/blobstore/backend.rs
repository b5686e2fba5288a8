//! # Blob Store Trait

use async_trait::async_trait;

use super::errors::BlobResult;
use super::reference::BlobRef;

/// Backend trait for out-of-process content storage.
///
/// A successful `put` must be immediately readable by `get`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Store content and mint a reference to it
    async fn put(&self, data: &[u8], content_type: &str) -> BlobResult<BlobRef>;

    /// Read content for a reference
    async fn get(&self, blob: &BlobRef) -> BlobResult<Vec<u8>>;

    /// Delete content for a reference
    async fn delete(&self, blob: &BlobRef) -> BlobResult<()>;

    /// Check if a reference resolves
    async fn exists(&self, blob: &BlobRef) -> BlobResult<bool>;
}
