//! # In-Memory Backend
//!
//! Blob store for tests. Supports marking individual keys so that
//! deleting them fails, which is how partial-failure paths in document
//! deletion get exercised.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use super::backend::BlobStore;
use super::errors::{BlobError, BlobResult};
use super::reference::BlobRef;

/// In-memory blob store with delete-failure injection
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    fail_deletes: RwLock<HashSet<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future delete of this key fail with a backend error
    pub fn fail_delete_of(&self, blob: &BlobRef) {
        if let Ok(mut keys) = self.fail_deletes.write() {
            keys.insert(blob.as_str().to_string());
        }
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, data: &[u8], _content_type: &str) -> BlobResult<BlobRef> {
        let blob = BlobRef::mint();
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| BlobError::Backend("lock poisoned".to_string()))?;
        blobs.insert(blob.as_str().to_string(), data.to_vec());
        Ok(blob)
    }

    async fn get(&self, blob: &BlobRef) -> BlobResult<Vec<u8>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| BlobError::Backend("lock poisoned".to_string()))?;
        blobs
            .get(blob.as_str())
            .cloned()
            .ok_or_else(|| BlobError::NotFound(blob.to_string()))
    }

    async fn delete(&self, blob: &BlobRef) -> BlobResult<()> {
        {
            let failing = self
                .fail_deletes
                .read()
                .map_err(|_| BlobError::Backend("lock poisoned".to_string()))?;
            if failing.contains(blob.as_str()) {
                return Err(BlobError::Backend(format!(
                    "injected delete failure: {}",
                    blob
                )));
            }
        }

        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| BlobError::Backend("lock poisoned".to_string()))?;
        blobs
            .remove(blob.as_str())
            .ok_or_else(|| BlobError::NotFound(blob.to_string()))?;
        Ok(())
    }

    async fn exists(&self, blob: &BlobRef) -> BlobResult<bool> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| BlobError::Backend("lock poisoned".to_string()))?;
        Ok(blobs.contains_key(blob.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_is_immediately_readable() {
        let store = MemoryBlobStore::new();
        let blob = store.put(b"data", "text/plain").await.unwrap();
        assert_eq!(store.get(&blob).await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_delete_failure_injection() {
        let store = MemoryBlobStore::new();
        let blob = store.put(b"stuck", "text/plain").await.unwrap();

        store.fail_delete_of(&blob);
        assert!(matches!(
            store.delete(&blob).await,
            Err(BlobError::Backend(_))
        ));

        // The blob is still there
        assert!(store.exists(&blob).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let store = MemoryBlobStore::new();
        let result = store.delete(&BlobRef::new("documents/gone")).await;
        assert!(matches!(result, Err(BlobError::NotFound(_))));
    }
}
