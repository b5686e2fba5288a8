//! # Local Filesystem Backend

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::backend::BlobStore;
use super::errors::{BlobError, BlobResult};
use super::reference::BlobRef;

/// Local filesystem blob store for self-hosted deployments
#[derive(Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn full_path(&self, blob: &BlobRef) -> PathBuf {
        self.root.join(blob.as_str())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, data: &[u8], _content_type: &str) -> BlobResult<BlobRef> {
        let blob = BlobRef::mint();
        let full_path = self.full_path(&blob);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobError::Io(e.to_string()))?;
        }

        fs::write(&full_path, data)
            .await
            .map_err(|e| BlobError::Io(e.to_string()))?;

        Ok(blob)
    }

    async fn get(&self, blob: &BlobRef) -> BlobResult<Vec<u8>> {
        let full_path = self.full_path(blob);

        fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BlobError::NotFound(blob.to_string())
            } else {
                BlobError::Io(e.to_string())
            }
        })
    }

    async fn delete(&self, blob: &BlobRef) -> BlobResult<()> {
        let full_path = self.full_path(blob);

        fs::remove_file(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BlobError::NotFound(blob.to_string())
            } else {
                BlobError::Io(e.to_string())
            }
        })
    }

    async fn exists(&self, blob: &BlobRef) -> BlobResult<bool> {
        fs::try_exists(self.full_path(blob))
            .await
            .map_err(|e| BlobError::Io(e.to_string()))
    }
}
