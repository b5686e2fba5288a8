//! # Metadata Storage
//!
//! Durable record storage for documents and versions. Version records
//! are append-only per document; the store keeps them in append order.
//! Document replacement is a compare-and-swap on `updated_at` so that
//! a mutation racing another process surfaces as a conflict instead of
//! a lost update.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::document::Document;
use super::version::Version;

/// Result type for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Metadata store errors
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    #[error("Record not found")]
    NotFound,

    /// Compare-and-swap lost: the stored document changed underneath
    #[error("Stale document revision")]
    Stale,

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Trait for document and version record persistence
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a new document record
    async fn insert_document(&self, document: &Document) -> MetadataResult<()>;

    /// Get a document by id
    async fn get_document(&self, id: &Uuid) -> MetadataResult<Option<Document>>;

    /// Replace a document's mutable fields atomically. Succeeds only if
    /// the stored `updated_at` still equals `expected_updated_at`.
    async fn replace_document(
        &self,
        document: &Document,
        expected_updated_at: DateTime<Utc>,
    ) -> MetadataResult<()>;

    /// Delete a document and all its version records as one unit
    async fn delete_document(&self, id: &Uuid) -> MetadataResult<()>;

    /// Documents where the principal is owner or holds any share
    async fn list_documents_for(&self, principal_id: &Uuid) -> MetadataResult<Vec<Document>>;

    /// Append a version to its document's chain
    async fn append_version(&self, version: &Version) -> MetadataResult<()>;

    /// A document's version chain, in append order
    async fn versions_for(&self, document_id: &Uuid) -> MetadataResult<Vec<Version>>;

    /// One version of a document
    async fn get_version(
        &self,
        document_id: &Uuid,
        version_id: &Uuid,
    ) -> MetadataResult<Option<Version>>;
}

/// In-memory metadata store
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    documents: RwLock<HashMap<Uuid, Document>>,
    versions: RwLock<HashMap<Uuid, Vec<Version>>>, // document_id -> chain
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert_document(&self, document: &Document) -> MetadataResult<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| MetadataError::Backend("lock poisoned".to_string()))?;
        documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn get_document(&self, id: &Uuid) -> MetadataResult<Option<Document>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| MetadataError::Backend("lock poisoned".to_string()))?;
        Ok(documents.get(id).cloned())
    }

    async fn replace_document(
        &self,
        document: &Document,
        expected_updated_at: DateTime<Utc>,
    ) -> MetadataResult<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| MetadataError::Backend("lock poisoned".to_string()))?;

        let stored = documents.get(&document.id).ok_or(MetadataError::NotFound)?;
        if stored.updated_at != expected_updated_at {
            return Err(MetadataError::Stale);
        }

        documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn delete_document(&self, id: &Uuid) -> MetadataResult<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| MetadataError::Backend("lock poisoned".to_string()))?;
        documents.remove(id).ok_or(MetadataError::NotFound)?;
        drop(documents);

        let mut versions = self
            .versions
            .write()
            .map_err(|_| MetadataError::Backend("lock poisoned".to_string()))?;
        versions.remove(id);
        Ok(())
    }

    async fn list_documents_for(&self, principal_id: &Uuid) -> MetadataResult<Vec<Document>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| MetadataError::Backend("lock poisoned".to_string()))?;

        let result = documents
            .values()
            .filter(|d| d.owner_id == *principal_id || d.shares.contains_key(principal_id))
            .cloned()
            .collect();
        Ok(result)
    }

    async fn append_version(&self, version: &Version) -> MetadataResult<()> {
        let mut versions = self
            .versions
            .write()
            .map_err(|_| MetadataError::Backend("lock poisoned".to_string()))?;
        versions
            .entry(version.document_id)
            .or_default()
            .push(version.clone());
        Ok(())
    }

    async fn versions_for(&self, document_id: &Uuid) -> MetadataResult<Vec<Version>> {
        let versions = self
            .versions
            .read()
            .map_err(|_| MetadataError::Backend("lock poisoned".to_string()))?;
        Ok(versions.get(document_id).cloned().unwrap_or_default())
    }

    async fn get_version(
        &self,
        document_id: &Uuid,
        version_id: &Uuid,
    ) -> MetadataResult<Option<Version>> {
        let versions = self
            .versions
            .read()
            .map_err(|_| MetadataError::Backend("lock poisoned".to_string()))?;
        Ok(versions
            .get(document_id)
            .and_then(|chain| chain.iter().find(|v| v.id == *version_id))
            .cloned())
    }
}
