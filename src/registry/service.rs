//! # Document Registry Service
//!
//! Every operation resolves the document record fresh, consults the
//! access policy, and only then touches storage. Mutations on the same
//! document are serialized through a per-document lock; ordering at the
//! storage boundary is fixed as blob-write-then-metadata-write, so a
//! failure or cancellation mid-operation leaves an orphaned blob at
//! worst, never metadata pointing at missing content.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex as AsyncMutex;
use tokio::time::timeout;
use uuid::Uuid;

use crate::blobstore::{BlobRef, BlobStore, DownloadRef, SignedUrlGenerator};
use crate::config::RegistryConfig;
use crate::observability::{Logger, Severity};

use super::document::{Document, SharePermission};
use super::errors::{RegistryError, RegistryResult};
use super::metadata::MetadataStore;
use super::policy::{AccessPolicy, Action};
use super::version::Version;

/// Result of a document deletion.
///
/// Blob deletes that failed are listed for later garbage collection;
/// metadata deletion completed regardless.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub document_id: Uuid,
    pub failed_blobs: Vec<BlobRef>,
}

impl DeleteOutcome {
    /// True if every version blob was removed
    pub fn is_clean(&self) -> bool {
        self.failed_blobs.is_empty()
    }
}

/// The document registry
pub struct DocumentRegistry {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    signer: SignedUrlGenerator,
    policy: AccessPolicy,
    config: RegistryConfig,
    locks: StdMutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl DocumentRegistry {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        signer: SignedUrlGenerator,
        config: RegistryConfig,
    ) -> Self {
        Self {
            blobs,
            metadata,
            signer,
            policy: AccessPolicy::new(),
            config,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Upload content and create a document with its initial version
    pub async fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        content: &[u8],
        mime_type: &str,
    ) -> RegistryResult<Document> {
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "document name is empty".to_string(),
            ));
        }
        self.validate_content(content, mime_type)?;

        // Blob commits before any metadata exists
        let blob_ref = self
            .bounded("blob put", self.blobs.put(content, mime_type))
            .await?;

        let document_id = Uuid::new_v4();
        let version = Version::new(
            document_id,
            blob_ref,
            content.len() as u64,
            mime_type.to_string(),
            owner_id,
            Some("Initial version".to_string()),
        );
        let document = Document::new(document_id, name.to_string(), owner_id, version.id);

        // The chain entry lands before the document becomes visible, so
        // no reader ever observes a document with an empty chain
        self.bounded("version append", self.metadata.append_version(&version))
            .await?;
        self.bounded("document insert", self.metadata.insert_document(&document))
            .await?;

        let id_str = document.id.to_string();
        let owner_str = owner_id.to_string();
        Logger::log(
            Severity::Info,
            "document_created",
            &[("document_id", &id_str), ("owner_id", &owner_str)],
        );

        Ok(document)
    }

    /// Documents where the principal is owner or shared-with, oldest first
    pub async fn list_accessible(&self, principal_id: &Uuid) -> RegistryResult<Vec<Document>> {
        let mut documents = self
            .bounded(
                "document query",
                self.metadata.list_documents_for(principal_id),
            )
            .await?;

        documents.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(documents)
    }

    /// Fetch a document and a download reference for its current version
    pub async fn get(
        &self,
        document_id: &Uuid,
        principal_id: &Uuid,
    ) -> RegistryResult<(Document, DownloadRef)> {
        let document = self.fetch(document_id).await?;
        self.policy.require(&document, principal_id, Action::Read)?;

        let current = self
            .bounded(
                "version get",
                self.metadata
                    .get_version(document_id, &document.current_version_id),
            )
            .await?
            .ok_or_else(|| {
                RegistryError::StorageFailure("current version record missing".to_string())
            })?;

        let download = self
            .signer
            .generate(&current.blob_ref, Some(self.config.download_ttl));
        Ok((document, download))
    }

    /// The version chain, in append order
    pub async fn list_versions(
        &self,
        document_id: &Uuid,
        principal_id: &Uuid,
    ) -> RegistryResult<Vec<Version>> {
        let document = self.fetch(document_id).await?;
        self.policy.require(&document, principal_id, Action::Read)?;

        self.bounded("version query", self.metadata.versions_for(document_id))
            .await
    }

    /// Fetch one version and a download reference for its blob.
    /// Historical versions stay fetchable after newer ones are added.
    pub async fn get_version(
        &self,
        document_id: &Uuid,
        version_id: &Uuid,
        principal_id: &Uuid,
    ) -> RegistryResult<(Version, DownloadRef)> {
        let document = self.fetch(document_id).await?;
        self.policy.require(&document, principal_id, Action::Read)?;

        let version = self
            .bounded(
                "version get",
                self.metadata.get_version(document_id, version_id),
            )
            .await?
            .ok_or(RegistryError::NotFound)?;

        let download = self
            .signer
            .generate(&version.blob_ref, Some(self.config.download_ttl));
        Ok((version, download))
    }

    /// Append a new version and move the current pointer to it.
    /// Prior versions' blobs are kept; history is never rewritten.
    pub async fn add_version(
        &self,
        document_id: &Uuid,
        principal_id: &Uuid,
        content: &[u8],
        mime_type: &str,
        description: Option<String>,
    ) -> RegistryResult<Version> {
        self.validate_content(content, mime_type)?;

        let lock = self.lock_for(document_id)?;
        let _guard = lock.lock().await;

        let mut document = self.fetch(document_id).await?;
        self.policy.require(&document, principal_id, Action::Write)?;

        let blob_ref = self
            .bounded("blob put", self.blobs.put(content, mime_type))
            .await?;

        let version = Version::new(
            *document_id,
            blob_ref,
            content.len() as u64,
            mime_type.to_string(),
            *principal_id,
            description,
        );
        self.bounded("version append", self.metadata.append_version(&version))
            .await?;

        let expected = document.updated_at;
        document.current_version_id = version.id;
        document.touch();
        self.bounded(
            "document replace",
            self.metadata.replace_document(&document, expected),
        )
        .await?;

        let id_str = document_id.to_string();
        let version_str = version.id.to_string();
        Logger::log(
            Severity::Info,
            "version_added",
            &[("document_id", &id_str), ("version_id", &version_str)],
        );

        Ok(version)
    }

    /// Rename a document
    pub async fn rename(
        &self,
        document_id: &Uuid,
        principal_id: &Uuid,
        new_name: &str,
    ) -> RegistryResult<Document> {
        if new_name.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "document name is empty".to_string(),
            ));
        }

        let lock = self.lock_for(document_id)?;
        let _guard = lock.lock().await;

        let mut document = self.fetch(document_id).await?;
        self.policy.require(&document, principal_id, Action::Write)?;

        let expected = document.updated_at;
        document.name = new_name.to_string();
        document.touch();
        self.bounded(
            "document replace",
            self.metadata.replace_document(&document, expected),
        )
        .await?;

        Ok(document)
    }

    /// Grant or overwrite a share. Re-granting the same user replaces
    /// the previous permission; there is no separate revoke.
    pub async fn set_share(
        &self,
        document_id: &Uuid,
        principal_id: &Uuid,
        target_user_id: &Uuid,
        permission: SharePermission,
    ) -> RegistryResult<Document> {
        let lock = self.lock_for(document_id)?;
        let _guard = lock.lock().await;

        let mut document = self.fetch(document_id).await?;
        self.policy
            .require(&document, principal_id, Action::Administer)?;

        if *target_user_id == document.owner_id {
            return Err(RegistryError::InvalidArgument(
                "owner cannot be granted a share over their own document".to_string(),
            ));
        }

        document.shares.insert(*target_user_id, permission);
        let expected = document.updated_at;
        document.touch();
        self.bounded(
            "document replace",
            self.metadata.replace_document(&document, expected),
        )
        .await?;

        let id_str = document_id.to_string();
        let target_str = target_user_id.to_string();
        Logger::log(
            Severity::Info,
            "share_set",
            &[
                ("document_id", &id_str),
                ("permission", permission.as_str()),
                ("target_user_id", &target_str),
            ],
        );

        Ok(document)
    }

    /// Delete a document, its version records, and their blobs.
    ///
    /// Every blob delete is attempted; failures are collected, not
    /// fatal. Metadata deletion always completes once reached; blobs
    /// that could not be removed are left for garbage collection.
    pub async fn delete(
        &self,
        document_id: &Uuid,
        principal_id: &Uuid,
    ) -> RegistryResult<DeleteOutcome> {
        let lock = self.lock_for(document_id)?;
        let _guard = lock.lock().await;

        let document = self.fetch(document_id).await?;
        self.policy
            .require(&document, principal_id, Action::Administer)?;

        let versions = self
            .bounded("version query", self.metadata.versions_for(document_id))
            .await?;

        let mut failed_blobs = Vec::new();
        for version in &versions {
            if let Err(e) = self
                .bounded("blob delete", self.blobs.delete(&version.blob_ref))
                .await
            {
                let key = version.blob_ref.to_string();
                let detail = format!("{:?}", e);
                Logger::log_stderr(
                    Severity::Warn,
                    "blob_delete_failed",
                    &[("blob", &key), ("detail", &detail)],
                );
                failed_blobs.push(version.blob_ref.clone());
            }
        }

        self.bounded(
            "document delete",
            self.metadata.delete_document(document_id),
        )
        .await?;

        if let Ok(mut locks) = self.locks.lock() {
            locks.remove(document_id);
        }

        let id_str = document_id.to_string();
        let failed_str = failed_blobs.len().to_string();
        Logger::log(
            Severity::Info,
            "document_deleted",
            &[("document_id", &id_str), ("failed_blobs", &failed_str)],
        );

        Ok(DeleteOutcome {
            document_id: *document_id,
            failed_blobs,
        })
    }

    async fn fetch(&self, document_id: &Uuid) -> RegistryResult<Document> {
        self.bounded("document get", self.metadata.get_document(document_id))
            .await?
            .ok_or(RegistryError::NotFound)
    }

    fn validate_content(&self, content: &[u8], mime_type: &str) -> RegistryResult<()> {
        if content.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "document content is empty".to_string(),
            ));
        }
        self.config
            .check_payload(content.len() as u64, mime_type)
            .map_err(RegistryError::InvalidArgument)
    }

    /// Bound a storage call by the configured timeout
    async fn bounded<T, E, F>(&self, what: &str, fut: F) -> RegistryResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<RegistryError>,
    {
        match timeout(self.config.storage_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(RegistryError::StorageFailure(format!(
                "{} timed out",
                what
            ))),
        }
    }

    fn lock_for(&self, document_id: &Uuid) -> RegistryResult<Arc<AsyncMutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| RegistryError::StorageFailure("lock table poisoned".to_string()))?;
        Ok(locks.entry(*document_id).or_default().clone())
    }
}
