//! # Version Records
//!
//! One entry in a document's append-only version chain. Immutable once
//! created; never reordered, never reparented.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blobstore::BlobRef;

/// An immutable content snapshot of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub id: Uuid,
    pub document_id: Uuid,
    pub blob_ref: BlobRef,
    pub size: u64,
    pub mime_type: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Version {
    pub fn new(
        document_id: Uuid,
        blob_ref: BlobRef,
        size: u64,
        mime_type: String,
        created_by: Uuid,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            blob_ref,
            size,
            mime_type,
            created_by,
            created_at: Utc::now(),
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_version() {
        let doc_id = Uuid::new_v4();
        let user = Uuid::new_v4();
        let version = Version::new(
            doc_id,
            BlobRef::new("documents/abc"),
            13,
            "application/pdf".into(),
            user,
            Some("Initial version".into()),
        );

        assert_eq!(version.document_id, doc_id);
        assert_eq!(version.created_by, user);
        assert_eq!(version.size, 13);
    }

    #[test]
    fn test_description_omitted_from_wire() {
        let version = Version::new(
            Uuid::new_v4(),
            BlobRef::new("documents/abc"),
            1,
            "text/plain".into(),
            Uuid::new_v4(),
            None,
        );

        let json = serde_json::to_value(&version).unwrap();
        assert!(json.get("description").is_none());
    }
}
