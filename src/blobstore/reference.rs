//! # Blob References

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque key identifying one immutable content object in the blob store.
///
/// The engine never inspects the key; backends mint them on `put` and
/// callers carry them around verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(String);

impl BlobRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Mint a fresh key under the documents namespace
    pub fn mint() -> Self {
        Self(format!("documents/{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
