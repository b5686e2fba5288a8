//! # Documents and Shares

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::RegistryError;

/// Permission granted to a shared-with user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
    Read,
    Write,
}

impl SharePermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            SharePermission::Read => "read",
            SharePermission::Write => "write",
        }
    }
}

impl FromStr for SharePermission {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(SharePermission::Read),
            "write" => Ok(SharePermission::Write),
            other => Err(RegistryError::InvalidArgument(format!(
                "unknown permission: {}",
                other
            ))),
        }
    }
}

/// A document record
///
/// `current_version_id` always references an entry in this document's
/// version chain; the chain is never empty while the document exists.
/// The owner never appears in `shares`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub current_version_id: Uuid,
    pub shares: HashMap<Uuid, SharePermission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(id: Uuid, name: String, owner_id: Uuid, current_version_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            owner_id,
            current_version_id,
            shares: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The share granted to a user, if any
    pub fn share_for(&self, user_id: &Uuid) -> Option<SharePermission> {
        self.shares.get(user_id).copied()
    }

    /// Bump `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
