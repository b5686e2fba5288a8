//! # Access Policy
//!
//! Pure decision function over `(document, principal, action)`. No
//! side effects, no caching: shares can change between calls, so every
//! decision is computed from the document record it is handed.

use uuid::Uuid;

use super::document::{Document, SharePermission};
use super::errors::{RegistryError, RegistryResult};

/// Requested action, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// View, download, list
    Read,
    /// New version, rename
    Write,
    /// Share management, delete
    Administer,
}

/// Permission checker for registry operations
#[derive(Debug, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether a principal may perform an action
    pub fn check(&self, document: &Document, principal_id: &Uuid, action: Action) -> bool {
        if *principal_id == document.owner_id {
            return true;
        }

        match action {
            Action::Administer => false,
            Action::Write => {
                document.share_for(principal_id) == Some(SharePermission::Write)
            }
            Action::Read => document.share_for(principal_id).is_some(),
        }
    }

    /// Check, turning a denial into `Forbidden`
    pub fn require(
        &self,
        document: &Document,
        principal_id: &Uuid,
        action: Action,
    ) -> RegistryResult<()> {
        if self.check(document, principal_id, action) {
            Ok(())
        } else {
            Err(RegistryError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_owner(owner: Uuid) -> Document {
        Document::new(Uuid::new_v4(), "doc".into(), owner, Uuid::new_v4())
    }

    #[test]
    fn test_owner_can_do_everything() {
        let owner = Uuid::new_v4();
        let doc = doc_with_owner(owner);
        let policy = AccessPolicy::new();

        assert!(policy.check(&doc, &owner, Action::Read));
        assert!(policy.check(&doc, &owner, Action::Write));
        assert!(policy.check(&doc, &owner, Action::Administer));
    }

    #[test]
    fn test_stranger_is_denied() {
        let doc = doc_with_owner(Uuid::new_v4());
        let stranger = Uuid::new_v4();
        let policy = AccessPolicy::new();

        assert!(!policy.check(&doc, &stranger, Action::Read));
        assert!(!policy.check(&doc, &stranger, Action::Write));
        assert!(!policy.check(&doc, &stranger, Action::Administer));
    }

    #[test]
    fn test_read_share() {
        let mut doc = doc_with_owner(Uuid::new_v4());
        let reader = Uuid::new_v4();
        doc.shares.insert(reader, SharePermission::Read);
        let policy = AccessPolicy::new();

        assert!(policy.check(&doc, &reader, Action::Read));
        assert!(!policy.check(&doc, &reader, Action::Write));
        assert!(!policy.check(&doc, &reader, Action::Administer));
    }

    #[test]
    fn test_write_share() {
        let mut doc = doc_with_owner(Uuid::new_v4());
        let writer = Uuid::new_v4();
        doc.shares.insert(writer, SharePermission::Write);
        let policy = AccessPolicy::new();

        assert!(policy.check(&doc, &writer, Action::Read));
        assert!(policy.check(&doc, &writer, Action::Write));
        assert!(!policy.check(&doc, &writer, Action::Administer));
    }

    /// administer allowed implies write allowed implies read allowed
    #[test]
    fn test_action_monotonicity() {
        let owner = Uuid::new_v4();
        let writer = Uuid::new_v4();
        let reader = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let mut doc = doc_with_owner(owner);
        doc.shares.insert(writer, SharePermission::Write);
        doc.shares.insert(reader, SharePermission::Read);
        let policy = AccessPolicy::new();

        for principal in [&owner, &writer, &reader, &stranger] {
            if policy.check(&doc, principal, Action::Administer) {
                assert!(policy.check(&doc, principal, Action::Write));
            }
            if policy.check(&doc, principal, Action::Write) {
                assert!(policy.check(&doc, principal, Action::Read));
            }
        }
    }

    #[test]
    fn test_require_maps_to_forbidden() {
        let doc = doc_with_owner(Uuid::new_v4());
        let policy = AccessPolicy::new();

        let result = policy.require(&doc, &Uuid::new_v4(), Action::Read);
        assert!(matches!(result, Err(RegistryError::Forbidden)));
    }
}
