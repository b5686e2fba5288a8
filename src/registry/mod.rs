//! # Document Registry
//!
//! Owns document metadata, the append-only version chain, and the share
//! list. Every operation is gated by the access policy; mutations on
//! the same document are serialized, mutations on different documents
//! run in parallel. Content bytes never pass through metadata records,
//! only blob references do.

pub mod document;
pub mod errors;
pub mod metadata;
pub mod policy;
pub mod service;
pub mod version;

pub use document::{Document, SharePermission};
pub use errors::{RegistryError, RegistryResult};
pub use metadata::{InMemoryMetadataStore, MetadataError, MetadataStore};
pub use policy::{AccessPolicy, Action};
pub use service::{DeleteOutcome, DocumentRegistry};
pub use version::Version;
