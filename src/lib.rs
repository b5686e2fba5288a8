//! docvault - A document versioning and sharing engine with real-time rooms
//!
//! Documents live as metadata records pointing at immutable content blobs
//! in an external store. Every document carries an append-only version
//! chain, an owner, and a share list; every mutation is gated by the
//! access policy and serialized per document. Live viewers of a document
//! join its room and receive change events published by other viewers.

pub mod blobstore;
pub mod config;
pub mod observability;
pub mod registry;
pub mod rooms;
