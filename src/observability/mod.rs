//! # Observability
//!
//! Structured logging for the engine. Logs are synchronous JSON lines
//! with deterministic field ordering.

pub mod logger;

pub use logger::{Logger, Severity};
