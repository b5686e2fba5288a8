//! # Engine Configuration

use std::time::Duration;

use chrono::Duration as ChronoDuration;

/// Configuration for the document registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Upper bound on every blob-store and metadata-store call
    pub storage_timeout: Duration,

    /// Maximum content size in bytes (0 = unlimited)
    pub max_blob_size: u64,

    /// Allowed MIME types (empty = all)
    pub allowed_mime_types: Vec<String>,

    /// Lifetime of signed download references
    pub download_ttl: ChronoDuration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            storage_timeout: Duration::from_secs(30),
            max_blob_size: 100 * 1024 * 1024, // 100MB
            allowed_mime_types: Vec::new(),
            download_ttl: ChronoDuration::hours(1),
        }
    }
}

impl RegistryConfig {
    /// Check if a MIME type is allowed
    pub fn is_mime_allowed(&self, mime: &str) -> bool {
        if self.allowed_mime_types.is_empty() {
            return true;
        }

        for allowed in &self.allowed_mime_types {
            if let Some(prefix) = allowed.strip_suffix("/*") {
                if mime.starts_with(prefix)
                    && mime.as_bytes().get(prefix.len()) == Some(&b'/')
                {
                    return true;
                }
            } else if allowed == mime {
                return true;
            }
        }

        false
    }

    /// Validate uploaded content against the size and MIME limits.
    /// Returns the rejection reason on failure.
    pub fn check_payload(&self, size: u64, mime: &str) -> Result<(), String> {
        if self.max_blob_size > 0 && size > self.max_blob_size {
            return Err(format!(
                "content is {} bytes (max: {})",
                size, self.max_blob_size
            ));
        }
        if !self.is_mime_allowed(mime) {
            return Err(format!("content type not allowed: {}", mime));
        }
        Ok(())
    }
}
