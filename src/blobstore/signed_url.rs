//! # Signed Download References
//!
//! Time-limited handles granting read access to one blob without
//! further authorization checks. Generated synchronously; the engine
//! does not track or revoke them before expiry.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::errors::{BlobError, BlobResult};
use super::reference::BlobRef;

/// Signed download reference generator
#[derive(Debug)]
pub struct SignedUrlGenerator {
    secret: Vec<u8>,
    default_ttl: Duration,
}

impl SignedUrlGenerator {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
            default_ttl: Duration::hours(1),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Generate a download reference for a blob
    pub fn generate(&self, blob: &BlobRef, ttl: Option<Duration>) -> DownloadRef {
        let expires_at = Utc::now() + ttl.unwrap_or(self.default_ttl);
        let token = self.sign(blob, expires_at);

        DownloadRef {
            blob: blob.clone(),
            expires_at,
            token,
        }
    }

    /// Verify a download reference
    pub fn verify(&self, download: &DownloadRef) -> BlobResult<()> {
        if Utc::now() > download.expires_at {
            return Err(BlobError::UrlExpired);
        }

        let expected = self.sign(&download.blob, download.expires_at);
        if download.token != expected {
            return Err(BlobError::InvalidSignature);
        }

        Ok(())
    }

    fn sign(&self, blob: &BlobRef, expires_at: DateTime<Utc>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(blob.as_str().as_bytes());
        hasher.update(expires_at.timestamp().to_be_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

/// A time-limited download reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRef {
    pub blob: BlobRef,
    pub expires_at: DateTime<Utc>,
    pub token: String,
}

impl DownloadRef {
    /// Render the reference as a URL
    pub fn to_url(&self, base_url: &str) -> String {
        format!(
            "{}/download/{}?token={}&expires={}",
            base_url,
            self.blob,
            self.token,
            self.expires_at.timestamp()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify() {
        let generator = SignedUrlGenerator::new(b"test-secret");
        let blob = BlobRef::new("documents/abc");

        let signed = generator.generate(&blob, None);
        assert!(!signed.token.is_empty());
        assert!(generator.verify(&signed).is_ok());
    }

    #[test]
    fn test_expired_reference() {
        let generator = SignedUrlGenerator::new(b"test-secret");
        let blob = BlobRef::new("documents/abc");

        let mut signed = generator.generate(&blob, None);
        signed.expires_at = Utc::now() - Duration::hours(1);

        assert!(matches!(
            generator.verify(&signed),
            Err(BlobError::UrlExpired)
        ));
    }

    #[test]
    fn test_tampered_token() {
        let generator = SignedUrlGenerator::new(b"test-secret");
        let blob = BlobRef::new("documents/abc");

        let mut signed = generator.generate(&blob, None);
        signed.token = "forged".to_string();

        assert!(matches!(
            generator.verify(&signed),
            Err(BlobError::InvalidSignature)
        ));
    }

    #[test]
    fn test_token_bound_to_blob() {
        let generator = SignedUrlGenerator::new(b"test-secret");

        let mut signed = generator.generate(&BlobRef::new("documents/a"), None);
        signed.blob = BlobRef::new("documents/b");

        assert!(matches!(
            generator.verify(&signed),
            Err(BlobError::InvalidSignature)
        ));
    }

    #[test]
    fn test_to_url() {
        let generator = SignedUrlGenerator::new(b"secret");
        let signed = generator.generate(&BlobRef::new("documents/file"), None);

        let url = signed.to_url("https://api.example.com");
        assert!(url.contains("/download/documents/file"));
        assert!(url.contains("token="));
        assert!(url.contains("expires="));
    }
}
