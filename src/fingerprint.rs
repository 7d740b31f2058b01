//! Request fingerprinting
//!
//! Derives a stable cache key from the cache-relevant parts of a request:
//! method, URL, body, and proxy target. Decorative headers are deliberately
//! excluded so that requests differing only in `User-Agent` or similar share
//! a cache entry.
//!
//! The URL is taken as given; query parameter order is significant. An
//! absent body fingerprints identically to an empty one.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::request::RequestDescriptor;

/// An opaque, fixed-length cache key: lowercase hex SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the fingerprint for a request descriptor.
///
/// Pure and deterministic across process restarts and platforms: each field
/// is fed to the digest behind a length prefix, so no field boundary can be
/// forged by adjacent content.
pub fn fingerprint(request: &RequestDescriptor) -> Fingerprint {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, request.method().as_bytes());
    update_field(&mut hasher, request.url().as_str().as_bytes());
    update_field(&mut hasher, request.body().unwrap_or_default());
    update_field(&mut hasher, request.proxy().unwrap_or_default().as_bytes());

    let hex: String = hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    Fingerprint(hex)
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}
