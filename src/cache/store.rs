//! Disk cache store
//!
//! Persists one entry per fingerprint under a configured root directory:
//! a JSON metadata file alongside a raw body file, sharded by the first two
//! characters of the fingerprint to bound directory size.
//!
//! Writes go to temporary sibling paths and are renamed into place, and the
//! metadata records the digest of the body it was written with, so a
//! concurrent reader observes either the previous entry in full or the new
//! one in full. Missing or corrupt entries read back as absent; corruption
//! is never a hard error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::fingerprint::Fingerprint;
use crate::response::Response;

/// A fully materialized cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// When the entry was written
    pub created_at: DateTime<Utc>,
    /// HTTP status code of the cached response
    pub status: u16,
    /// Response headers, order and duplicates preserved
    pub headers: Vec<(String, String)>,
    /// Raw response body
    pub body: Vec<u8>,
}

impl CacheEntry {
    pub fn from_response(response: &Response, created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
        }
    }

    pub fn into_response(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

/// On-disk metadata record. The body lives in a separate file so freshness
/// probes never touch it; `body_sha256` ties the two files together, so a
/// body from a concurrent rewrite never pairs with metadata from another
/// generation of the entry.
#[derive(Debug, Serialize, Deserialize)]
struct EntryMetadata {
    created_at: DateTime<Utc>,
    status: u16,
    headers: Vec<(String, String)>,
    body_sha256: String,
}

/// Maps fingerprints to persisted entries under a root directory.
///
/// The root is an explicit handle: two stores constructed with the same
/// root observe the same cache regardless of process identity.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the metadata file for a fingerprint. This is the path shown
    /// to users in `--status` output.
    pub fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.shard_dir(fingerprint)
            .join(format!("{fingerprint}.json"))
    }

    fn body_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.shard_dir(fingerprint)
            .join(format!("{fingerprint}.body"))
    }

    fn shard_dir(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root.join(&fingerprint.as_str()[..2])
    }

    /// Loads the entry for a fingerprint.
    ///
    /// Returns `None` when the entry is missing, unreadable, or corrupt
    /// (unparseable metadata, missing body file, body digest mismatch).
    pub fn load(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        let meta = self.read_metadata(fingerprint)?;

        let body_path = self.body_path(fingerprint);
        let body = match fs::read(&body_path) {
            Ok(body) => body,
            Err(err) => {
                warn!(path = %body_path.display(), %err, "cache body missing, treating entry as absent");
                return None;
            }
        };
        if body_digest(&body) != meta.body_sha256 {
            warn!(path = %body_path.display(), "cache body does not match its metadata, treating entry as absent");
            return None;
        }

        Some(CacheEntry {
            created_at: meta.created_at,
            status: meta.status,
            headers: meta.headers,
            body,
        })
    }

    /// Persists an entry, replacing any previous one for the same
    /// fingerprint in full.
    ///
    /// The body is written first; the metadata rename is the sole commit
    /// point. `load` only accepts a body whose digest the metadata names,
    /// so a reader racing a rewrite sees the old entry until the metadata
    /// lands, then the new one.
    pub fn save(&self, fingerprint: &Fingerprint, entry: &CacheEntry) -> std::io::Result<()> {
        fs::create_dir_all(self.shard_dir(fingerprint))?;

        let body_path = self.body_path(fingerprint);
        write_atomically(&body_path, &entry.body)?;

        let meta = EntryMetadata {
            created_at: entry.created_at,
            status: entry.status,
            headers: entry.headers.clone(),
            body_sha256: body_digest(&entry.body),
        };
        let json = serde_json::to_vec(&meta)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        write_atomically(&self.entry_path(fingerprint), &json)
    }

    /// Freshness probe: the entry's creation time, read from metadata only.
    ///
    /// Returns `None` for absent or corrupt entries, same as `load`.
    pub fn last_modified(&self, fingerprint: &Fingerprint) -> Option<DateTime<Utc>> {
        Some(self.read_metadata(fingerprint)?.created_at)
    }

    fn read_metadata(&self, fingerprint: &Fingerprint) -> Option<EntryMetadata> {
        let meta_path = self.entry_path(fingerprint);
        let content = fs::read_to_string(&meta_path).ok()?;
        match serde_json::from_str(&content) {
            Ok(meta) => Some(meta),
            Err(err) => {
                warn!(path = %meta_path.display(), %err, "unreadable cache metadata, treating as absent");
                None
            }
        }
    }
}

fn body_digest(body: &[u8]) -> String {
    Sha256::digest(body)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    if let Err(err) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (Store, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Store::new(temp_dir.path());
        (store, temp_dir)
    }

    fn sample_fingerprint() -> Fingerprint {
        use crate::fingerprint::fingerprint;
        use crate::request::RequestDescriptor;
        fingerprint(&RequestDescriptor::new(
            "GET",
            url::Url::parse("http://example.com").unwrap(),
        ))
    }

    fn sample_entry() -> CacheEntry {
        CacheEntry {
            created_at: Utc::now(),
            status: 200,
            headers: vec![
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("Set-Cookie".to_string(), "a=1".to_string()),
                ("Set-Cookie".to_string(), "b=2".to_string()),
            ],
            body: b"hello".to_vec(),
        }
    }

    #[test]
    fn test_load_returns_none_for_missing_entry() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.load(&sample_fingerprint()).is_none());
        assert!(store.last_modified(&sample_fingerprint()).is_none());
    }

    #[test]
    fn test_round_trip_preserves_entry_byte_for_byte() {
        let (store, _temp_dir) = create_test_store();
        let fp = sample_fingerprint();
        let entry = sample_entry();

        store.save(&fp, &entry).expect("save should succeed");
        let loaded = store.load(&fp).expect("entry should load back");

        assert_eq!(loaded.status, entry.status);
        assert_eq!(loaded.headers, entry.headers);
        assert_eq!(loaded.body, entry.body);
    }

    #[test]
    fn test_entry_path_is_sharded_by_prefix() {
        let (store, temp_dir) = create_test_store();
        let fp = sample_fingerprint();
        let path = store.entry_path(&fp);

        let shard = temp_dir.path().join(&fp.as_str()[..2]);
        assert_eq!(path.parent(), Some(shard.as_path()));
    }

    #[test]
    fn test_save_overwrites_in_full() {
        let (store, _temp_dir) = create_test_store();
        let fp = sample_fingerprint();

        store.save(&fp, &sample_entry()).unwrap();
        let replacement = CacheEntry {
            created_at: Utc::now(),
            status: 404,
            headers: vec![],
            body: b"gone".to_vec(),
        };
        store.save(&fp, &replacement).unwrap();

        let loaded = store.load(&fp).unwrap();
        assert_eq!(loaded.status, 404);
        assert_eq!(loaded.headers, Vec::new());
        assert_eq!(loaded.body, b"gone");
    }

    #[test]
    fn test_corrupt_metadata_reads_as_absent() {
        let (store, _temp_dir) = create_test_store();
        let fp = sample_fingerprint();
        store.save(&fp, &sample_entry()).unwrap();

        fs::write(store.entry_path(&fp), b"{not json").unwrap();
        assert!(store.load(&fp).is_none());
        assert!(store.last_modified(&fp).is_none());
    }

    #[test]
    fn test_truncated_body_reads_as_absent() {
        let (store, _temp_dir) = create_test_store();
        let fp = sample_fingerprint();
        store.save(&fp, &sample_entry()).unwrap();

        fs::write(store.body_path(&fp), b"he").unwrap();
        assert!(store.load(&fp).is_none());
    }

    #[test]
    fn test_replacement_body_without_its_metadata_reads_as_absent() {
        // A rewrite renames the body in before the metadata. A reader in
        // that window must not pair the new body with the old metadata,
        // even when the two bodies have the same length.
        let (store, _temp_dir) = create_test_store();
        let fp = sample_fingerprint();
        store.save(&fp, &sample_entry()).unwrap();

        fs::write(store.body_path(&fp), b"world").unwrap();
        assert!(store.load(&fp).is_none());
    }

    #[test]
    fn test_missing_body_reads_as_absent() {
        let (store, _temp_dir) = create_test_store();
        let fp = sample_fingerprint();
        store.save(&fp, &sample_entry()).unwrap();

        fs::remove_file(store.body_path(&fp)).unwrap();
        assert!(store.load(&fp).is_none());
    }

    #[test]
    fn test_last_modified_matches_created_at() {
        let (store, _temp_dir) = create_test_store();
        let fp = sample_fingerprint();
        let entry = sample_entry();
        store.save(&fp, &entry).unwrap();

        let probed = store.last_modified(&fp).unwrap();
        assert_eq!(probed, entry.created_at);
    }

    #[test]
    fn test_two_stores_on_same_root_share_entries() {
        let (store, temp_dir) = create_test_store();
        let fp = sample_fingerprint();
        store.save(&fp, &sample_entry()).unwrap();

        let other = Store::new(temp_dir.path());
        assert!(other.load(&fp).is_some());
    }

    #[test]
    fn test_empty_body_round_trips() {
        let (store, _temp_dir) = create_test_store();
        let fp = sample_fingerprint();
        let entry = CacheEntry {
            created_at: Utc::now(),
            status: 204,
            headers: vec![],
            body: Vec::new(),
        };
        store.save(&fp, &entry).unwrap();
        assert_eq!(store.load(&fp).unwrap().body, Vec::<u8>::new());
    }
}
