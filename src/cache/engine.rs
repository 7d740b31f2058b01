//! Cache engine
//!
//! Orchestrates one request: fingerprint it, consult the store, and either
//! replay the cached response or invoke the performer and write the result
//! back. Every invocation is classified as `hit`, `miss`, `expired`, or
//! `forced` for observability.

use std::fmt;
use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::store::{CacheEntry, Store};
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::performer::{PerformError, Performer};
use crate::request::RequestDescriptor;
use crate::response::Response;

/// Freshness window for cached entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// An entry, once written, is a hit until forced
    #[default]
    Never,
    /// An entry older than this duration reads as expired
    After(std::time::Duration),
}

/// Per-call cache configuration, validated once at the CLI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CachePolicy {
    pub expires_in: Expiry,
    /// Bypass the freshness check and re-fetch, but still write the result
    /// back so future non-forced calls are fresh
    pub force: bool,
}

/// Outcome classification of one engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Valid entry found, no fetch performed
    Hit,
    /// No entry existed, fetch performed and stored
    Miss,
    /// Entry existed but was past its window, fetch performed and stored
    Expired,
    /// Entry was valid but `force` caused a re-fetch and overwrite
    Forced,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Expired => "expired",
            CacheStatus::Forced => "forced",
        };
        f.write_str(s)
    }
}

/// The result of a resolved request.
///
/// `store_error` reports a failed write-back: serving the response is the
/// primary contract and caching is a best-effort side effect, so the
/// response is delivered even when the disk write fails.
#[derive(Debug)]
pub struct Outcome {
    pub response: Response,
    pub status: CacheStatus,
    pub store_error: Option<std::io::Error>,
}

/// Errors from a resolving call. Failed fetches carry the status that would
/// have applied, so callers can tell "never cached" from "cached but
/// refresh failed". Nothing is cached on failure; a stale entry, if any, is
/// left untouched.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{source}")]
    Fetch {
        status: CacheStatus,
        #[source]
        source: PerformError,
    },
}

/// Decides between the store and the performer for each request.
#[derive(Debug)]
pub struct Engine<P: Performer> {
    store: Store,
    performer: P,
}

impl<P: Performer> Engine<P> {
    pub fn new(store: Store, performer: P) -> Self {
        Self { store, performer }
    }

    /// Where the cache entry for this request lives on disk.
    pub fn cache_path(&self, request: &RequestDescriptor) -> PathBuf {
        self.store.entry_path(&fingerprint(request))
    }

    /// Resolves a request: replay from the cache on a hit, otherwise invoke
    /// the performer and write the fresh response through.
    pub fn resolve(
        &self,
        request: &RequestDescriptor,
        policy: &CachePolicy,
    ) -> Result<Outcome, EngineError> {
        let key = fingerprint(request);
        let mut status = self.classify(&key, policy);

        if status == CacheStatus::Hit {
            match self.store.load(&key) {
                Some(entry) => {
                    debug!(%key, "cache hit");
                    return Ok(Outcome {
                        response: entry.into_response(),
                        status: CacheStatus::Hit,
                        store_error: None,
                    });
                }
                // Entry vanished or turned out corrupt between the probe
                // and the full read.
                None => status = CacheStatus::Miss,
            }
        }

        debug!(%key, %status, url = %request.url(), "fetching");
        let response = self
            .performer
            .perform(request)
            .map_err(|source| EngineError::Fetch { status, source })?;

        let entry = CacheEntry::from_response(&response, Utc::now());
        let store_error = self.store.save(&key, &entry).err();
        if let Some(err) = &store_error {
            warn!(%key, %err, "failed to write cache entry");
        }

        Ok(Outcome {
            response,
            status,
            store_error,
        })
    }

    /// Pure "what would happen" probe: classifies the request against the
    /// store without fetching and without mutating any entry.
    pub fn probe(&self, request: &RequestDescriptor, policy: &CachePolicy) -> CacheStatus {
        self.classify(&fingerprint(request), policy)
    }

    fn classify(&self, key: &Fingerprint, policy: &CachePolicy) -> CacheStatus {
        let Some(written_at) = self.store.last_modified(key) else {
            return CacheStatus::Miss;
        };
        if policy.force {
            return CacheStatus::Forced;
        }
        match policy.expires_in {
            Expiry::Never => CacheStatus::Hit,
            Expiry::After(window) => {
                if window.is_zero() {
                    return CacheStatus::Expired;
                }
                let age = Utc::now().signed_duration_since(written_at);
                match age.to_std() {
                    Ok(age) if age > window => CacheStatus::Expired,
                    // Negative age means clock skew; the entry is as fresh
                    // as it gets.
                    _ => CacheStatus::Hit,
                }
            }
        }
    }
}
