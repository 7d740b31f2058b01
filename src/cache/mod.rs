//! Disk-backed request/response cache
//!
//! The store maps request fingerprints to persisted entries on disk; the
//! engine decides, per invocation, whether to replay a cached response or
//! fetch and write through. Corrupt or missing entries always degrade to a
//! miss rather than failing the caller.

mod engine;
mod store;

pub use engine::{CachePolicy, CacheStatus, Engine, EngineError, Expiry, Outcome};
pub use store::{CacheEntry, Store};
