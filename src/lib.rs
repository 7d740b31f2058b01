//! recurl library
//!
//! A curl-like HTTP client whose request/response exchanges are memoized to
//! disk. Exposed as a library so integration tests can drive the cache
//! engine directly.

pub mod cache;
pub mod cli;
pub mod duration;
pub mod fingerprint;
pub mod performer;
pub mod request;
pub mod response;
