//! Shared cache substrate used by both cache tiers.
//!
//! The substrate is a flat, process-wide key space with optional per-entry
//! expiry. It offers no transactions: callers invalidate after they commit,
//! and readers in between may observe the previous value.

mod memory;

use std::time::Duration;

pub use memory::MemoryCache;

/// A shared key-value cache with optional expiry.
pub trait CacheBackend: Send + Sync {
    /// Fetch a live entry. Expired entries read as absent.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store an entry. `None` keeps it until deleted.
    fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>);

    /// Remove an entry, returning whether one was present.
    fn delete(&self, key: &str) -> bool;

    /// Remove every entry.
    fn flush(&self);
}
