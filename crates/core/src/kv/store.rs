//! Key-value store trait with TTL-on-write semantics.

use std::time::Duration;

/// Trait for TTL-scoped key-value backends.
///
/// Entries expire `ttl` after the write that created (or overwrote) them;
/// reads never refresh the expiry. `set_if_absent` is the only conditional
/// operation and must be atomic per key, so concurrent callers cannot both
/// observe the key as absent.
pub trait KvStore: Send + Sync {
    /// Get the live value for a key, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any existing entry and resetting its TTL.
    fn set(&self, key: &str, value: &str, ttl: Duration);

    /// Write a value only if no live entry exists for the key.
    ///
    /// Returns `true` if the write happened, `false` if a live entry was
    /// already present. Check and write are a single critical section.
    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> bool;
}
