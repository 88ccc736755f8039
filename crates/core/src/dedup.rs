//! Render-request deduplication over a bounded time window.
//!
//! Identical requests (same template, same required-parameter values) that
//! arrive within the window collapse to the job id assigned to the first
//! one, so no duplicate downstream work is produced.

use std::sync::Arc;
use std::time::Duration;

use crate::kv::KvStore;
use crate::metrics::{DEDUP_HITS, DEDUP_MISSES};
use crate::template::ResolvedTemplate;

/// Deduplicates render requests against a TTL key-value store.
pub struct Deduplicator {
    cache: Arc<dyn KvStore>,
    window: Duration,
}

impl Deduplicator {
    pub fn new(cache: Arc<dyn KvStore>, window: Duration) -> Self {
        Self { cache, window }
    }

    /// Build the dedup key for a resolved request.
    ///
    /// Parameters appear in the template's declared order, so two requests
    /// with the same values in different submission order produce the same
    /// key.
    pub fn key(resolved: &ResolvedTemplate) -> String {
        let pairs: Vec<String> = resolved
            .required_params
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        format!("{}|{}", resolved.name, pairs.join("&"))
    }

    /// Return the job id previously registered for this request, if the
    /// window has not elapsed.
    pub fn lookup(&self, resolved: &ResolvedTemplate) -> Option<String> {
        let hit = self.cache.get(&Self::key(resolved));
        match &hit {
            Some(_) => DEDUP_HITS.inc(),
            None => DEDUP_MISSES.inc(),
        }
        hit
    }

    /// Register a job id for this request.
    ///
    /// Called only after the claim check is confirmed on the queue; a failed
    /// enqueue must never leave a dead reference in the window.
    pub fn register(&self, resolved: &ResolvedTemplate, job_id: &str) {
        self.cache.set(&Self::key(resolved), job_id, self.window);
    }
}
