//! Object store trait and types.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Error type for object store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No object under the given key.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Backend failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A stored object with its content type and free-form metadata.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
}

/// Trait for object storage backends.
///
/// Keys address independent objects; conflicting writes to distinct keys
/// never interact. `compare_and_swap_metadata` is the single atomic
/// conditional operation, used to close check-then-set races on metadata
/// flags under concurrent readers.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object, replacing any existing one under the key.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), StoreError>;

    /// Fetch an object.
    async fn get(&self, key: &str) -> Result<StoredObject, StoreError>;

    /// Fetch only an object's metadata.
    async fn metadata(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    /// Whether an object exists under the key.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Atomically set `field` to `new` if its current value equals
    /// `expected` (an absent field never matches).
    ///
    /// Returns `true` if the swap happened, `false` if the current value
    /// did not match. Exactly one of N concurrent callers with the same
    /// `expected` wins.
    async fn compare_and_swap_metadata(
        &self,
        key: &str,
        field: &str,
        expected: &str,
        new: &str,
    ) -> Result<bool, StoreError>;
}
