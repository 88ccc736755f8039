//! In-memory object store for tests and single-process deployments.

use super::traits::{ObjectStore, StoreError, StoredObject};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// `ObjectStore` backed by a mutex-guarded map.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().unwrap();
        objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
                metadata,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StoreError> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn metadata(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(key)
            .map(|o| o.metadata.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn compare_and_swap_metadata(
        &self,
        key: &str,
        field: &str,
        expected: &str,
        new: &str,
    ) -> Result<bool, StoreError> {
        let mut objects = self.objects.lock().unwrap();
        let object = objects
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        match object.metadata.get(field) {
            Some(current) if current == expected => {
                object.metadata.insert(field.to_string(), new.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
