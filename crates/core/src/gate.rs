//! Single-download artifact gate.
//!
//! An artifact can be fetched exactly once, by its owner. The `downloaded`
//! flag flips through a compare-and-swap before any bytes leave the store,
//! so two racing requests for the same artifact produce one delivery and
//! one `Gone`.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::metrics::ARTIFACT_DOWNLOADS;
use crate::store::{ObjectStore, StoreError};

/// Errors surfaced to the download endpoint, in check order.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Artifact belongs to a different user")]
    Forbidden,

    #[error("Artifact has already been downloaded")]
    Gone,

    #[error("Storage error: {0}")]
    Storage(String),
}

/// An artifact released by the gate.
#[derive(Debug)]
pub struct ReleasedArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// Gates artifact downloads: exists, then owner, then downloaded.
pub struct ArtifactGate {
    artifact_store: Arc<dyn ObjectStore>,
}

impl ArtifactGate {
    pub fn new(artifact_store: Arc<dyn ObjectStore>) -> Self {
        Self { artifact_store }
    }

    /// Release the artifact for `job_id` to `user_id`, once.
    pub async fn release(&self, job_id: &str, user_id: &str) -> Result<ReleasedArtifact, GateError> {
        let key = format!("{}.pdf", job_id);

        let metadata = match self.artifact_store.metadata(&key).await {
            Ok(metadata) => metadata,
            Err(StoreError::NotFound(_)) => {
                ARTIFACT_DOWNLOADS.with_label_values(&["not_found"]).inc();
                return Err(GateError::NotFound(job_id.to_string()));
            }
            Err(e) => return Err(GateError::Storage(e.to_string())),
        };

        // Ownership is checked before download state so a foreign caller
        // learns nothing about whether the artifact was fetched.
        if metadata.get("owner").map(String::as_str) != Some(user_id) {
            ARTIFACT_DOWNLOADS.with_label_values(&["forbidden"]).inc();
            return Err(GateError::Forbidden);
        }

        let swapped = self
            .artifact_store
            .compare_and_swap_metadata(&key, "downloaded", "false", "true")
            .await
            .map_err(|e| GateError::Storage(e.to_string()))?;
        if !swapped {
            ARTIFACT_DOWNLOADS.with_label_values(&["gone"]).inc();
            return Err(GateError::Gone);
        }

        let object = self
            .artifact_store
            .get(&key)
            .await
            .map_err(|e| GateError::Storage(e.to_string()))?;

        let file_name = object
            .metadata
            .get("filename")
            .cloned()
            .unwrap_or_else(|| key.clone());

        ARTIFACT_DOWNLOADS.with_label_values(&["delivered"]).inc();
        info!(job_id = %job_id, user_id = %user_id, "Artifact released");

        Ok(ReleasedArtifact {
            bytes: object.bytes,
            file_name,
        })
    }
}
