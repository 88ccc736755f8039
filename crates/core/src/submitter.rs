//! Render job submission: the claim-check producer side.
//!
//! Renders the template's HTML up front, parks it in the payload store and
//! publishes a small claim-check message for the consumer. The dedup window
//! is only written after the queue has confirmed the message, so a failed
//! enqueue never leaves a dangling job id behind.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::dedup::Deduplicator;
use crate::metrics::JOBS_QUEUED;
use crate::payload;
use crate::queue::{ClaimCheck, JobQueue};
use crate::renderer::{RenderError, Renderer};
use crate::store::ObjectStore;
use crate::template::{TemplateError, TemplateRegistry};

/// Errors surfaced to the submission endpoint.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to stage payload: {0}")]
    Storage(String),

    #[error("Queue unavailable: {0}")]
    QueueUnavailable(String),
}

/// Outcome of a submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub job_id: String,
    /// True when the job id was answered from the dedup window.
    pub deduped: bool,
}

/// Accepts render requests and turns them into queued jobs.
pub struct JobSubmitter {
    registry: Arc<TemplateRegistry>,
    dedup: Deduplicator,
    renderer: Arc<dyn Renderer>,
    payload_store: Arc<dyn ObjectStore>,
    queue: Arc<dyn JobQueue>,
}

impl JobSubmitter {
    pub fn new(
        registry: Arc<TemplateRegistry>,
        dedup: Deduplicator,
        renderer: Arc<dyn Renderer>,
        payload_store: Arc<dyn ObjectStore>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            registry,
            dedup,
            renderer,
            payload_store,
            queue,
        }
    }

    /// Submit a render request on behalf of an authenticated user.
    ///
    /// An identical in-window request returns the original job id without
    /// touching the renderer, store or queue.
    pub async fn submit(
        &self,
        template: &str,
        params: &HashMap<String, String>,
        user_id: &str,
    ) -> Result<SubmitOutcome, SubmitError> {
        let resolved = self.registry.resolve(template, params)?;

        if let Some(job_id) = self.dedup.lookup(&resolved) {
            tracing::info!(template = %template, job_id = %job_id, "Duplicate submission collapsed");
            return Ok(SubmitOutcome {
                job_id,
                deduped: true,
            });
        }

        let job_id = Uuid::new_v4().to_string();

        let html = self
            .renderer
            .render_html(&resolved.script, &resolved.required_params)
            .await?;

        let packed = payload::compress(&html).map_err(|e| SubmitError::Storage(e.to_string()))?;
        let payload_location = format!("{}.html.gz", job_id);
        self.payload_store
            .put(
                &payload_location,
                packed,
                "application/gzip",
                HashMap::from([("owner".to_string(), user_id.to_string())]),
            )
            .await
            .map_err(|e| SubmitError::Storage(e.to_string()))?;

        let claim_check = ClaimCheck {
            job_id: job_id.clone(),
            template: resolved.name.clone(),
            payload_location,
            compressed: true,
            user_id: user_id.to_string(),
            file_name: resolved.file_name(),
        };
        self.queue
            .send(claim_check.to_json())
            .await
            .map_err(|e| SubmitError::QueueUnavailable(e.to_string()))?;

        JOBS_QUEUED.inc();
        // Registered only now: the claim check is on the queue.
        self.dedup.register(&resolved, &job_id);

        tracing::info!(template = %template, job_id = %job_id, user_id = %user_id, "Render job queued");
        Ok(SubmitOutcome {
            job_id,
            deduped: false,
        })
    }
}
