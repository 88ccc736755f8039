//! Consumer status types.

use serde::Serialize;

use crate::queue::QueueStatus;

/// Point-in-time view of the consumer and its queue.
#[derive(Debug, Clone, Serialize)]
pub struct ConsumerStatus {
    pub running: bool,
    pub active_jobs: usize,
    pub max_concurrency: usize,
    pub total_processed: u64,
    pub total_failed: u64,
    pub queue: QueueStatus,
}
