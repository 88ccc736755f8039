//! Claim-check queue: transport between the job submitter and the consumer.

mod memory;
mod traits;
mod types;

pub use memory::MemoryQueue;
pub use traits::{Delivery, JobQueue, QueueError};
pub use types::{ClaimCheck, ClaimCheckError, DeadLetter, QueueStatus};
