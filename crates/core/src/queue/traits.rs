//! Queue transport traits.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{DeadLetter, QueueStatus};

/// Error type for queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Transport rejected or lost the operation.
    #[error("Queue unavailable: {0}")]
    Unavailable(String),

    /// Queue has been shut down.
    #[error("Queue is closed")]
    Closed,
}

/// A single received message.
///
/// The receiver owns the message until it settles it exactly once: `ack`
/// on success, `abandon` to hand it back for redelivery, or `dead_letter`
/// for messages redelivery cannot fix. Retry policy lives in the transport;
/// consumers only decide retryable vs. not.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Raw message body.
    fn body(&self) -> &str;

    /// How many times this message has been delivered, this delivery
    /// included.
    fn delivery_count(&self) -> u32;

    /// Settle the message as successfully processed.
    async fn ack(self: Box<Self>) -> Result<(), QueueError>;

    /// Return the message for redelivery. The transport dead-letters it
    /// instead once the max delivery count is exhausted.
    async fn abandon(self: Box<Self>, reason: &str) -> Result<(), QueueError>;

    /// Settle the message as permanently unprocessable.
    async fn dead_letter(self: Box<Self>, reason: &str) -> Result<(), QueueError>;
}

/// Trait for claim-check queue backends.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Publish a message body.
    async fn send(&self, body: String) -> Result<(), QueueError>;

    /// Receive the next message, if any is ready.
    async fn receive(&self) -> Result<Option<Box<dyn Delivery>>, QueueError>;

    /// Current queue counters.
    async fn status(&self) -> QueueStatus;

    /// Dead-lettered messages, for manual inspection.
    async fn dead_letters(&self) -> Vec<DeadLetter>;
}
