//! In-memory queue with redelivery and dead-letter semantics.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::traits::{Delivery, JobQueue, QueueError};
use super::types::{DeadLetter, QueueStatus};

#[derive(Debug, Clone)]
struct QueuedMessage {
    body: String,
    delivery_count: u32,
}

#[derive(Default)]
struct QueueState {
    ready: VecDeque<QueuedMessage>,
    dead: Vec<DeadLetter>,
}

/// In-process `JobQueue`.
///
/// Abandoned messages go back to the tail with their delivery count intact;
/// a message abandoned at `max_delivery_count` deliveries is dead-lettered
/// instead of redelivered.
pub struct MemoryQueue {
    state: Arc<Mutex<QueueState>>,
    max_delivery_count: u32,
}

impl MemoryQueue {
    pub fn new(max_delivery_count: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::default())),
            max_delivery_count,
        }
    }
}

struct MemoryDelivery {
    state: Arc<Mutex<QueueState>>,
    body: String,
    delivery_count: u32,
    max_delivery_count: u32,
}

#[async_trait]
impl Delivery for MemoryDelivery {
    fn body(&self) -> &str {
        &self.body
    }

    fn delivery_count(&self) -> u32 {
        self.delivery_count
    }

    async fn ack(self: Box<Self>) -> Result<(), QueueError> {
        // Message was removed from the ready list on receive; nothing to do.
        Ok(())
    }

    async fn abandon(self: Box<Self>, reason: &str) -> Result<(), QueueError> {
        let mut state = self.state.lock().map_err(|_| QueueError::Closed)?;
        if self.delivery_count >= self.max_delivery_count {
            warn!(
                "Message exceeded max delivery count ({}), dead-lettering: {}",
                self.max_delivery_count, reason
            );
            state.dead.push(DeadLetter {
                body: self.body,
                reason: reason.to_string(),
                delivery_count: self.delivery_count,
            });
        } else {
            debug!(
                "Abandoning message for redelivery (delivery {} of {}): {}",
                self.delivery_count, self.max_delivery_count, reason
            );
            state.ready.push_back(QueuedMessage {
                body: self.body,
                delivery_count: self.delivery_count,
            });
        }
        Ok(())
    }

    async fn dead_letter(self: Box<Self>, reason: &str) -> Result<(), QueueError> {
        let mut state = self.state.lock().map_err(|_| QueueError::Closed)?;
        state.dead.push(DeadLetter {
            body: self.body,
            reason: reason.to_string(),
            delivery_count: self.delivery_count,
        });
        Ok(())
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn send(&self, body: String) -> Result<(), QueueError> {
        let mut state = self.state.lock().map_err(|_| QueueError::Closed)?;
        state.ready.push_back(QueuedMessage {
            body,
            delivery_count: 0,
        });
        Ok(())
    }

    async fn receive(&self) -> Result<Option<Box<dyn Delivery>>, QueueError> {
        let mut state = self.state.lock().map_err(|_| QueueError::Closed)?;
        let Some(mut message) = state.ready.pop_front() else {
            return Ok(None);
        };
        message.delivery_count += 1;

        Ok(Some(Box::new(MemoryDelivery {
            state: Arc::clone(&self.state),
            body: message.body,
            delivery_count: message.delivery_count,
            max_delivery_count: self.max_delivery_count,
        })))
    }

    async fn status(&self) -> QueueStatus {
        let state = self.state.lock().unwrap();
        QueueStatus {
            queued: state.ready.len(),
            dead_lettered: state.dead.len(),
        }
    }

    async fn dead_letters(&self) -> Vec<DeadLetter> {
        self.state.lock().unwrap().dead.clone()
    }
}
