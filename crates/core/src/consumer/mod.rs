//! Claim-check job consumer.

mod runner;
mod types;

pub use runner::JobConsumer;
pub use types::ConsumerStatus;
