//! Time-windowed key-value store used for the replay and dedup caches.

mod memory;
mod store;

pub use memory::MemoryKvStore;
pub use store::KvStore;
