//! Object storage: render payloads in, finished artifacts out.

mod memory;
mod traits;

pub use memory::MemoryObjectStore;
pub use traits::{ObjectStore, StoreError, StoredObject};
