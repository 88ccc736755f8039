//! Testing utilities and mock implementations for E2E tests.
//!
//! The in-memory `KvStore`, `JobQueue` and `ObjectStore` backends double as
//! their own test fakes; the renderer is the only collaborator that shells
//! out to real processes, so it gets a dedicated mock here.

mod mock_renderer;

pub use mock_renderer::{MockRenderer, RecordedRender};
