//! Task execution infrastructure.
//!
//! The worker pool, its recycled task slots, and the counter-gated work
//! queue they circulate through.

pub mod pool;
pub mod task;

mod slot;
mod worker;

pub use pool::WorkerPool;
pub use task::{Submission, Task};
