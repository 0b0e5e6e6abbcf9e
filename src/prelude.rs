//! Convenience re-exports of the crate's public surface.

pub use crate::chain::Chain;
pub use crate::config::{Config, ConfigBuilder};
pub use crate::counter::Counter;
pub use crate::error::{Error, Result};
pub use crate::executor::{Submission, Task, WorkerPool};
