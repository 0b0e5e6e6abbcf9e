//! gatework — a dependency-aware worker thread pool.
//!
//! A fixed number of task slots circulate between a stock (free) queue and
//! a work queue. Worker threads drain the work queue on demand, honoring
//! per-task gate counters, and callers block on [`WorkerPool::wait`] until
//! an entire submitted batch has finished.
//!
//! Dependencies are expressed with shared atomic [`Counter`]s rather than
//! graph edges: each task in a batch decrements a completion counter when
//! it finishes, and a downstream task *gated* on that counter becomes
//! eligible only once it drains to zero. This covers the intended shape
//! ("run these N, then run this one") without a general DAG scheduler.
//!
//! # Quick Start
//!
//! ```no_run
//! use gatework::{Chain, Counter, Submission, WorkerPool};
//! use std::sync::Arc;
//!
//! let pool = WorkerPool::with_capacity(1024, 4).unwrap();
//!
//! // fan out a counted batch
//! let batch = Arc::new(Counter::new(0));
//! for i in 0..8 {
//!     batch.increment();
//!     pool.submit(Submission::from_fn(move || println!("task {i}")).counted(&batch))
//!         .unwrap();
//! }
//!
//! // one downstream task, gated on the batch
//! let tick = Arc::new(Counter::new(0));
//! Chain::from_fn("join", || println!("batch done"))
//!     .attach_gated(&batch, &pool, &tick)
//!     .unwrap();
//!
//! pool.execute();
//! pool.wait();
//! pool.stop();
//! ```
//!
//! # What the pool does not do
//!
//! No cancellation or timeouts, no FIFO ordering guarantee among eligible
//! tasks, and no synchronization of user task state: counters order
//! *eligibility*, nothing else. A task popped by a worker always runs to
//! completion.

#![warn(missing_docs, missing_debug_implementations)]

pub mod chain;
pub mod config;
pub mod counter;
pub mod error;
pub mod executor;
pub mod prelude;

pub use chain::Chain;
pub use config::{Config, ConfigBuilder};
pub use counter::Counter;
pub use error::{Error, Result};
pub use executor::{Submission, Task, WorkerPool};
