//! Fan-out/join convenience built on shared completion counters.

use crate::counter::Counter;
use crate::error::Result;
use crate::executor::{Submission, Task, WorkerPool};
use std::fmt;
use std::sync::Arc;

/// A named task that chains itself onto a shared counter when submitted.
///
/// `attach` increments the completion counter before submitting, so a
/// downstream task gated on the same counter becomes eligible only after
/// every attached task has finished. This is the building block for
/// fan-out-then-join batches: siblings attach with a shared counter, the
/// join task attaches gated on it.
///
/// An attached task may start running before `attach` returns if worker
/// threads are already draining.
pub struct Chain {
    name: String,
    task: Arc<dyn Task>,
}

impl Chain {
    pub fn new<S: Into<String>>(name: S, task: Arc<dyn Task>) -> Self {
        Self {
            name: name.into(),
            task,
        }
    }

    pub fn from_fn<S, F>(name: S, f: F) -> Self
    where
        S: Into<String>,
        F: Fn() + Send + Sync + 'static,
    {
        Self::new(name, Arc::new(f))
    }

    pub fn unnamed(task: Arc<dyn Task>) -> Self {
        Self::new("NONAME", task)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Increments `completion` and submits the task ungated.
    pub fn attach(&self, pool: &WorkerPool, completion: &Arc<Counter>) -> Result<()> {
        self.submit(pool, completion, None)
    }

    /// Increments `completion` and submits the task gated on `gate`: it
    /// will not run until every task decrementing `gate` has completed.
    pub fn attach_gated(
        &self,
        gate: &Arc<Counter>,
        pool: &WorkerPool,
        completion: &Arc<Counter>,
    ) -> Result<()> {
        self.submit(pool, completion, Some(gate))
    }

    fn submit(
        &self,
        pool: &WorkerPool,
        completion: &Arc<Counter>,
        gate: Option<&Arc<Counter>>,
    ) -> Result<()> {
        completion.increment();

        let mut submission = Submission::new(self.task.clone())
            .counted(completion)
            .named(self.name.clone());
        if let Some(gate) = gate {
            submission = submission.gated(gate);
        }

        match pool.submit(submission) {
            Ok(()) => Ok(()),
            Err(e) => {
                // undo the increment so a failed attach cannot wedge a
                // task gated on this counter
                completion.decrement();
                Err(e)
            }
        }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("name", &self.name).finish()
    }
}
