//! The task capability and the submission descriptor.

use crate::counter::Counter;
use std::fmt;
use std::sync::Arc;

/// A runnable unit of work.
///
/// `run` takes no inputs and returns nothing; all effects happen through
/// state captured or owned by the task instance. A task may be invoked
/// from a different worker thread on every invocation, and the pool
/// provides no re-entrancy guarantee: tasks touching shared state must
/// synchronize it themselves.
pub trait Task: Send + Sync {
    fn run(&self);
}

/// Any `Fn()` closure is a task.
impl<F> Task for F
where
    F: Fn() + Send + Sync,
{
    fn run(&self) {
        self()
    }
}

/// One submission to the pool: a task plus its optional counters and a
/// diagnostic name.
///
/// The plain form is ungated and uncounted; `counted` attaches a
/// completion counter (decremented once when the task finishes), `gated`
/// holds the task until the given counter drains to ≤ 0.
pub struct Submission {
    pub(crate) task: Arc<dyn Task>,
    pub(crate) completion: Option<Arc<Counter>>,
    pub(crate) gate: Option<Arc<Counter>>,
    pub(crate) name: Option<String>,
}

impl Submission {
    pub fn new(task: Arc<dyn Task>) -> Self {
        Self {
            task,
            completion: None,
            gate: None,
            name: None,
        }
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::new(Arc::new(f))
    }

    pub fn counted(mut self, completion: &Arc<Counter>) -> Self {
        self.completion = Some(completion.clone());
        self
    }

    pub fn gated(mut self, gate: &Arc<Counter>) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    pub fn named<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Debug for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submission")
            .field("name", &self.name)
            .field("counted", &self.completion.is_some())
            .field("gated", &self.gate.is_some())
            .finish()
    }
}
