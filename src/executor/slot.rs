use super::task::{Submission, Task};
use crate::counter::Counter;
use std::fmt;
use std::sync::Arc;

/// A recyclable container binding one task to its counters for the
/// duration of one submission.
///
/// Every slot is in exactly one place at any instant: the stock queue
/// (vacant), the work queue (pending or gate-blocked), or held by a worker
/// (executing). The total number of slots is fixed at pool construction.
pub(crate) struct Slot {
    task: Option<Arc<dyn Task>>,
    completion: Option<Arc<Counter>>,
    gate: Option<Arc<Counter>>,
    name: Option<String>,
}

impl Slot {
    pub(crate) fn vacant() -> Self {
        Self {
            task: None,
            completion: None,
            gate: None,
            name: None,
        }
    }

    pub(crate) fn bind(&mut self, submission: Submission) {
        self.task = Some(submission.task);
        self.completion = submission.completion;
        self.gate = submission.gate;
        self.name = submission.name;
    }

    /// Drops the task and counter handles so the slot can return to stock.
    pub(crate) fn release(&mut self) {
        self.task = None;
        self.completion = None;
        self.gate = None;
        self.name = None;
    }

    /// Eligible when no gate is set or the gate has drained to ≤ 0.
    pub(crate) fn eligible(&self) -> bool {
        self.gate.as_ref().map_or(true, |gate| gate.is_settled())
    }

    pub(crate) fn task(&self) -> Option<&Arc<dyn Task>> {
        self.task.as_ref()
    }

    /// Decrements the completion counter, if one was attached.
    pub(crate) fn complete(&self) {
        if let Some(completion) = &self.completion {
            completion.decrement();
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("occupied", &self.task.is_some())
            .field("gated", &self.gate.is_some())
            .finish()
    }
}
