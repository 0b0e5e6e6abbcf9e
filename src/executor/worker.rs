// worker thread loop
use super::pool::Shared;
use super::slot::Slot;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use tracing::{error, trace};

pub(crate) type WorkerId = usize;

pub(crate) struct Worker {
    id: WorkerId,
    shared: Arc<Shared>,
}

impl Worker {
    pub(crate) fn new(id: WorkerId, shared: Arc<Shared>) -> Self {
        Self { id, shared }
    }

    // main loop
    pub(crate) fn run(&self) {
        loop {
            {
                let mut guard = self.shared.lock.lock();
                while self.shared.enabled.load(Ordering::Acquire) && self.shared.work.is_empty() {
                    self.shared.wake.wait(&mut guard);
                }
            }
            if !self.shared.enabled.load(Ordering::Acquire) {
                break;
            }
            self.drain();
        }
        trace!(worker = self.id, "worker thread exiting");
    }

    /// One drain pass: pop slots until the work queue reports empty,
    /// requeueing any slot whose gate has not resolved yet.
    fn drain(&self) {
        let shared = &*self.shared;
        shared.active.fetch_add(1, Ordering::AcqRel);

        let mut misses = 0u32;
        while let Some(mut slot) = shared.work.pop() {
            if slot.eligible() {
                misses = 0;
                self.execute_slot(&slot);
                slot.release();
                // both queues hold every slot, so this push cannot fail
                let _ = shared.stock.push(slot);
            } else {
                // gate unresolved: spin the slot back to the tail
                let _ = shared.work.push(slot);
                if !shared.enabled.load(Ordering::Acquire) {
                    // shutting down with the gate still held; abandon the pass
                    break;
                }
                self.gate_backoff(&mut misses);
            }
        }

        shared.active.fetch_sub(1, Ordering::AcqRel);
        if shared.active.load(Ordering::Acquire) == 0 && shared.work.is_empty() {
            // batch drained; notify under the lock so `wait` cannot miss it
            let _guard = shared.lock.lock();
            shared.drained.notify_all();
        }
    }

    /// Runs the bound task, containing panics, then decrements its
    /// completion counter. The counter is decremented even when the task
    /// panics so the batch cannot wedge `wait`.
    fn execute_slot(&self, slot: &Slot) {
        if let Some(task) = slot.task() {
            if catch_unwind(AssertUnwindSafe(|| task.run())).is_err() {
                self.shared.panics.fetch_add(1, Ordering::Relaxed);
                error!(worker = self.id, task = slot.name(), "task panicked");
            }
        }
        slot.complete();
    }

    // nothing runnable at the head of the queue; spin, then yield
    fn gate_backoff(&self, misses: &mut u32) {
        const MAX_SPINS: u32 = 6;

        *misses += 1;
        if *misses <= MAX_SPINS {
            for _ in 0..(1u32 << *misses) {
                std::hint::spin_loop();
            }
        } else {
            thread::yield_now();
        }
    }
}
