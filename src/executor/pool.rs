use super::slot::Slot;
use super::task::Submission;
use super::worker::{Worker, WorkerId};
use crate::config::Config;
use crate::error::{Error, Result};
use crossbeam_queue::ArrayQueue;
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, trace};

/// State shared between the pool handle and its worker threads.
pub(crate) struct Shared {
    /// Slots pending or blocked execution.
    pub(crate) work: ArrayQueue<Slot>,
    /// Vacant slots awaiting reuse.
    pub(crate) stock: ArrayQueue<Slot>,
    pub(crate) enabled: AtomicBool,
    /// Number of workers currently inside a drain pass.
    pub(crate) active: AtomicUsize,
    pub(crate) panics: AtomicUsize,
    pub(crate) lock: Mutex<()>,
    /// Signaled by `execute` (and `stop`) to wake parked workers.
    pub(crate) wake: Condvar,
    /// Signaled when no worker is active and the work queue is empty.
    pub(crate) drained: Condvar,
}

/// A fixed-size pool of worker threads draining counter-gated tasks.
///
/// `slot_capacity` slots circulate between a stock queue and a work
/// queue; submission moves a slot from stock to work, completion moves it
/// back. Workers park until [`execute`](Self::execute) wakes them, then
/// drain the work queue, requeueing any slot whose gate counter is still
/// above zero. [`wait`](Self::wait) blocks until the current batch has
/// fully drained.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<WorkerHandle>>,
    num_threads: usize,
    capacity: usize,
}

struct WorkerHandle {
    id: WorkerId,
    thread: Option<JoinHandle<()>>,
}

impl WorkerPool {
    /// Preallocates `slot_capacity` slots and starts the worker threads,
    /// initially enabled.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();
        let capacity = config.slot_capacity;

        let shared = Arc::new(Shared {
            work: ArrayQueue::new(capacity),
            stock: ArrayQueue::new(capacity),
            enabled: AtomicBool::new(true),
            active: AtomicUsize::new(0),
            panics: AtomicUsize::new(0),
            lock: Mutex::new(()),
            wake: Condvar::new(),
            drained: Condvar::new(),
        });

        for _ in 0..capacity {
            let _ = shared.stock.push(Slot::vacant());
        }

        let mut workers = Vec::with_capacity(num_threads);

        for id in 0..num_threads {
            let worker = Worker::new(id, shared.clone());
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let thread = match builder.spawn(move || worker.run()) {
                Ok(thread) => thread,
                Err(e) => {
                    Self::halt(&shared, &mut workers);
                    return Err(Error::executor(format!("spawn failed: {}", e)));
                }
            };

            workers.push(WorkerHandle {
                id,
                thread: Some(thread),
            });
        }

        debug!(threads = num_threads, capacity, "worker pool started");

        Ok(Self {
            shared,
            workers: Mutex::new(workers),
            num_threads,
            capacity,
        })
    }

    /// Convenience constructor taking just the two sizing knobs.
    pub fn with_capacity(slot_capacity: usize, num_threads: usize) -> Result<Self> {
        let config = Config::builder()
            .slot_capacity(slot_capacity)
            .num_threads(num_threads)
            .build()?;
        Self::new(&config)
    }

    /// Submits a task for execution.
    ///
    /// The task is queued immediately and may start running right away if
    /// worker threads are already draining; otherwise it runs after the
    /// next [`execute`](Self::execute) call.
    ///
    /// Fails with [`Error::Saturated`] when no slot is free and with
    /// [`Error::Terminated`] after [`stop`](Self::stop); neither failure
    /// disturbs queued work.
    pub fn submit(&self, submission: Submission) -> Result<()> {
        if !self.shared.enabled.load(Ordering::Acquire) {
            return Err(Error::Terminated);
        }

        let mut slot = self.shared.stock.pop().ok_or(Error::Saturated)?;
        trace!(task = submission.name.as_deref().unwrap_or(""), "task queued");
        slot.bind(submission);
        // both queues hold every slot, so this push cannot fail
        let _ = self.shared.work.push(slot);
        Ok(())
    }

    /// Wakes all worker threads to begin draining the work queue.
    ///
    /// May be called once per logical tick; threads are not restarted.
    pub fn execute(&self) {
        // notify under the lock so a worker between its predicate check
        // and its sleep cannot miss the wake
        let _guard = self.shared.lock.lock();
        self.shared.wake.notify_all();
    }

    /// Blocks until no worker is active and the work queue is empty.
    ///
    /// A one-shot barrier, reusable every tick. Tasks still occupy their
    /// slots while running, so returning here means the whole batch has
    /// finished, not merely been dequeued.
    pub fn wait(&self) {
        let shared = &self.shared;
        let mut guard = shared.lock.lock();
        while shared.active.load(Ordering::Acquire) != 0 || !shared.work.is_empty() {
            shared.drained.wait(&mut guard);
        }
    }

    /// Disables the pool, wakes parked workers so they observe the
    /// disabled flag, and joins all worker threads. Terminal: the pool
    /// cannot be restarted, and later submissions fail with
    /// [`Error::Terminated`].
    ///
    /// Tasks submitted concurrently with `stop` are not guaranteed to
    /// run; the queue is abandoned, not drained.
    pub fn stop(&self) {
        let was_enabled = self.shared.enabled.swap(false, Ordering::AcqRel);
        self.execute();

        let mut workers = self.workers.lock();
        for handle in workers.iter_mut() {
            if let Some(thread) = handle.thread.take() {
                let _ = thread.join();
                trace!(worker = handle.id, "worker thread joined");
            }
        }

        if was_enabled {
            info!("worker pool stopped");
        }
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Total number of slots, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently available for submission.
    pub fn free_slots(&self) -> usize {
        self.shared.stock.len()
    }

    /// Slots pending or blocked in the work queue.
    pub fn queued(&self) -> usize {
        self.shared.work.len()
    }

    /// Number of task panics contained by the workers so far.
    pub fn panic_count(&self) -> usize {
        self.shared.panics.load(Ordering::Relaxed)
    }

    fn halt(shared: &Arc<Shared>, workers: &mut Vec<WorkerHandle>) {
        shared.enabled.store(false, Ordering::Release);
        {
            let _guard = shared.lock.lock();
            shared.wake.notify_all();
        }
        for handle in workers.iter_mut() {
            if let Some(thread) = handle.thread.take() {
                let _ = thread.join();
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_threads", &self.num_threads)
            .field("capacity", &self.capacity)
            .field("queued", &self.queued())
            .field("free_slots", &self.free_slots())
            .finish()
    }
}
