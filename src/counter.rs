//! Shared atomic counters: the only cross-task synchronization signal.

use std::sync::atomic::{AtomicI32, Ordering};

/// A 32-bit signed counter shared between submitters and the pool.
///
/// Counters play two roles. A *completion counter* is incremented once per
/// task submitted in a batch and decremented exactly once when that task
/// finishes running. A *gating counter* holds a task back: the task is
/// eligible to run only while the counter is ≤ 0.
///
/// The pool never creates or destroys counters; callers allocate one per
/// logical batch (typically `Arc::new(Counter::new(0))`) and hand out
/// clones of the handle.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicI32,
}

impl Counter {
    pub const fn new(value: i32) -> Self {
        Self {
            value: AtomicI32::new(value),
        }
    }

    pub fn set(&self, value: i32) {
        self.value.store(value, Ordering::Release);
    }

    /// Adds one and returns the updated value.
    pub fn increment(&self) -> i32 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Subtracts one and returns the updated value.
    ///
    /// The decrement publishes with Release ordering, pairing with the
    /// Acquire load in [`get`](Self::get): a task gated on this counter
    /// observes all writes made by the tasks that drained it.
    pub fn decrement(&self) -> i32 {
        self.value.fetch_sub(1, Ordering::AcqRel) - 1
    }

    pub fn get(&self) -> i32 {
        self.value.load(Ordering::Acquire)
    }

    /// True once the counter has drained to zero or below.
    pub fn is_settled(&self) -> bool {
        self.get() <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_basic() {
        let counter = Counter::new(0);
        assert_eq!(counter.get(), 0);
        assert!(counter.is_settled());

        counter.set(3);
        assert_eq!(counter.get(), 3);
        assert!(!counter.is_settled());
    }

    #[test]
    fn test_increment_decrement() {
        let counter = Counter::new(0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.decrement(), 1);
        assert_eq!(counter.decrement(), 0);
        assert!(counter.is_settled());
    }

    #[test]
    fn test_settled_below_zero() {
        let counter = Counter::new(0);
        counter.decrement();
        assert_eq!(counter.get(), -1);
        assert!(counter.is_settled());
    }
}
