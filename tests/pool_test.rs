use gatework::prelude::*;

use parking_lot::Mutex;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_batch_completion() {
    let pool = WorkerPool::with_capacity(64, 4).unwrap();
    let completion = Arc::new(Counter::new(0));
    let runs: Vec<Arc<AtomicUsize>> = (0..32).map(|_| Arc::new(AtomicUsize::new(0))).collect();

    for run in &runs {
        completion.increment();
        let run = run.clone();
        pool.submit(
            Submission::from_fn(move || {
                run.fetch_add(1, Ordering::SeqCst);
            })
            .counted(&completion),
        )
        .unwrap();
    }

    pool.execute();
    pool.wait();

    assert_eq!(completion.get(), 0);
    for run in &runs {
        assert_eq!(run.load(Ordering::SeqCst), 1, "each task runs exactly once");
    }

    pool.stop();
}

#[test]
fn test_empty_batch() {
    let pool = WorkerPool::with_capacity(8, 2).unwrap();

    // wait with nothing submitted returns immediately
    pool.execute();
    pool.wait();

    pool.stop();
}

#[test]
fn test_gate_ordering() {
    let pool = WorkerPool::with_capacity(32, 4).unwrap();
    let gate = Arc::new(Counter::new(0));
    let tick = Arc::new(Counter::new(0));

    let effects = Arc::new(AtomicUsize::new(0));
    let gate_at_start = Arc::new(AtomicI32::new(i32::MAX));
    let effects_at_start = Arc::new(AtomicUsize::new(usize::MAX));

    for _ in 0..8 {
        gate.increment();
        let effects = effects.clone();
        pool.submit(
            Submission::from_fn(move || {
                std::thread::sleep(Duration::from_millis(2));
                effects.fetch_add(1, Ordering::SeqCst);
            })
            .counted(&gate),
        )
        .unwrap();
    }

    {
        let gate_handle = gate.clone();
        let gate_at_start = gate_at_start.clone();
        let effects = effects.clone();
        let effects_at_start = effects_at_start.clone();
        pool.submit(
            Submission::from_fn(move || {
                gate_at_start.store(gate_handle.get(), Ordering::SeqCst);
                effects_at_start.store(effects.load(Ordering::SeqCst), Ordering::SeqCst);
            })
            .gated(&gate)
            .counted(&tick),
        )
        .unwrap();
    }

    pool.execute();
    pool.wait();

    // the gated task never begins while the gate is above zero, and it
    // observes every prerequisite effect
    assert!(gate_at_start.load(Ordering::SeqCst) <= 0);
    assert_eq!(effects_at_start.load(Ordering::SeqCst), 8);
    assert_eq!(tick.get(), 0);

    pool.stop();
}

#[test]
fn test_slot_conservation() {
    let pool = WorkerPool::with_capacity(8, 2).unwrap();
    assert_eq!(pool.free_slots(), 8);
    assert_eq!(pool.queued(), 0);

    for _ in 0..5 {
        pool.submit(Submission::from_fn(|| {
            std::thread::sleep(Duration::from_millis(1));
        }))
        .unwrap();
    }
    // slots either free, queued, or executing; never more than capacity
    assert!(pool.free_slots() + pool.queued() <= pool.capacity());

    pool.execute();
    for _ in 0..10 {
        assert!(pool.free_slots() + pool.queued() <= pool.capacity());
        std::thread::sleep(Duration::from_millis(1));
    }
    pool.wait();

    assert_eq!(pool.free_slots(), pool.capacity());
    assert_eq!(pool.queued(), 0);

    pool.stop();
}

#[test]
fn test_saturation() {
    let pool = WorkerPool::with_capacity(4, 2).unwrap();
    let blocker = Arc::new(Counter::new(1));
    let ran = Arc::new(AtomicUsize::new(0));

    // gated submissions hold their slots even if a worker wakes early
    for _ in 0..4 {
        let ran = ran.clone();
        pool.submit(
            Submission::from_fn(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .gated(&blocker),
        )
        .unwrap();
    }

    // exactly one more submission fails, and nothing is corrupted
    let overflow = pool.submit(Submission::from_fn(|| {}));
    assert!(matches!(overflow, Err(Error::Saturated)));
    assert_eq!(pool.free_slots(), 0);

    // once the batch drains, submission succeeds again
    blocker.set(0);
    pool.execute();
    pool.wait();
    assert_eq!(ran.load(Ordering::SeqCst), 4);
    assert_eq!(pool.free_slots(), 4);

    assert!(pool.submit(Submission::from_fn(|| {})).is_ok());

    pool.execute();
    pool.wait();
    pool.stop();
}

#[test]
fn test_shutdown_rejects_submissions() {
    let pool = WorkerPool::with_capacity(8, 2).unwrap();
    pool.stop();

    let ran = Arc::new(AtomicUsize::new(0));
    let result = {
        let ran = ran.clone();
        pool.submit(Submission::from_fn(move || {
            ran.fetch_add(1, Ordering::SeqCst);
        }))
    };

    assert!(matches!(result, Err(Error::Terminated)));
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(ran.load(Ordering::SeqCst), 0, "rejected task never executes");

    // stop is idempotent
    pool.stop();
}

#[test]
fn test_scenario_fan_out() {
    // pool(capacity=4, threads=2); 4 ungated tasks bump a shared counter
    let pool = WorkerPool::with_capacity(4, 2).unwrap();
    let k = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let k = k.clone();
        pool.submit(Submission::from_fn(move || {
            k.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
    }

    pool.execute();
    pool.wait();

    assert_eq!(k.load(Ordering::SeqCst), 4);
    pool.stop();
}

#[test]
fn test_scenario_gated_join() {
    // pool(capacity=3, threads=1); 2 prerequisites, then a gated join
    let pool = WorkerPool::with_capacity(3, 1).unwrap();
    let c = Arc::new(Counter::new(0));
    let tick = Arc::new(Counter::new(0));
    let events: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    for _ in 0..2 {
        c.increment();
        let events = events.clone();
        pool.submit(
            Submission::from_fn(move || {
                events.lock().push("prereq");
            })
            .counted(&c),
        )
        .unwrap();
    }
    assert_eq!(c.get(), 2);

    {
        let events = events.clone();
        Chain::from_fn("join", move || {
            events.lock().push("join");
        })
        .attach_gated(&c, &pool, &tick)
        .unwrap();
    }

    pool.execute();
    pool.wait();

    let events = events.lock();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], "prereq");
    assert_eq!(events[1], "prereq");
    assert_eq!(events[2], "join");

    pool.stop();
}

#[test]
fn test_chain_attach_counts() {
    let pool = WorkerPool::with_capacity(8, 2).unwrap();
    let completion = Arc::new(Counter::new(0));
    let ran = Arc::new(AtomicUsize::new(0));

    let chain = {
        let ran = ran.clone();
        Chain::from_fn("counted", move || {
            ran.fetch_add(1, Ordering::SeqCst);
        })
    };

    assert_eq!(chain.name(), "counted");
    chain.attach(&pool, &completion).unwrap();

    // unnamed chains fall back to the placeholder name
    let anon = {
        let ran = ran.clone();
        Chain::unnamed(Arc::new(move || {
            ran.fetch_add(1, Ordering::SeqCst);
        }))
    };
    assert_eq!(anon.name(), "NONAME");
    anon.attach(&pool, &completion).unwrap();

    pool.execute();
    pool.wait();

    assert_eq!(ran.load(Ordering::SeqCst), 2);
    assert_eq!(completion.get(), 0, "attach increments balanced by completions");

    pool.stop();
}

#[test]
fn test_chain_rollback_on_saturation() {
    let pool = WorkerPool::with_capacity(1, 1).unwrap();
    let blocker = Arc::new(Counter::new(1));
    let completion = Arc::new(Counter::new(0));

    // occupy the only slot with a gated task so it cannot free itself
    pool.submit(Submission::from_fn(|| {}).gated(&blocker)).unwrap();

    let result = Chain::from_fn("late", || {}).attach(&pool, &completion);
    assert!(matches!(result, Err(Error::Saturated)));
    assert_eq!(completion.get(), 0, "failed attach leaves the counter unchanged");

    blocker.set(0);
    pool.execute();
    pool.wait();
    pool.stop();
}

#[test]
fn test_panic_containment() {
    let pool = WorkerPool::with_capacity(8, 2).unwrap();
    let batch = Arc::new(Counter::new(0));
    let ran = Arc::new(AtomicUsize::new(0));

    batch.increment();
    pool.submit(
        Submission::from_fn(|| panic!("boom"))
            .counted(&batch)
            .named("bad"),
    )
    .unwrap();

    for _ in 0..4 {
        batch.increment();
        let ran = ran.clone();
        pool.submit(
            Submission::from_fn(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .counted(&batch),
        )
        .unwrap();
    }

    pool.execute();
    pool.wait();

    // the panicking member still drains the batch
    assert_eq!(batch.get(), 0);
    assert_eq!(ran.load(Ordering::SeqCst), 4);
    assert_eq!(pool.panic_count(), 1);
    assert_eq!(pool.free_slots(), pool.capacity());

    pool.stop();
}

#[test]
fn test_slots_recycle_across_ticks() {
    let pool = WorkerPool::with_capacity(32, 4).unwrap();
    let total = Arc::new(AtomicUsize::new(0));

    for _ in 0..50 {
        let batch = Arc::new(Counter::new(0));
        for _ in 0..16 {
            batch.increment();
            let total = total.clone();
            pool.submit(
                Submission::from_fn(move || {
                    total.fetch_add(1, Ordering::SeqCst);
                })
                .counted(&batch),
            )
            .unwrap();
        }
        pool.execute();
        pool.wait();
        assert_eq!(batch.get(), 0);
        assert_eq!(pool.free_slots(), pool.capacity());
    }

    assert_eq!(total.load(Ordering::SeqCst), 800);
    pool.stop();
}

#[test]
fn test_concurrent_submission() {
    let pool = Arc::new(WorkerPool::with_capacity(256, 4).unwrap());
    let ran = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let pool = pool.clone();
            let ran = ran.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let ran = ran.clone();
                    pool.submit(Submission::from_fn(move || {
                        ran.fetch_add(1, Ordering::SeqCst);
                    }))
                    .unwrap();
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }

    pool.execute();
    pool.wait();

    assert_eq!(ran.load(Ordering::SeqCst), 200);
    pool.stop();
}
