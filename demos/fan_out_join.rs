//! Minimal fan-out/join walkthrough: a counted batch of siblings, one
//! downstream task gated on their shared counter, then a barrier wait.

use gatework::{Chain, Counter, Submission, WorkerPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

fn main() -> gatework::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let pool = WorkerPool::with_capacity(64, 4)?;
    info!("pool up: {} threads, {} slots", pool.num_threads(), pool.capacity());

    let batch = Arc::new(Counter::new(0));
    let tick = Arc::new(Counter::new(0));
    let sum = Arc::new(AtomicUsize::new(0));

    // fan out: eight siblings sharing one completion counter
    for i in 0..8usize {
        batch.increment();
        let sum = sum.clone();
        pool.submit(
            Submission::from_fn(move || {
                sum.fetch_add(i * i, Ordering::SeqCst);
            })
            .counted(&batch)
            .named(format!("square-{i}")),
        )?;
    }

    // join: eligible only after every sibling has decremented the batch
    {
        let sum = sum.clone();
        let batch_handle = batch.clone();
        Chain::from_fn("report", move || {
            info!(
                "join ran with batch counter at {}: sum of squares = {}",
                batch_handle.get(),
                sum.load(Ordering::SeqCst)
            );
        })
        .attach_gated(&batch, &pool, &tick)?;
    }

    pool.execute();
    pool.wait();

    info!("batch drained: counter = {}, tick = {}", batch.get(), tick.get());

    pool.stop();
    Ok(())
}
