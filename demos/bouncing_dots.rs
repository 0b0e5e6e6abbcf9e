//! Headless bouncing-dot simulation: the example workload driving the
//! pool's per-tick contract. A root task fans out one update task per dot
//! sharing a counter, a draw task gated on that counter aggregates the
//! results, and a post task gated on the frame counter closes the tick.
//! The driver calls `execute` and `wait` once per frame.

use gatework::{Chain, Config, Counter, Submission, Task, WorkerPool};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};

const SCREEN_WIDTH: f64 = 640.0;
const SCREEN_HEIGHT: f64 = 480.0;
const FRAME_STEP: f64 = 1.0 / 60.0;

struct MobState {
    pos: [f64; 2],
    vel: [f64; 2],
    disp: [f64; 2],
}

/// One bouncing dot. Owns its state; the pool never looks inside.
struct Mob {
    state: Mutex<MobState>,
}

impl Mob {
    fn new<R: Rng>(rng: &mut R) -> Self {
        let pos = [rng.gen::<f64>(), rng.gen::<f64>()];
        let vel = [
            (rng.gen::<f64>() * 2.0 - 0.5) * FRAME_STEP,
            (rng.gen::<f64>() * 2.0 - 0.5) * FRAME_STEP,
        ];
        Self {
            state: Mutex::new(MobState {
                pos,
                vel,
                disp: [pos[0] * SCREEN_WIDTH, pos[1] * SCREEN_HEIGHT],
            }),
        }
    }

    fn display_pos(&self) -> [f64; 2] {
        self.state.lock().disp
    }
}

impl Task for Mob {
    fn run(&self) {
        let mut state = self.state.lock();
        for i in 0..2 {
            state.pos[i] += state.vel[i];
            if state.pos[i] <= 0.0 || state.pos[i] >= 1.0 {
                state.vel[i] = -state.vel[i];
            }
        }
        state.disp = [state.pos[0] * SCREEN_WIDTH, state.pos[1] * SCREEN_HEIGHT];
    }
}

#[derive(Default)]
struct FrameStats {
    dots: usize,
    centroid: [f64; 2],
}

/// Stands in for the renderer: aggregates every dot's display position.
struct DrawTask {
    mobs: Arc<Vec<Arc<Mob>>>,
    stats: Arc<Mutex<FrameStats>>,
}

impl Task for DrawTask {
    fn run(&self) {
        let mut sum = [0.0f64; 2];
        for mob in self.mobs.iter() {
            let pos = mob.display_pos();
            sum[0] += pos[0];
            sum[1] += pos[1];
        }
        let n = self.mobs.len().max(1) as f64;
        *self.stats.lock() = FrameStats {
            dots: self.mobs.len(),
            centroid: [sum[0] / n, sum[1] / n],
        };
    }
}

/// Per-tick root task: fans out one update per dot, then chains the draw
/// task gated on the batch.
struct TickTask {
    pool: Arc<WorkerPool>,
    mobs: Arc<Vec<Arc<Mob>>>,
    mob_counter: Arc<Counter>,
    frame_counter: Arc<Counter>,
    draw: Chain,
}

impl Task for TickTask {
    fn run(&self) {
        self.mob_counter.set(self.mobs.len() as i32);
        for mob in self.mobs.iter() {
            let submission = Submission::new(mob.clone())
                .counted(&self.mob_counter)
                .named("mob");
            if self.pool.submit(submission).is_err() {
                warn!("mob submission failed");
                self.mob_counter.decrement();
            }
        }

        if self
            .draw
            .attach_gated(&self.mob_counter, &self.pool, &self.frame_counter)
            .is_err()
        {
            warn!("draw submission failed");
        }
    }
}

fn main() -> gatework::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::builder()
        .slot_capacity(20_000)
        .num_threads(8)
        .build()?;
    let pool = Arc::new(WorkerPool::new(&config)?);

    let mut rng = rand::thread_rng();
    let mobs: Arc<Vec<Arc<Mob>>> =
        Arc::new((0..10_000).map(|_| Arc::new(Mob::new(&mut rng))).collect());

    let stats = Arc::new(Mutex::new(FrameStats::default()));
    let frame_counter = Arc::new(Counter::new(0));
    let mob_counter = Arc::new(Counter::new(0));

    let root = Chain::new(
        "main",
        Arc::new(TickTask {
            pool: pool.clone(),
            mobs: mobs.clone(),
            mob_counter,
            frame_counter: frame_counter.clone(),
            draw: Chain::new(
                "draw",
                Arc::new(DrawTask {
                    mobs: mobs.clone(),
                    stats: stats.clone(),
                }),
            ),
        }),
    );

    // closing task for each frame, gated on the frame counter
    let post: Arc<dyn Task> = Arc::new(|| {
        tracing::trace!("frame complete");
    });

    for frame in 0..120u32 {
        root.attach(&pool, &frame_counter)?;
        pool.submit(
            Submission::new(post.clone())
                .gated(&frame_counter)
                .named("post"),
        )?;

        pool.execute();
        pool.wait();

        if frame % 30 == 0 {
            let stats = stats.lock();
            info!(
                "frame {:3}: {} dots, centroid ({:.1}, {:.1})",
                frame, stats.dots, stats.centroid[0], stats.centroid[1]
            );
        }
    }

    pool.stop();
    Ok(())
}
