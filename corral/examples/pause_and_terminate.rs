//! Producer/controller walkthrough of a pool's lifecycle.
//!
//! One producer thread submits a task every 100ms while the main thread
//! pauses the pool, resumes it, asks about a task and finally shuts the
//! pool down urgently, discarding whatever is still queued.
//!
//! Run with `cargo run --example pause_and_terminate`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};
use corral::{PoolConfig, Task, TaskId, TaskPool, WorkerPool, logging, report};
use rand::Rng;

const WORKERS: usize = 6;
const PRODUCERS: u64 = 1;
const TASKS_PER_PRODUCER: u64 = 20;
const PHASE: Duration = Duration::from_millis(500);

fn produce(pool: Arc<WorkerPool>, producer: u64) {
    let mut rng = rand::thread_rng();
    for n in 1..=TASKS_PER_PRODUCER {
        let id: TaskId = producer * 100_000 + n;
        let sleep = Duration::from_millis(rng.gen_range(200..=800));
        pool.submit(Task::new(id, move || {
            thread::sleep(sleep);
            0
        }));
        thread::sleep(Duration::from_millis(100));
    }
}

fn main() -> Result<()> {
    logging::init_development();

    let pool = Arc::new(WorkerPool::new(PoolConfig::with_capacity(5))?);
    if !pool.initialize(WORKERS) {
        bail!("no worker thread could be started");
    }

    let producers: Vec<_> = (1..=PRODUCERS)
        .map(|producer| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || produce(pool, producer))
        })
        .collect();

    thread::sleep(PHASE);
    println!("\nPool is paused.\n");
    pool.pause();
    println!("{}", report::render_queue(&pool.queued_ids()));

    thread::sleep(PHASE);
    println!("\nPool is unpaused.\n");
    pool.unpause();

    thread::sleep(PHASE);
    let controller: &dyn TaskPool = &*pool;
    println!("{}", report::explain_status(controller, 100_005));

    thread::sleep(PHASE);
    println!("\nUrgent termination started.\n");
    controller.urgent_terminate();
    println!("\nUrgent termination finished.\n");

    for producer in producers {
        if producer.join().is_err() {
            bail!("producer thread panicked");
        }
    }

    print!("{}", report::render_statistics(&pool.statistics()));
    Ok(())
}
