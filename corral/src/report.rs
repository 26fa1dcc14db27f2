//! Text rendering of pool snapshots for presentation layers.
//!
//! The pool never prints; drivers call these and decide where the text goes.

use std::fmt::Write;
use std::time::Duration;

use corral_api::{PoolStatistics, TaskId, TaskPool, TaskStatus};

/// One sentence describing where task `id` stands, derived only from
/// [`TaskPool::status`] and [`TaskPool::result`].
pub fn explain_status(pool: &dyn TaskPool, id: TaskId) -> String {
    match pool.status(id) {
        TaskStatus::NotStarted => format!("Task #{id} has not been started yet."),
        TaskStatus::Executing => format!("Task #{id} is executing now."),
        TaskStatus::Completed => match pool.result(id) {
            Some(output) => format!("Task #{id} has completed with result {output}."),
            // Re-submitted under the same id and picked up again meanwhile.
            None => format!("Task #{id} is executing now."),
        },
    }
}

/// Queued ids, oldest first, one per line.
pub fn render_queue(queued: &[TaskId]) -> String {
    if queued.is_empty() {
        return "Queue is empty.\n".to_string();
    }
    queued.iter().map(|id| format!("{id}\n")).collect()
}

/// Multi-line summary of a statistics snapshot.
pub fn render_statistics(statistics: &PoolStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Pool is {}.", statistics.state);
    for worker in &statistics.workers {
        let _ = writeln!(
            out,
            "Worker {}: mean wait {}, finished tasks {}.",
            worker.worker_id,
            seconds(worker.mean_wait),
            worker.finished_tasks
        );
    }
    let _ = writeln!(out, "Rejected tasks: {}.", statistics.rejected);
    let _ = writeln!(
        out,
        "Queue full (capacity {}): min {}, max {} over {} interval(s).",
        statistics.queue_capacity,
        seconds(statistics.min_full_duration),
        seconds(statistics.max_full_duration),
        statistics.full_episodes
    );
    let _ = writeln!(out, "Queued tasks: {}.", statistics.queued.len());
    out
}

fn seconds(duration: Option<Duration>) -> String {
    duration.map_or_else(|| "n/a".to_string(), |d| format!("{:.6}s", d.as_secs_f64()))
}
