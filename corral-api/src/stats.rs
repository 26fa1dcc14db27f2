use std::time::Duration;

use crate::lifecycle::PoolState;
use crate::task::TaskId;

/// Snapshot of one worker's counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStatistics {
    /// Stable worker identity, `1..=n`.
    pub worker_id: usize,
    /// Tasks this worker ran to completion.
    pub finished_tasks: u64,
    /// Mean time spent waiting for a task per wait cycle; `None` before the
    /// first cycle completes.
    pub mean_wait: Option<Duration>,
    /// Whether the worker has left its loop.
    pub exited: bool,
}

/// Point-in-time view of the whole pool, intended for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStatistics {
    pub state: PoolState,
    pub queue_capacity: usize,
    /// Ids currently queued, oldest first.
    pub queued: Vec<TaskId>,
    pub workers: Vec<WorkerStatistics>,
    /// Submissions refused over the pool's lifetime.
    pub rejected: u64,
    /// Shortest interval the queue stayed full.
    pub min_full_duration: Option<Duration>,
    /// Longest interval the queue stayed full.
    pub max_full_duration: Option<Duration>,
    /// Completed queue-full intervals.
    pub full_episodes: u64,
}

impl PoolStatistics {
    /// Sum of finished tasks over all workers of the current generation.
    pub fn finished_total(&self) -> u64 {
        self.workers.iter().map(|w| w.finished_tasks).sum()
    }
}
