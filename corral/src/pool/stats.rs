use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use corral_api::{TaskId, TaskOutput, TaskRecord, WorkerStatistics};

/// Counters owned by a single worker thread.
///
/// Only the owning worker writes; everyone else reads a snapshot. Atomics
/// keep the hot path free of the statistics locks.
#[derive(Debug)]
pub(crate) struct WorkerCounters {
    worker_id: usize,
    finished: AtomicU64,
    wait_nanos: AtomicU64,
    wait_cycles: AtomicU64,
    exited: AtomicBool,
}

impl WorkerCounters {
    pub(crate) fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            finished: AtomicU64::new(0),
            wait_nanos: AtomicU64::new(0),
            wait_cycles: AtomicU64::new(0),
            exited: AtomicBool::new(false),
        }
    }

    pub(crate) fn worker_id(&self) -> usize {
        self.worker_id
    }

    pub(crate) fn record_wait(&self, waited: Duration) {
        let nanos = u64::try_from(waited.as_nanos()).unwrap_or(u64::MAX);
        self.wait_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.wait_cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_finished(&self) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn mark_exited(&self) {
        self.exited.store(true, Ordering::Release);
    }

    pub(crate) fn mean_wait(&self) -> Option<Duration> {
        let cycles = self.wait_cycles.load(Ordering::Relaxed);
        if cycles == 0 {
            return None;
        }
        Some(Duration::from_nanos(self.wait_nanos.load(Ordering::Relaxed) / cycles))
    }

    pub(crate) fn snapshot(&self) -> WorkerStatistics {
        WorkerStatistics {
            worker_id: self.worker_id,
            finished_tasks: self.finished.load(Ordering::Relaxed),
            mean_wait: self.mean_wait(),
            exited: self.exited.load(Ordering::Acquire),
        }
    }
}

/// Tracks intervals during which the queue sat at capacity.
#[derive(Debug, Default)]
pub(crate) struct SaturationTracker {
    full_since: Option<Instant>,
    min: Option<Duration>,
    max: Option<Duration>,
    episodes: u64,
}

impl SaturationTracker {
    /// The queue reached capacity. A running episode keeps its start time.
    pub(crate) fn mark_full(&mut self, now: Instant) {
        self.full_since.get_or_insert(now);
    }

    /// The queue dropped below capacity; closes the running episode, if any.
    pub(crate) fn mark_below_capacity(&mut self, now: Instant) -> Option<Duration> {
        let started = self.full_since.take()?;
        let elapsed = now.saturating_duration_since(started);
        self.min = Some(self.min.map_or(elapsed, |min| min.min(elapsed)));
        self.max = Some(self.max.map_or(elapsed, |max| max.max(elapsed)));
        self.episodes += 1;
        Some(elapsed)
    }

    pub(crate) fn min(&self) -> Option<Duration> {
        self.min
    }

    pub(crate) fn max(&self) -> Option<Duration> {
        self.max
    }

    pub(crate) fn episodes(&self) -> u64 {
        self.episodes
    }
}

/// Results and statistics shared between workers and readers.
#[derive(Debug, Default)]
pub(crate) struct PoolStats {
    /// Record of every task id a worker has picked up
    records: RwLock<HashMap<TaskId, TaskRecord>>,

    /// Counter handles of the current worker generation
    workers: RwLock<Vec<Arc<WorkerCounters>>>,

    /// Submissions refused over the pool's lifetime
    rejected: AtomicU64,

    /// Queue-full interval bookkeeping
    saturation: Mutex<SaturationTracker>,
}

impl PoolStats {
    pub(crate) fn record_started(&self, id: TaskId) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, TaskRecord::Executing);
    }

    pub(crate) fn record_completed(&self, id: TaskId, output: TaskOutput) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, TaskRecord::Completed(output));
    }

    pub(crate) fn record(&self, id: TaskId) -> Option<TaskRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
    }

    /// Install fresh counters for workers `1..=count`.
    pub(crate) fn new_generation(&self, count: usize) -> Vec<Arc<WorkerCounters>> {
        let counters: Vec<_> = (1..=count).map(|id| Arc::new(WorkerCounters::new(id))).collect();
        *self.workers.write().unwrap_or_else(PoisonError::into_inner) = counters.clone();
        counters
    }

    /// Drop the counters of workers that never started.
    pub(crate) fn retain_workers(&self, count: usize) {
        self.workers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .truncate(count);
    }

    pub(crate) fn worker_snapshots(&self) -> Vec<WorkerStatistics> {
        self.workers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|counters| counters.snapshot())
            .collect()
    }

    /// Count one rejection; returns the new total.
    pub(crate) fn record_rejection(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub(crate) fn with_saturation<R>(&self, f: impl FnOnce(&mut SaturationTracker) -> R) -> R {
        let mut tracker = self.saturation.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut tracker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_wait_over_cycles() {
        let counters = WorkerCounters::new(1);
        assert_eq!(counters.mean_wait(), None);

        counters.record_wait(Duration::from_millis(10));
        counters.record_wait(Duration::from_millis(30));
        assert_eq!(counters.mean_wait(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_counter_snapshot() {
        let counters = WorkerCounters::new(3);
        counters.record_finished();
        counters.record_finished();
        counters.mark_exited();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.worker_id, 3);
        assert_eq!(snapshot.finished_tasks, 2);
        assert!(snapshot.exited);
    }

    #[test]
    fn test_saturation_min_max() {
        let mut tracker = SaturationTracker::default();
        let start = Instant::now();

        assert_eq!(tracker.mark_below_capacity(start), None);

        tracker.mark_full(start);
        tracker.mark_full(start + Duration::from_millis(5));
        assert_eq!(
            tracker.mark_below_capacity(start + Duration::from_millis(40)),
            Some(Duration::from_millis(40))
        );

        tracker.mark_full(start + Duration::from_millis(100));
        tracker.mark_below_capacity(start + Duration::from_millis(110));

        assert_eq!(tracker.mark_below_capacity(start + Duration::from_millis(200)), None);
        assert_eq!(tracker.min(), Some(Duration::from_millis(10)));
        assert_eq!(tracker.max(), Some(Duration::from_millis(40)));
        assert_eq!(tracker.episodes(), 2);
    }

    #[test]
    fn test_records_distinguish_zero_output() {
        let stats = PoolStats::default();
        assert_eq!(stats.record(1), None);

        stats.record_started(1);
        assert_eq!(stats.record(1), Some(TaskRecord::Executing));

        stats.record_completed(1, 0);
        assert_eq!(stats.record(1), Some(TaskRecord::Completed(0)));
    }

    #[test]
    fn test_new_generation_replaces_counters() {
        let stats = PoolStats::default();
        let first = stats.new_generation(3);
        first[0].record_finished();

        stats.new_generation(2);
        let snapshots = stats.worker_snapshots();
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots.iter().all(|w| w.finished_tasks == 0));

        stats.retain_workers(1);
        assert_eq!(stats.worker_snapshots().len(), 1);
    }

    #[test]
    fn test_rejection_counter() {
        let stats = PoolStats::default();
        assert_eq!(stats.record_rejection(), 1);
        assert_eq!(stats.record_rejection(), 2);
        assert_eq!(stats.rejected(), 2);
    }
}
