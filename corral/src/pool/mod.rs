//! # Worker Pool Module
//!
//! A fixed set of OS worker threads serving one bounded task queue.
//!
//! ## Key Concepts
//! - Lifecycle: an explicit [`PoolState`] changed only through its transition table
//! - Wait points: workers park on `unpaused` and on `task_ready`, re-checking after every wake
//! - Statistics: per-task records, per-worker counters, rejections, queue-full intervals
//!
//! ## Lock Domains
//! Three domains, always acquired in this order and never in reverse:
//! 1. lifecycle: `Mutex<PoolState>`, paired with both wait points
//! 2. queue: the `Mutex` inside [`BoundedTaskQueue`]
//! 3. statistics: the locks inside `PoolStats`
//!
//! Submitters check the state and insert while holding the lifecycle lock, so
//! a worker evaluating "is there a task?" can never miss the wake-up that
//! follows an insertion. Task bodies run with no lock held.

mod signal;
mod stats;
mod worker;

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Instant;

use corral_api::{
    PoolError, PoolEvent, PoolState, PoolStatistics, RejectReason, ShutdownMode, Task, TaskId,
    TaskOutput, TaskPool, TaskRecord, TaskStatus, WorkerStatistics, status_of,
};
use tracing::{debug, error, info, warn};

use crate::config::PoolConfig;
use crate::log_lifecycle;
use crate::logging;
use crate::queue::BoundedTaskQueue;

use self::signal::WaitPoint;
use self::stats::PoolStats;
use self::worker::Worker;

/// State shared between the pool handle and its worker threads.
#[derive(Debug)]
pub(crate) struct PoolShared {
    config: PoolConfig,

    /// Lifecycle state; the lock both wait points park on
    lifecycle: Mutex<PoolState>,

    /// Workers blocked while the pool is paused
    unpaused: WaitPoint,

    /// Workers blocked until a task is queued or the pool terminates
    task_ready: WaitPoint,

    queue: BoundedTaskQueue,

    stats: PoolStats,
}

impl PoolShared {
    pub(crate) fn lock_lifecycle(&self) -> MutexGuard<'_, PoolState> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Close a running queue-full interval after the queue shrank.
    pub(crate) fn note_below_capacity(&self) {
        let closed = self
            .stats
            .with_saturation(|tracker| tracker.mark_below_capacity(Instant::now()));
        if let Some(duration) = closed {
            debug!(?duration, "queue no longer full");
        }
    }

    fn snapshot(&self, state: PoolState) -> PoolStatistics {
        let (min_full_duration, max_full_duration, full_episodes) = self
            .stats
            .with_saturation(|tracker| (tracker.min(), tracker.max(), tracker.episodes()));

        PoolStatistics {
            state,
            queue_capacity: self.queue.capacity(),
            queued: self.queue.ids(),
            workers: self.stats.worker_snapshots(),
            rejected: self.stats.rejected(),
            min_full_duration,
            max_full_duration,
            full_episodes,
        }
    }
}

/// Join handle of one worker thread.
struct WorkerHandle {
    id: usize,
    thread: JoinHandle<()>,
}

/// A fixed-size pool of worker threads executing tasks from a bounded queue.
///
/// Every operation is safe to call from any thread and in any state: calls
/// the current state does not allow are logged and return `false`.
///
/// # Lifecycle
/// `Uninitialized → Running ⇄ Paused → Terminating → Terminated → Uninitialized`
///
/// # Example
///
/// ```rust
/// use corral::{PoolConfig, WorkerPool};
/// use corral_api::{Task, TaskStatus};
///
/// let pool = WorkerPool::new(PoolConfig::with_capacity(8)).unwrap();
/// assert!(pool.initialize(2));
/// assert!(pool.submit(Task::new(1, || 40 + 2)));
/// pool.drain_and_terminate();
///
/// assert_eq!(pool.status(1), TaskStatus::Completed);
/// assert_eq!(pool.result(1), Some(42));
/// ```
pub struct WorkerPool {
    shared: Arc<PoolShared>,

    /// The current worker set; empty unless initialized
    workers: Mutex<Vec<WorkerHandle>>,
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("state", &self.state())
            .field("workers", &self.worker_count())
            .field("queue", &self.shared.queue)
            .finish()
    }
}

impl WorkerPool {
    /// Create an uninitialized pool. No threads are started until
    /// [`WorkerPool::initialize`].
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let shared = PoolShared {
            queue: BoundedTaskQueue::new(config.queue_capacity),
            config,
            lifecycle: Mutex::new(PoolState::Uninitialized),
            unpaused: WaitPoint::new("unpaused"),
            task_ready: WaitPoint::new("task_ready"),
            stats: PoolStats::default(),
        };

        Ok(Self {
            shared: Arc::new(shared),
            workers: Mutex::new(Vec::new()),
        })
    }

    fn lock_workers(&self) -> MutexGuard<'_, Vec<WorkerHandle>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Initialize with the configured number of workers.
    pub fn start(&self) -> bool {
        self.initialize(self.shared.config.workers)
    }

    /// Spawn `worker_count` workers with ids `1..=worker_count`.
    ///
    /// No-op if the pool is running, paused or terminating. The pool becomes
    /// running iff at least one worker thread was started.
    pub fn initialize(&self, worker_count: usize) -> bool {
        let mut state = self.shared.lock_lifecycle();
        let next = match state.apply(PoolEvent::Start) {
            Ok(next) => next,
            Err(error) => {
                debug!(%error, state = %*state, "initialize ignored");
                return false;
            }
        };

        if worker_count == 0 {
            log_lifecycle!("initialize", "no workers requested");
            return false;
        }

        let mut workers = self.lock_workers();
        let dispatch = logging::current_subscriber();

        for counters in self.shared.stats.new_generation(worker_count) {
            let id = counters.worker_id();
            let worker = Worker::new(self.shared.clone(), counters);
            match worker.spawn(self.shared.config.thread_name(id), dispatch.clone()) {
                Ok(thread) => workers.push(WorkerHandle { id, thread }),
                Err(io_error) => {
                    let error = PoolError::SpawnError(io_error.to_string());
                    error!(worker_id = id, %error, "stopped spawning workers");
                    break;
                }
            }
        }
        self.shared.stats.retain_workers(workers.len());

        if workers.is_empty() {
            log_lifecycle!("initialize", "no workers started", requested = worker_count);
            return false;
        }

        *state = next;
        log_lifecycle!("initialize", "running", workers = workers.len());
        true
    }

    /// Stop workers from dequeuing. Tasks already running are not interrupted.
    pub fn pause(&self) -> bool {
        let mut state = self.shared.lock_lifecycle();
        match state.apply(PoolEvent::Pause) {
            Ok(next) => {
                *state = next;
                // Workers parked on task_ready move over to unpaused.
                self.shared.task_ready.wake_all();
                log_lifecycle!("pause", "paused");
                true
            }
            Err(error) => {
                debug!(%error, "pause ignored");
                false
            }
        }
    }

    /// Resume dequeuing and release every worker held by a pause.
    pub fn unpause(&self) -> bool {
        let mut state = self.shared.lock_lifecycle();
        match state.apply(PoolEvent::Unpause) {
            Ok(next) => {
                *state = next;
                self.shared.unpaused.wake_all();
                log_lifecycle!("unpause", "running");
                true
            }
            Err(error) => {
                debug!(%error, "unpause ignored");
                false
            }
        }
    }

    /// Graceful shutdown: no new dequeues, in-flight tasks finish, workers
    /// are joined. Queued tasks are abandoned and stay queued.
    pub fn terminate(&self) -> bool {
        self.shutdown(ShutdownMode::Graceful)
    }

    /// Graceful shutdown that first discards every queued task.
    pub fn urgent_terminate(&self) -> bool {
        self.shutdown(ShutdownMode::Urgent)
    }

    /// Refuse new submissions, run the queue empty, then stop.
    pub fn drain_and_terminate(&self) -> bool {
        self.shutdown(ShutdownMode::Drain)
    }

    fn shutdown(&self, mode: ShutdownMode) -> bool {
        {
            let mut state = self.shared.lock_lifecycle();
            match state.apply(PoolEvent::Terminate(mode)) {
                Ok(next) => *state = next,
                Err(error) => {
                    debug!(%error, state = %*state, %mode, "terminate ignored");
                    if let Ok(reset) = state.apply(PoolEvent::Reset) {
                        *state = reset;
                    }
                    return false;
                }
            }

            if mode == ShutdownMode::Urgent {
                let discarded = self.shared.queue.clear();
                if discarded > 0 {
                    self.shared.note_below_capacity();
                }
                log_lifecycle!("terminate", "queue discarded", discarded);
            }

            self.shared.unpaused.wake_all();
            self.shared.task_ready.wake_all();
        }
        log_lifecycle!("terminate", "waiting for workers", %mode);

        let handles = std::mem::take(&mut *self.lock_workers());
        for handle in handles {
            if let Err(panic) = handle.thread.join() {
                error!(
                    worker_id = handle.id,
                    panic = %panic_message(panic.as_ref()),
                    "worker thread panicked"
                );
            }
        }

        let mut state = self.shared.lock_lifecycle();
        match state.apply(PoolEvent::WorkersJoined) {
            Ok(next) => *state = next,
            Err(error) => warn!(%error, "unexpected state after joining workers"),
        }
        if self.shared.config.log_statistics_on_shutdown {
            log_statistics(&self.shared.snapshot(*state));
        }
        if let Ok(reset) = state.apply(PoolEvent::Reset) {
            *state = reset;
        }
        log_lifecycle!("terminate", "terminated", %mode);
        true
    }

    /// Queue a task for execution.
    ///
    /// Refused (and counted) when the pool is not working or the queue is full.
    pub fn submit(&self, task: Task) -> bool {
        self.try_submit(task).is_ok()
    }

    /// Like [`WorkerPool::submit`], reporting why a task was refused.
    pub fn try_submit(&self, task: Task) -> Result<(), PoolError> {
        let task_id = task.id();
        let capacity = self.shared.queue.capacity();

        let outcome = {
            let state = self.shared.lock_lifecycle();
            if !state.is_working() {
                Err(RejectReason::NotRunning)
            } else {
                match self.shared.queue.insert(task) {
                    Ok(len) => {
                        if len == capacity {
                            self.shared
                                .stats
                                .with_saturation(|tracker| tracker.mark_full(Instant::now()));
                        }
                        Ok(len)
                    }
                    Err(_rejected) => Err(RejectReason::QueueFull { capacity }),
                }
            }
        };

        match outcome {
            Ok(queue_len) => {
                self.shared.task_ready.wake_one();
                crate::log_task!(task_id, "queued", queue_len);
                Ok(())
            }
            Err(reason) => {
                let rejected_total = self.shared.stats.record_rejection();
                warn!(task_id, %reason, rejected_total, "task rejected");
                Err(PoolError::Rejected(reason))
            }
        }
    }

    /// Cancel a queued task. `false` if the pool is not working or no queued
    /// task has this id.
    pub fn remove(&self, id: TaskId) -> bool {
        let state = self.shared.lock_lifecycle();
        if !state.is_working() {
            debug!(task_id = id, state = %*state, "remove ignored");
            return false;
        }

        match self.shared.queue.remove_by_id(id) {
            Some(_) => {
                self.shared.note_below_capacity();
                crate::log_task!(id, "removed");
                true
            }
            None => {
                debug!(error = %PoolError::NotFound(id), "remove ignored");
                false
            }
        }
    }

    /// True while the pool is running or paused.
    pub fn working(&self) -> bool {
        self.shared.lock_lifecycle().is_working()
    }

    pub fn state(&self) -> PoolState {
        *self.shared.lock_lifecycle()
    }

    /// Number of worker threads in the current generation.
    pub fn worker_count(&self) -> usize {
        self.lock_workers().len()
    }

    pub fn status(&self, id: TaskId) -> TaskStatus {
        status_of(self.shared.stats.record(id).as_ref())
    }

    /// Last completed output for `id`; `None` if unknown or still executing.
    pub fn result(&self, id: TaskId) -> Option<TaskOutput> {
        self.shared.stats.record(id).and_then(|record| record.output())
    }

    /// The tagged record for `id`, if a worker has picked it up.
    pub fn record(&self, id: TaskId) -> Option<TaskRecord> {
        self.shared.stats.record(id)
    }

    /// Ids of the queued tasks, oldest first.
    pub fn queued_ids(&self) -> Vec<TaskId> {
        self.shared.queue.ids()
    }

    pub fn queue_len(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    /// Submissions refused over the pool's lifetime.
    pub fn rejected_count(&self) -> u64 {
        self.shared.stats.rejected()
    }

    /// Counters of the current (or last terminated) worker generation.
    pub fn worker_statistics(&self) -> Vec<WorkerStatistics> {
        self.shared.stats.worker_snapshots()
    }

    /// Point-in-time snapshot of the whole pool.
    pub fn statistics(&self) -> PoolStatistics {
        let state = self.state();
        self.shared.snapshot(state)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl TaskPool for WorkerPool {
    fn submit(&self, task: Task) -> bool {
        WorkerPool::submit(self, task)
    }

    fn remove(&self, id: TaskId) -> bool {
        WorkerPool::remove(self, id)
    }

    fn pause(&self) -> bool {
        WorkerPool::pause(self)
    }

    fn unpause(&self) -> bool {
        WorkerPool::unpause(self)
    }

    fn terminate(&self) -> bool {
        WorkerPool::terminate(self)
    }

    fn urgent_terminate(&self) -> bool {
        WorkerPool::urgent_terminate(self)
    }

    fn working(&self) -> bool {
        WorkerPool::working(self)
    }

    fn status(&self, id: TaskId) -> TaskStatus {
        WorkerPool::status(self, id)
    }

    fn result(&self, id: TaskId) -> Option<TaskOutput> {
        WorkerPool::result(self, id)
    }
}

fn log_statistics(statistics: &PoolStatistics) {
    for worker in &statistics.workers {
        info!(
            worker_id = worker.worker_id,
            mean_wait = ?worker.mean_wait,
            finished_tasks = worker.finished_tasks,
            "worker statistics"
        );
    }
    info!(
        rejected = statistics.rejected,
        min_full = ?statistics.min_full_duration,
        max_full = ?statistics.max_full_duration,
        abandoned = statistics.queued.len(),
        "pool statistics"
    );
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
