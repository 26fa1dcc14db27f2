use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use corral_api::{PoolState, ShutdownMode, Task};
use tracing::{debug, trace};

use super::PoolShared;
use super::stats::WorkerCounters;
use crate::{log_task, worker_span};

/// What a worker does after its wait for a task ends.
enum Step {
    Run(Task),
    /// The pool was paused while this worker waited; park on `unpaused` again.
    Repause,
    Exit,
}

/// # Worker Thread
///
/// One of the pool's fixed set of OS threads. Each worker repeatedly:
/// 1. Parks on `unpaused` while the pool is paused
/// 2. Parks on `task_ready` until it pops a task or the pool terminates
/// 3. Runs the task outside every lock and records the output
///
/// A worker leaves its loop only from step 2, when termination is signaled
/// and it did not acquire a task. It never comes back.
pub(crate) struct Worker {
    shared: Arc<PoolShared>,
    counters: Arc<WorkerCounters>,
}

impl Worker {
    pub(crate) fn new(shared: Arc<PoolShared>, counters: Arc<WorkerCounters>) -> Self {
        Self { shared, counters }
    }

    /// Start the worker on a named thread running under `dispatch`.
    pub(crate) fn spawn(self, name: String, dispatch: tracing::Dispatch) -> io::Result<JoinHandle<()>> {
        thread::Builder::new().name(name).spawn(move || {
            tracing::dispatcher::with_default(&dispatch, || self.run_loop());
        })
    }

    fn run_loop(&self) {
        let worker_id = self.counters.worker_id();
        let span = worker_span!(worker_id);
        let _guard = span.enter();
        debug!("worker started");

        loop {
            let state = self.shared.lock_lifecycle();
            let state = self.shared.unpaused.wait_while(state, |state| state.is_paused());

            let wait_started = Instant::now();
            let (state, step) = self.shared.task_ready.wait_for(state, |state| self.next_step(*state));
            drop(state);
            self.counters.record_wait(wait_started.elapsed());

            match step {
                Step::Run(task) => self.execute(task),
                Step::Repause => trace!("paused while waiting for a task"),
                Step::Exit => break,
            }
        }

        self.counters.mark_exited();
        debug!(mean_wait = ?self.counters.mean_wait(), "worker exited");
    }

    /// Evaluated with the lifecycle lock held. `None` keeps the worker parked.
    fn next_step(&self, state: PoolState) -> Option<Step> {
        match state {
            PoolState::Paused => Some(Step::Repause),
            PoolState::Running => self.dequeue().map(Step::Run),
            PoolState::Terminating(ShutdownMode::Drain) => {
                Some(self.dequeue().map_or(Step::Exit, Step::Run))
            }
            PoolState::Terminating(ShutdownMode::Graceful | ShutdownMode::Urgent)
            | PoolState::Terminated
            | PoolState::Uninitialized => Some(Step::Exit),
        }
    }

    fn dequeue(&self) -> Option<Task> {
        let task = self.shared.queue.pop()?;
        self.shared.note_below_capacity();
        Some(task)
    }

    fn execute(&self, task: Task) {
        let task_id = task.id();
        self.shared.stats.record_started(task_id);
        log_task!(task_id, "started");

        let output = task.run();

        self.shared.stats.record_completed(task_id, output);
        self.counters.record_finished();
        log_task!(task_id, "finished", output);
    }
}
