#![allow(dead_code)]

use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use corral::{PoolConfig, Task, TaskId, WorkerPool, logging};

/// Upper bound for anything a test polls for.
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(5);

/// Pool with the given queue capacity and quiet test logging.
pub fn test_pool(queue_capacity: usize) -> WorkerPool {
    logging::init_test();
    WorkerPool::new(PoolConfig::with_capacity(queue_capacity)).expect("valid config")
}

/// Poll `condition` until it holds or [`DEFAULT_WAIT_TIME`] elapses.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + DEFAULT_WAIT_TIME;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// A latch that tasks block on until the test opens it.
#[derive(Clone, Default)]
pub struct Gate {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    pub fn open(&self) {
        let (open, condvar) = &*self.inner;
        *open.lock().unwrap() = true;
        condvar.notify_all();
    }

    pub fn wait(&self) {
        let (open, condvar) = &*self.inner;
        let _open = condvar.wait_while(open.lock().unwrap(), |open| !*open).unwrap();
    }

    /// Task that blocks on this gate, then returns `output`.
    pub fn task(&self, id: TaskId, output: i64) -> Task {
        let gate = self.clone();
        Task::new(id, move || {
            gate.wait();
            output
        })
    }
}

/// Shared log of task ids in the order their bodies ran.
#[derive(Clone, Default)]
pub struct ExecutionLog {
    ids: Arc<Mutex<Vec<TaskId>>>,
}

impl ExecutionLog {
    /// Task that appends its id to the log and returns it as output.
    pub fn task(&self, id: TaskId) -> Task {
        let ids = self.ids.clone();
        Task::new(id, move || {
            ids.lock().unwrap().push(id);
            id as i64
        })
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.ids.lock().unwrap().clone()
    }
}
