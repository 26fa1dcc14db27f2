use std::fmt;

use crate::status::TaskStatus;
use crate::task::{Task, TaskId, TaskOutput};

/// Common interface of a bounded task pool, as seen by drivers and controllers.
///
/// Every operation is non-fatal: refusals and misuse are reported through the
/// boolean return value, never by panicking.
pub trait TaskPool: fmt::Debug + Send + Sync {
    /// Queue a task. `false` when the pool is not working or the queue is full.
    fn submit(&self, task: Task) -> bool;

    /// Cancel a queued task that no worker has picked up yet.
    fn remove(&self, id: TaskId) -> bool;

    /// Stop workers from dequeuing new tasks.
    fn pause(&self) -> bool;

    /// Let workers dequeue again.
    fn unpause(&self) -> bool;

    /// Stop dequeuing, wait for in-flight tasks, join all workers.
    fn terminate(&self) -> bool;

    /// Like [`TaskPool::terminate`], discarding every queued task first.
    fn urgent_terminate(&self) -> bool;

    /// True while the pool is running or paused.
    fn working(&self) -> bool;

    fn status(&self, id: TaskId) -> TaskStatus;

    /// Last completed output for `id`, if any.
    fn result(&self, id: TaskId) -> Option<TaskOutput>;
}
