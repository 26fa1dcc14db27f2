//! # Task Definition
//!
//! A task is the unit of work the pool executes: an integer identifier paired
//! with a closure that takes no arguments and returns an integer.
//!
//! Tasks are consumed on execution. A task that was submitted twice under the
//! same id is two tasks as far as the queue is concerned; only the recorded
//! result is keyed by id, so the later execution overwrites the earlier one.

use std::fmt;

/// Identifier used for result lookup and removal.
pub type TaskId = u64;

/// Value produced by a task's work.
pub type TaskOutput = i64;

/// Boxed task body.
pub type TaskFn = Box<dyn FnOnce() -> TaskOutput + Send + 'static>;

/// An identifiable, callable unit of work.
///
/// # Examples
///
/// ```rust
/// use corral_api::Task;
///
/// let task = Task::new(7, || 7 * 6);
/// assert_eq!(task.id(), 7);
/// assert_eq!(task.run(), 42);
/// ```
pub struct Task {
    id: TaskId,
    work: TaskFn,
}

impl Task {
    /// Create a task from an id and its work.
    pub fn new<F>(id: TaskId, work: F) -> Self
    where
        F: FnOnce() -> TaskOutput + Send + 'static,
    {
        Self {
            id,
            work: Box::new(work),
        }
    }

    /// The task identifier.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Invoke the work, consuming the task.
    pub fn run(self) -> TaskOutput {
        (self.work)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
