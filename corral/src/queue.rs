use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use corral_api::{Task, TaskId};

/// A FIFO of tasks waiting for a worker, with a hard capacity.
///
/// The BoundedTaskQueue is owned by the `WorkerPool`. Submitters insert,
/// workers pop, and the controller removes or clears. A full queue rejects
/// the insertion and hands the task back; it never blocks the caller.
///
/// # Thread Safety
/// - A single `Mutex` guards the task list, so each operation is linearizable
/// - Tasks are `Send` but not `Sync`; the queue is `Sync` without requiring more
///
/// # Ordering
/// - Tasks leave in insertion order
/// - Removing a task by id leaves the relative order of the rest untouched
pub struct BoundedTaskQueue {
    /// Queued tasks, oldest at the front
    tasks: Mutex<VecDeque<Task>>,

    /// Maximum number of queued tasks
    capacity: usize,
}

impl fmt::Debug for BoundedTaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedTaskQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl BoundedTaskQueue {
    /// Creates an empty queue holding at most `capacity` tasks.
    pub fn new(capacity: usize) -> Self {
        Self {
            tasks: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a task if the queue has room.
    ///
    /// The capacity check and the append happen under one lock.
    ///
    /// # Returns
    /// * `Ok(len)` - The queue length right after the insertion
    /// * `Err(task)` - The queue was full; the task is handed back unchanged
    pub fn insert(&self, task: Task) -> Result<usize, Task> {
        let mut tasks = self.lock();
        if tasks.len() < self.capacity {
            tasks.push_back(task);
            Ok(tasks.len())
        } else {
            Err(task)
        }
    }

    /// Removes and returns the oldest task, or `None` if the queue is empty.
    pub fn pop(&self) -> Option<Task> {
        self.lock().pop_front()
    }

    /// Removes the first task with the given id.
    ///
    /// Absent ids are a no-op and return `None`.
    pub fn remove_by_id(&self, id: TaskId) -> Option<Task> {
        let mut tasks = self.lock();
        let position = tasks.iter().position(|task| task.id() == id)?;
        tasks.remove(position)
    }

    /// Discards every queued task and returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut tasks = self.lock();
        let discarded = tasks.len();
        tasks.clear();
        discarded
    }

    /// Visits the id of every queued task, oldest first.
    pub fn for_each_id<F>(&self, mut visitor: F)
    where
        F: FnMut(TaskId),
    {
        self.lock().iter().for_each(|task| visitor(task.id()));
    }

    /// Ids of the queued tasks, oldest first.
    pub fn ids(&self) -> Vec<TaskId> {
        self.lock().iter().map(Task::id).collect()
    }

    /// Number of queued tasks.
    ///
    /// This is a snapshot and may change by the time the value is used.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Checks if the queue is empty. Snapshot, like [`BoundedTaskQueue::len`].
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Checks if the next insertion would be rejected.
    pub fn is_full(&self) -> bool {
        self.lock().len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn task(id: TaskId) -> Task {
        Task::new(id, move || id as i64)
    }

    #[test]
    fn test_insert_until_full() {
        let queue = BoundedTaskQueue::new(3);
        assert_eq!(queue.insert(task(1)).ok(), Some(1));
        assert_eq!(queue.insert(task(2)).ok(), Some(2));
        assert_eq!(queue.insert(task(3)).ok(), Some(3));
        assert!(queue.is_full());

        let rejected = queue.insert(task(4)).unwrap_err();
        assert_eq!(rejected.id(), 4);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_pop_is_fifo() {
        let queue = BoundedTaskQueue::new(5);
        for id in [5, 3, 9] {
            queue.insert(task(id)).unwrap();
        }

        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|t| t.id()).collect();
        assert_eq!(order, vec![5, 3, 9]);
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_remove_by_id_keeps_relative_order() {
        let queue = BoundedTaskQueue::new(4);
        for id in 1..=4 {
            queue.insert(task(id)).unwrap();
        }

        let removed = queue.remove_by_id(2).map(|t| t.id());
        assert_eq!(removed, Some(2));
        assert_eq!(queue.ids(), vec![1, 3, 4]);
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let queue = BoundedTaskQueue::new(2);
        queue.insert(task(1)).unwrap();

        assert!(queue.remove_by_id(99).is_none());
        assert!(BoundedTaskQueue::new(1).remove_by_id(1).is_none());
        assert_eq!(queue.ids(), vec![1]);
    }

    #[test]
    fn test_remove_duplicate_id_takes_first() {
        let queue = BoundedTaskQueue::new(3);
        queue.insert(Task::new(7, || 1)).unwrap();
        queue.insert(task(8)).unwrap();
        queue.insert(Task::new(7, || 2)).unwrap();

        assert_eq!(queue.remove_by_id(7).map(Task::run), Some(1));
        assert_eq!(queue.ids(), vec![8, 7]);
    }

    #[test]
    fn test_clear_reports_discarded() {
        let queue = BoundedTaskQueue::new(3);
        queue.insert(task(1)).unwrap();
        queue.insert(task(2)).unwrap();

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.clear(), 0);
    }

    #[test]
    fn test_for_each_id_visits_in_order() {
        let queue = BoundedTaskQueue::new(3);
        for id in [30, 10, 20] {
            queue.insert(task(id)).unwrap();
        }

        let mut seen = Vec::new();
        queue.for_each_id(|id| seen.push(id));
        assert_eq!(seen, vec![30, 10, 20]);
    }

    #[test]
    fn test_concurrent_inserts_never_exceed_capacity() {
        let queue = Arc::new(BoundedTaskQueue::new(16));

        let threads: Vec<_> = (0..8)
            .map(|t| {
                let queue = queue.clone();
                thread::spawn(move || {
                    (0..10)
                        .filter(|i| queue.insert(task(t * 100 + i)).is_ok())
                        .count()
                })
            })
            .collect();

        let accepted: usize = threads.into_iter().map(|t| t.join().unwrap()).sum();
        assert_eq!(accepted, 16);
        assert_eq!(queue.len(), 16);
    }
}
