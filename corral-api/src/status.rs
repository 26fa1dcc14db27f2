use std::fmt;

use crate::task::TaskOutput;

/// Observable progress of a task, as derived from its recorded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Never dequeued: unknown id, still queued, removed, or discarded.
    NotStarted,
    /// A worker is currently running the task.
    Executing,
    /// The task ran to completion and its output was recorded.
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::NotStarted => "not started",
            TaskStatus::Executing => "executing",
            TaskStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// What the pool remembers about a task id once a worker has picked it up.
///
/// Ids that were never dequeued have no record at all, so the output value
/// never doubles as a status marker: `Completed(0)` and `Completed(-1)` are
/// ordinary results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRecord {
    Executing,
    Completed(TaskOutput),
}

impl TaskRecord {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskRecord::Executing => TaskStatus::Executing,
            TaskRecord::Completed(_) => TaskStatus::Completed,
        }
    }

    /// The recorded output, if the task has completed.
    pub fn output(&self) -> Option<TaskOutput> {
        match self {
            TaskRecord::Executing => None,
            TaskRecord::Completed(value) => Some(*value),
        }
    }
}

/// Status of an optional record; a missing record reads as not started.
pub fn status_of(record: Option<&TaskRecord>) -> TaskStatus {
    record.map_or(TaskStatus::NotStarted, TaskRecord::status)
}
