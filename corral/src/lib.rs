// Corral worker pool
//
// A fixed-size set of worker threads executing integer-returning tasks from a
// bounded FIFO queue, with pause/resume and graceful, urgent or draining
// shutdown. Types shared with drivers live in the `corral-api` crate.

pub mod config;
pub mod logging;
pub mod pool;
pub mod queue;
pub mod report;

// Re-export commonly used types
pub use config::PoolConfig;
pub use pool::WorkerPool;
pub use queue::BoundedTaskQueue;
pub use corral_api::{
    PoolError, PoolState, PoolStatistics, RejectReason, ShutdownMode, Task, TaskId, TaskOutput,
    TaskPool, TaskRecord, TaskStatus, WorkerStatistics,
};
