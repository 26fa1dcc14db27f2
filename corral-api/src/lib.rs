//! # Corral API
//!
//! Types shared by the corral worker pool and the code that drives it.
//!
//! ## Core Components
//!
//! - [`task`]: the unit of work, an id plus a closure returning an integer
//! - [`status`]: tagged per-task records and the status derived from them
//! - [`lifecycle`]: pool states, events and the legal-transition table
//! - [`errors`]: the non-fatal error taxonomy
//! - [`stats`]: statistics snapshots for presentation layers
//! - [`pool`]: the [`TaskPool`] trait implemented by pool backends
//!
//! ## Usage Example
//!
//! ```rust
//! use corral_api::{PoolEvent, PoolState, Task, TaskRecord, TaskStatus};
//!
//! let task = Task::new(1, || 10);
//! let record = TaskRecord::Completed(task.run());
//! assert_eq!(record.status(), TaskStatus::Completed);
//!
//! let state = PoolState::Uninitialized.apply(PoolEvent::Start).unwrap();
//! assert!(state.is_working());
//! ```

pub mod errors;
pub mod lifecycle;
pub mod pool;
pub mod stats;
pub mod status;
pub mod task;

pub use errors::{PoolError, RejectReason};
pub use lifecycle::{PoolEvent, PoolState, ShutdownMode};
pub use pool::TaskPool;
pub use stats::{PoolStatistics, WorkerStatistics};
pub use status::{status_of, TaskRecord, TaskStatus};
pub use task::{Task, TaskFn, TaskId, TaskOutput};
