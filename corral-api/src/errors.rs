//! # Pool Error Types
//!
//! None of these errors is fatal to the pool. Public pool operations handle
//! them locally: rejections bump a counter, illegal lifecycle calls become
//! no-ops, and the caller sees a boolean. The typed form is available through
//! the `try_*` operations and the lifecycle transition table.
//!
//! ## Usage Example
//!
//! ```rust
//! use corral_api::errors::{PoolError, RejectReason};
//!
//! fn describe(error: &PoolError) -> &'static str {
//!     match error {
//!         PoolError::Rejected(RejectReason::QueueFull { .. }) => "try again later",
//!         PoolError::Rejected(RejectReason::NotRunning) => "pool is down",
//!         _ => "lifecycle misuse",
//!     }
//! }
//! ```

use thiserror::Error;

use crate::lifecycle::{PoolEvent, PoolState};
use crate::task::TaskId;

/// Why a submission was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The pool is not initialized, or is shutting down.
    #[error("pool is not running")]
    NotRunning,

    /// The queue already holds `capacity` tasks.
    #[error("queue is full (capacity: {capacity})")]
    QueueFull { capacity: usize },
}

/// Errors produced by the pool and its lifecycle state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A submission was refused. Counted by the pool.
    #[error("Task rejected: {0}")]
    Rejected(RejectReason),

    /// Removal targeted an id that is not queued.
    #[error("Task not found in queue: {0}")]
    NotFound(TaskId),

    /// Terminate was requested on a pool that is not running.
    #[error("Pool is already terminated")]
    AlreadyTerminated,

    /// Initialize was requested on a pool that is running or mid-termination.
    #[error("Pool is already initialized")]
    InitializedTwice,

    /// Any other event that the current state does not accept.
    #[error("Cannot apply {event} while pool is {from}")]
    InvalidTransition { from: PoolState, event: PoolEvent },

    /// The pool configuration is unusable.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A worker thread could not be started.
    #[error("Failed to spawn worker: {0}")]
    SpawnError(String),
}

impl PoolError {
    /// True for submission refusals, the only errors that are counted.
    pub fn is_rejection(&self) -> bool {
        matches!(self, PoolError::Rejected(_))
    }
}
