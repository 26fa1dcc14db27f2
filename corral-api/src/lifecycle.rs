//! # Pool Lifecycle
//!
//! The pool is always in exactly one [`PoolState`]. Every change goes through
//! [`PoolState::apply`], which holds the whole table of legal transitions:
//!
//! | from                    | event              | to                    |
//! |-------------------------|--------------------|-----------------------|
//! | Uninitialized           | Start              | Running               |
//! | Running, Paused         | Pause              | Paused                |
//! | Running, Paused         | Unpause            | Running               |
//! | Running, Paused         | Terminate(mode)    | Terminating(mode)     |
//! | Terminating             | WorkersJoined      | Terminated            |
//! | Terminated, Uninitialized | Reset            | Uninitialized         |
//!
//! Everything else is an error and the caller leaves the state untouched.

use std::fmt;

use crate::errors::PoolError;

/// How the pool treats queued tasks while shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownMode {
    /// Stop dequeuing; queued tasks are abandoned but stay in the queue.
    Graceful,
    /// Stop dequeuing and discard every queued task.
    Urgent,
    /// Keep dequeuing until the queue is empty, then stop.
    Drain,
}

/// Lifecycle state of a worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PoolState {
    /// No workers exist.
    #[default]
    Uninitialized,
    /// Workers are dequeuing and executing tasks.
    Running,
    /// Workers finish their current task and then hold off dequeuing.
    Paused,
    /// Workers are being released and joined.
    Terminating(ShutdownMode),
    /// All workers have been joined; about to reset.
    Terminated,
}

/// Requests that move the pool between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolEvent {
    /// At least one worker was spawned.
    Start,
    Pause,
    Unpause,
    Terminate(ShutdownMode),
    /// Every worker has exited and been joined.
    WorkersJoined,
    /// Return a finished pool to its initial state.
    Reset,
}

impl PoolState {
    /// Compute the state that `event` leads to, or the reason it is refused.
    pub fn apply(self, event: PoolEvent) -> Result<PoolState, PoolError> {
        use PoolEvent as E;
        use PoolState as S;

        match (self, event) {
            (S::Uninitialized, E::Start) => Ok(S::Running),
            (S::Running | S::Paused | S::Terminating(_) | S::Terminated, E::Start) => {
                Err(PoolError::InitializedTwice)
            }

            (S::Running | S::Paused, E::Pause) => Ok(S::Paused),
            (S::Running | S::Paused, E::Unpause) => Ok(S::Running),

            (S::Running | S::Paused, E::Terminate(mode)) => Ok(S::Terminating(mode)),
            (S::Uninitialized | S::Terminating(_) | S::Terminated, E::Terminate(_)) => {
                Err(PoolError::AlreadyTerminated)
            }

            (S::Terminating(_), E::WorkersJoined) => Ok(S::Terminated),
            (S::Terminated | S::Uninitialized, E::Reset) => Ok(S::Uninitialized),

            (from, event) => Err(PoolError::InvalidTransition { from, event }),
        }
    }

    /// True while the pool accepts submissions (running or paused).
    pub fn is_working(&self) -> bool {
        matches!(self, PoolState::Running | PoolState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, PoolState::Paused)
    }
}

impl fmt::Display for ShutdownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownMode::Graceful => f.write_str("graceful"),
            ShutdownMode::Urgent => f.write_str("urgent"),
            ShutdownMode::Drain => f.write_str("drain"),
        }
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolState::Uninitialized => f.write_str("uninitialized"),
            PoolState::Running => f.write_str("running"),
            PoolState::Paused => f.write_str("paused"),
            PoolState::Terminating(mode) => write!(f, "terminating ({})", mode),
            PoolState::Terminated => f.write_str("terminated"),
        }
    }
}

impl fmt::Display for PoolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolEvent::Start => f.write_str("start"),
            PoolEvent::Pause => f.write_str("pause"),
            PoolEvent::Unpause => f.write_str("unpause"),
            PoolEvent::Terminate(mode) => write!(f, "{} terminate", mode),
            PoolEvent::WorkersJoined => f.write_str("workers joined"),
            PoolEvent::Reset => f.write_str("reset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [PoolState; 7] = [
        PoolState::Uninitialized,
        PoolState::Running,
        PoolState::Paused,
        PoolState::Terminating(ShutdownMode::Graceful),
        PoolState::Terminating(ShutdownMode::Urgent),
        PoolState::Terminating(ShutdownMode::Drain),
        PoolState::Terminated,
    ];

    #[test]
    fn test_start_only_from_uninitialized() {
        for state in ALL_STATES {
            let result = state.apply(PoolEvent::Start);
            if state == PoolState::Uninitialized {
                assert_eq!(result, Ok(PoolState::Running));
            } else {
                assert_eq!(result, Err(PoolError::InitializedTwice), "from {state}");
            }
        }
    }

    #[test]
    fn test_pause_and_unpause_are_idempotent() {
        assert_eq!(PoolState::Running.apply(PoolEvent::Pause), Ok(PoolState::Paused));
        assert_eq!(PoolState::Paused.apply(PoolEvent::Pause), Ok(PoolState::Paused));
        assert_eq!(PoolState::Paused.apply(PoolEvent::Unpause), Ok(PoolState::Running));
        assert_eq!(PoolState::Running.apply(PoolEvent::Unpause), Ok(PoolState::Running));
    }

    #[test]
    fn test_pause_outside_working_states_is_invalid() {
        let result = PoolState::Uninitialized.apply(PoolEvent::Pause);
        assert!(matches!(
            result,
            Err(PoolError::InvalidTransition { from: PoolState::Uninitialized, event: PoolEvent::Pause })
        ));
        let draining = PoolState::Terminating(ShutdownMode::Drain);
        assert!(draining.apply(PoolEvent::Unpause).is_err());
    }

    #[test]
    fn test_terminate_from_paused_keeps_mode() {
        let next = PoolState::Paused.apply(PoolEvent::Terminate(ShutdownMode::Urgent));
        assert_eq!(next, Ok(PoolState::Terminating(ShutdownMode::Urgent)));
    }

    #[test]
    fn test_terminate_twice_is_already_terminated() {
        for state in [
            PoolState::Uninitialized,
            PoolState::Terminating(ShutdownMode::Graceful),
            PoolState::Terminated,
        ] {
            assert_eq!(
                state.apply(PoolEvent::Terminate(ShutdownMode::Graceful)),
                Err(PoolError::AlreadyTerminated)
            );
        }
    }

    #[test]
    fn test_shutdown_sequence() {
        let state = PoolState::Running
            .apply(PoolEvent::Terminate(ShutdownMode::Graceful))
            .and_then(|s| s.apply(PoolEvent::WorkersJoined))
            .and_then(|s| s.apply(PoolEvent::Reset));
        assert_eq!(state, Ok(PoolState::Uninitialized));
    }

    #[test]
    fn test_workers_joined_requires_terminating() {
        assert!(PoolState::Running.apply(PoolEvent::WorkersJoined).is_err());
        assert!(PoolState::Running.apply(PoolEvent::Reset).is_err());
    }

    #[test]
    fn test_working_states() {
        let working: Vec<_> = ALL_STATES.iter().filter(|s| s.is_working()).collect();
        assert_eq!(working, vec![&PoolState::Running, &PoolState::Paused]);
    }
}
