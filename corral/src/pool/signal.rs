use std::fmt;
use std::sync::{Condvar, MutexGuard, PoisonError};

/// A named place where workers park until a condition on the guarded state
/// holds.
///
/// The predicate is evaluated with the lock held, and evaluated again after
/// every wake, so spurious wakeups and stolen work just put the caller back
/// to sleep. Anything that changes the outcome of a predicate must take the
/// same lock before calling [`WaitPoint::wake_one`] or
/// [`WaitPoint::wake_all`]; that is what rules out a missed wake.
pub(crate) struct WaitPoint {
    name: &'static str,
    condvar: Condvar,
}

impl fmt::Debug for WaitPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitPoint").field("name", &self.name).finish()
    }
}

impl WaitPoint {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            condvar: Condvar::new(),
        }
    }

    /// Block while `blocked` returns true.
    pub(crate) fn wait_while<'a, T, F>(&self, guard: MutexGuard<'a, T>, blocked: F) -> MutexGuard<'a, T>
    where
        F: FnMut(&mut T) -> bool,
    {
        self.condvar
            .wait_while(guard, blocked)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until `poll` produces a value.
    pub(crate) fn wait_for<'a, T, R, F>(&self, mut guard: MutexGuard<'a, T>, mut poll: F) -> (MutexGuard<'a, T>, R)
    where
        F: FnMut(&mut T) -> Option<R>,
    {
        loop {
            if let Some(outcome) = poll(&mut guard) {
                return (guard, outcome);
            }
            tracing::trace!(wait_point = self.name, "parking");
            guard = self.condvar.wait(guard).unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub(crate) fn wake_one(&self) {
        self.condvar.notify_one();
    }

    pub(crate) fn wake_all(&self) {
        self.condvar.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wait_for_returns_immediately_when_ready() {
        let point = WaitPoint::new("ready");
        let state = Mutex::new(5);
        let (_guard, value) = point.wait_for(state.lock().unwrap(), |n| Some(*n * 2));
        assert_eq!(value, 10);
    }

    #[test]
    fn test_wait_for_wakes_on_change() {
        let shared = Arc::new((Mutex::new(None::<u32>), WaitPoint::new("slot")));

        let waiter = {
            let shared = shared.clone();
            thread::spawn(move || {
                let (state, point) = &*shared;
                let (_guard, value) = point.wait_for(state.lock().unwrap(), |slot| slot.take());
                value
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());

        {
            let (state, point) = &*shared;
            *state.lock().unwrap() = Some(17);
            point.wake_one();
        }
        assert_eq!(waiter.join().unwrap(), 17);
    }

    #[test]
    fn test_wait_while_releases_all_waiters() {
        let shared = Arc::new((Mutex::new(true), WaitPoint::new("gate")));

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let (closed, point) = &*shared;
                    let guard = point.wait_while(closed.lock().unwrap(), |closed| *closed);
                    assert!(!*guard);
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        {
            let (closed, point) = &*shared;
            *closed.lock().unwrap() = false;
            point.wake_all();
        }
        assert!(waiters.into_iter().all(|w| w.join().is_ok()));
    }
}
