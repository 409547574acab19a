#![forbid(unsafe_code)]

//! Deferred execution with a timeout.
//!
//! [`defer`] runs a task on a worker thread and waits for it up to a timeout.
//! When the timeout passes first, the caller gets the fallback value and the
//! worker is left running detached; its [`CancelToken`] is tripped so a
//! cooperative task can notice and stop early. Nothing forces it to.
//!
//! ```
//! use std::time::Duration;
//! use candela::defer::{defer, Deferred};
//!
//! let slow = defer(
//!     |cancel| {
//!         // Sleeps until cancelled or 10s pass, whichever comes first.
//!         cancel.wait_timeout(Duration::from_secs(10));
//!         "late"
//!     },
//!     Duration::from_millis(20),
//!     "fallback",
//! );
//! assert_eq!(slow, Deferred::TimedOut("fallback"));
//! ```

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// Cooperative cancellation flag shared between the caller and a worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token and wake any waiter.
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep up to `duration`, waking early on cancellation.
    ///
    /// Returns `true` if cancelled.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut cancelled = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let start = Instant::now();
        while !*cancelled {
            let Some(remaining) = duration.checked_sub(start.elapsed()) else {
                return false;
            };
            let (guard, result) = cvar
                .wait_timeout(cancelled, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            cancelled = guard;
            if result.timed_out() && !*cancelled {
                return false;
            }
        }
        true
    }
}

/// How a deferred task ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred<T> {
    /// The task finished in time with this value.
    Completed(T),
    /// The timeout passed; this is the fallback value.
    TimedOut(T),
    /// The worker panicked or could not be started; this is the fallback value.
    Abandoned(T),
}

impl<T> Deferred<T> {
    /// The carried value, whichever way the task ended.
    pub fn into_inner(self) -> T {
        match self {
            Self::Completed(v) | Self::TimedOut(v) | Self::Abandoned(v) => v,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Run `task` on a worker thread, waiting at most `timeout` for its result.
pub fn defer<T, F>(task: F, timeout: Duration, default: T) -> Deferred<T>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken) -> T + Send + 'static,
{
    let token = CancelToken::new();
    let worker_token = token.clone();
    let (tx, rx) = mpsc::sync_channel(1);

    let spawned = thread::Builder::new()
        .name("candela-defer".into())
        .spawn(move || {
            let value = task(&worker_token);
            // The caller may have stopped waiting.
            let _ = tx.send(value);
        });
    if let Err(error) = spawned {
        tracing::warn!(%error, "could not start deferred task");
        return Deferred::Abandoned(default);
    }

    match rx.recv_timeout(timeout) {
        Ok(value) => Deferred::Completed(value),
        Err(RecvTimeoutError::Timeout) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(timeout_ms, "deferred task timed out");
            token.cancel();
            Deferred::TimedOut(default)
        }
        Err(RecvTimeoutError::Disconnected) => {
            tracing::warn!("deferred task ended without a result");
            Deferred::Abandoned(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn fast_task_completes() {
        let result = defer(|_| 21 * 2, Duration::from_secs(5), 0);
        assert_eq!(result, Deferred::Completed(42));
    }

    #[test]
    fn slow_task_times_out_and_is_cancelled() {
        let observed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&observed);
        let (done_tx, done_rx) = mpsc::channel();

        let result = defer(
            move |cancel| {
                let cancelled = cancel.wait_timeout(Duration::from_secs(5));
                flag.store(cancelled, Ordering::SeqCst);
                let _ = done_tx.send(());
                1
            },
            Duration::from_millis(20),
            -1,
        );
        assert_eq!(result, Deferred::TimedOut(-1));

        // The detached worker observes the cancellation.
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(observed.load(Ordering::SeqCst));
    }

    #[test]
    fn panicking_task_is_abandoned() {
        let result = defer(|_| -> i32 { panic!("boom") }, Duration::from_secs(5), 7);
        assert_eq!(result, Deferred::Abandoned(7));
        assert_eq!(result.into_inner(), 7);
    }

    #[test]
    fn token_wait_returns_false_without_cancel() {
        let token = CancelToken::new();
        assert!(!token.wait_timeout(Duration::from_millis(5)));
        token.cancel();
        assert!(token.is_cancelled());
        assert!(token.wait_timeout(Duration::from_secs(5)));
    }
}
