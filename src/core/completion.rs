//! One-shot result slot shared between a worker and the submitter.
//!
//! The worker side holds a [`Completer`] and resolves it exactly once. The
//! submitter side holds a [`Completion`] and waits on a Condvar; there is no
//! polling. A completer dropped without resolving (worker panic, pool torn
//! down) marks the slot abandoned so waiters never hang.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::error::DispatchError;

/// Result entry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultState {
    /// Waiting for result.
    Pending,
    /// Result is ready (it may already have been taken).
    Ready,
    /// The producer went away without a result.
    Abandoned,
}

struct ResultEntry<R> {
    result: Option<R>,
    state: ResultState,
}

impl<R> ResultEntry<R> {
    fn take(&mut self) -> Result<R, DispatchError> {
        match self.state {
            ResultState::Ready => self.result.take().ok_or(DispatchError::ResultNotFound),
            ResultState::Abandoned => Err(DispatchError::Abandoned),
            ResultState::Pending => Err(DispatchError::Timeout),
        }
    }
}

type SharedEntry<R> = Arc<(Mutex<ResultEntry<R>>, Condvar)>;

/// Create a connected completer/completion pair.
pub(crate) fn slot<R>() -> (Completer<R>, Completion<R>) {
    let entry: SharedEntry<R> = Arc::new((
        Mutex::new(ResultEntry {
            result: None,
            state: ResultState::Pending,
        }),
        Condvar::new(),
    ));
    (
        Completer {
            entry: Arc::clone(&entry),
            resolved: false,
        },
        Completion { entry },
    )
}

/// Producer half; resolves the slot once.
pub(crate) struct Completer<R> {
    entry: SharedEntry<R>,
    resolved: bool,
}

impl<R> Completer<R> {
    /// Store the result and wake every waiter.
    pub(crate) fn complete(mut self, result: R) {
        self.finish(Some(result));
    }

    fn finish(&mut self, result: Option<R>) {
        let (entry_mutex, condvar) = self.entry.as_ref();
        let mut entry = entry_mutex.lock();
        entry.state = if result.is_some() {
            ResultState::Ready
        } else {
            ResultState::Abandoned
        };
        entry.result = result;
        self.resolved = true;
        condvar.notify_all();
    }
}

impl<R> Drop for Completer<R> {
    fn drop(&mut self) {
        if !self.resolved {
            self.finish(None);
        }
    }
}

/// Consumer half; waits for the slot to resolve.
pub(crate) struct Completion<R> {
    entry: SharedEntry<R>,
}

impl<R> Clone for Completion<R> {
    fn clone(&self) -> Self {
        Self {
            entry: Arc::clone(&self.entry),
        }
    }
}

impl<R> Completion<R> {
    /// Block until resolved, then take the result.
    pub(crate) fn wait(&self) -> Result<R, DispatchError> {
        let (entry_mutex, condvar) = self.entry.as_ref();
        let mut entry = entry_mutex.lock();
        while entry.state == ResultState::Pending {
            condvar.wait(&mut entry);
        }
        entry.take()
    }

    /// Block until resolved or `timeout` elapses.
    ///
    /// A timeout too large to express as a deadline waits without one.
    pub(crate) fn wait_for(&self, timeout: Duration) -> Result<R, DispatchError> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.wait();
        };
        let (entry_mutex, condvar) = self.entry.as_ref();
        let mut entry = entry_mutex.lock();
        while entry.state == ResultState::Pending {
            if condvar.wait_until(&mut entry, deadline).timed_out() {
                break;
            }
        }
        entry.take()
    }

    /// Take the result if already resolved (non-blocking).
    pub(crate) fn try_take(&self) -> Option<Result<R, DispatchError>> {
        let mut entry = self.entry.0.lock();
        match entry.state {
            ResultState::Pending => None,
            ResultState::Ready | ResultState::Abandoned => Some(entry.take()),
        }
    }

    /// Whether the producer has resolved the slot.
    pub(crate) fn is_resolved(&self) -> bool {
        self.entry.0.lock().state != ResultState::Pending
    }
}
