//! Handle to a submitted booking's eventual result.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::booking::BookingResult;
use super::completion::Completion;
use super::error::DispatchError;
use super::interrupt::Interrupt;

/// Future-style handle returned when a region accepts a booking.
///
/// The region resolves it exactly once, when the booking finishes. Bookings
/// complete in no particular order.
pub struct BookingHandle {
    job_id: u64,
    region: Arc<str>,
    interrupt: Interrupt,
    completion: Completion<BookingResult>,
}

impl BookingHandle {
    pub(crate) const fn new(
        job_id: u64,
        region: Arc<str>,
        interrupt: Interrupt,
        completion: Completion<BookingResult>,
    ) -> Self {
        Self {
            job_id,
            region,
            interrupt,
            completion,
        }
    }

    /// ID of the booking behind this handle.
    #[must_use]
    pub const fn job_id(&self) -> u64 {
        self.job_id
    }

    /// Name of the region running the booking.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Block until the booking finishes.
    ///
    /// # Errors
    ///
    /// `DispatchError::Abandoned` if the booking panicked,
    /// `DispatchError::ResultNotFound` if the result was already taken.
    pub fn wait(self) -> Result<BookingResult, DispatchError> {
        self.completion.wait()
    }

    /// Block for at most `timeout`.
    ///
    /// # Errors
    ///
    /// `DispatchError::Timeout` if the booking is still running, otherwise as
    /// for [`wait`](Self::wait).
    pub fn wait_timeout(&self, timeout: Duration) -> Result<BookingResult, DispatchError> {
        self.completion.wait_for(timeout)
    }

    /// Take the result if the booking already finished.
    #[must_use]
    pub fn try_result(&self) -> Option<Result<BookingResult, DispatchError>> {
        self.completion.try_take()
    }

    /// Whether the booking has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.completion.is_resolved()
    }

    /// Interrupt the booking's current wait.
    ///
    /// A booking still waiting for a driver gives up and completes without
    /// one; a booking mid-trip stops early but still returns its driver. The
    /// handle resolves either way. Has no effect once the booking finished.
    pub fn cancel(&self) {
        self.interrupt.interrupt();
    }

    /// Wait for the result without blocking the async runtime.
    ///
    /// The Condvar wait runs on tokio's blocking thread pool.
    ///
    /// # Errors
    ///
    /// `DispatchError::Timeout` if the booking does not finish within
    /// `timeout`, otherwise as for [`wait`](Self::wait).
    #[cfg(feature = "tokio-runtime")]
    pub async fn wait_async(self, timeout: Duration) -> Result<BookingResult, DispatchError> {
        let completion = self.completion.clone();
        tokio::task::spawn_blocking(move || completion.wait_for(timeout))
            .await
            .map_err(|e| DispatchError::Internal(format!("result waiter failed: {e}")))?
    }
}

impl fmt::Debug for BookingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingHandle")
            .field("job_id", &self.job_id)
            .field("region", &self.region)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}
