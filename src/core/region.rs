//! Region scheduler: bounded concurrent execution of one region's bookings.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::booking::{Booking, BookingResult};
use super::dispatcher::DispatchCore;
use super::error::DispatchError;
use super::handle::BookingHandle;
use super::worker_pool::{PoolStats, WorkerExecutor, WorkerPool};
use crate::model::Passenger;

/// Runs bookings on a region's worker threads.
#[derive(Clone)]
struct BookingExecutor {
    region: Arc<str>,
    core: Arc<DispatchCore>,
}

impl WorkerExecutor<Booking, BookingResult> for BookingExecutor {
    fn execute(&self, booking: Booking) -> BookingResult {
        let result = booking.run();
        self.core
            .log_event(&result, &format!("finished in region {}", self.region));
        result
    }
}

/// One independently scheduled region.
///
/// At most `max_simultaneous_jobs` bookings run at once; further bookings are
/// accepted and wait for a free worker.
pub struct RegionScheduler {
    name: Arc<str>,
    max_simultaneous_jobs: usize,
    core: Arc<DispatchCore>,
    pool: WorkerPool<Booking, BookingResult, BookingExecutor>,
    /// `true` once shut down. Held across admission so a booking is either
    /// created and queued, or never created.
    closed: Mutex<bool>,
}

impl RegionScheduler {
    pub(crate) fn new(
        core: Arc<DispatchCore>,
        name: &str,
        max_simultaneous_jobs: usize,
    ) -> Result<Self, DispatchError> {
        let region: Arc<str> = Arc::from(name);
        let executor = BookingExecutor {
            region: Arc::clone(&region),
            core: Arc::clone(&core),
        };
        let pool = WorkerPool::new(&format!("region-{name}"), max_simultaneous_jobs, executor)?;
        info!(region = %name, max_simultaneous_jobs, "region created");

        Ok(Self {
            name: region,
            max_simultaneous_jobs,
            core,
            pool,
            closed: Mutex::new(false),
        })
    }

    /// Region name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of bookings running at once.
    #[must_use]
    pub const fn max_simultaneous_jobs(&self) -> usize {
        self.max_simultaneous_jobs
    }

    /// Create a booking for `passenger` and queue it for execution.
    ///
    /// Returns immediately. Returns `None`, without creating a booking, once
    /// the region has been shut down.
    pub fn book_passenger(&self, passenger: Passenger) -> Option<BookingHandle> {
        let closed = self.closed.lock();
        if *closed {
            drop(closed);
            self.reject(&passenger);
            return None;
        }

        let booking = Booking::with_core(Arc::clone(&self.core), passenger);
        let job_id = booking.job_id();
        let interrupt = booking.interrupt_handle();
        self.core
            .log_event(&booking, &format!("is created in region {}", self.name));

        match self.pool.submit(job_id, booking) {
            Ok(completion) => {
                debug!(region = %self.name, job_id, "booking queued");
                Some(BookingHandle::new(
                    job_id,
                    Arc::clone(&self.name),
                    interrupt,
                    completion,
                ))
            }
            Err(booking) => {
                self.reject(booking.passenger());
                None
            }
        }
    }

    fn reject(&self, passenger: &Passenger) {
        warn!(
            region = %self.name,
            passenger = %passenger.name(),
            "region is shut down, booking rejected"
        );
        self.core.log_line(&format!(
            "region {}: is shut down, rejects the booking of {}",
            self.name,
            passenger.name()
        ));
    }

    /// Stop accepting bookings. Already accepted bookings still run. Idempotent.
    pub fn shutdown(&self) {
        let mut closed = self.closed.lock();
        if *closed {
            return;
        }
        *closed = true;
        self.pool.shutdown();
        drop(closed);
        info!(region = %self.name, "region shut down");
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.closed.lock()
    }

    /// Wait up to `timeout` for accepted bookings to drain after shutdown.
    ///
    /// Returns `true` if every worker exited.
    pub fn await_termination(&self, timeout: Duration) -> bool {
        self.pool.await_termination(timeout)
    }

    /// Worker pool statistics for this region.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}
