//! Booking: one passenger's trip from driver request to drop-off.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{error, warn};

use super::dispatcher::{DispatchCore, Dispatcher};
use super::error::Interrupted;
use super::interrupt::Interrupt;
use crate::model::{Driver, Passenger};

/// Issues booking IDs: unique, strictly increasing, starting at 1.
#[derive(Debug, Default)]
pub struct BookingSequence {
    last: AtomicU64,
}

impl BookingSequence {
    /// Create a sequence whose first ID is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Allocate the next ID. Safe to call from any number of threads.
    pub fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Most recently issued ID, or 0 if none.
    #[must_use]
    pub fn last_issued(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

/// Where a booking is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BookingState {
    /// Waiting for a driver from the pool.
    Requesting,
    /// Driver is on the way to the passenger.
    PickUp,
    /// Passenger is on board.
    Transit,
    /// Trip finished (or was abandoned) and the driver released.
    Completed,
}

/// Final summary of a booking. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingResult {
    /// Booking ID.
    pub job_id: u64,
    /// The passenger that was booked.
    pub passenger: Passenger,
    /// Name of the driver, absent if no driver was ever obtained.
    pub driver: Option<String>,
    /// Time from booking creation to completion.
    pub duration: Duration,
}

impl BookingResult {
    /// Trip duration in whole milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> u128 {
        self.duration.as_millis()
    }
}

impl fmt::Display for BookingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.job_id,
            self.driver.as_deref().unwrap_or("null"),
            self.passenger.name()
        )
    }
}

/// One passenger's trip.
///
/// A booking is created by a region, executed once on one of the region's
/// worker threads via [`run`](Self::run), and consumed in the process.
pub struct Booking {
    job_id: u64,
    core: Arc<DispatchCore>,
    passenger: Passenger,
    driver: Option<Driver>,
    state: BookingState,
    created_at: Instant,
    interrupt: Interrupt,
}

impl Booking {
    /// Create a booking for `passenger`, taking the next ID from `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: &Dispatcher, passenger: Passenger) -> Self {
        Self::with_core(Arc::clone(dispatcher.core()), passenger)
    }

    pub(crate) fn with_core(core: Arc<DispatchCore>, passenger: Passenger) -> Self {
        let job_id = core.sequence().next_id();
        Self {
            job_id,
            core,
            passenger,
            driver: None,
            state: BookingState::Requesting,
            created_at: Instant::now(),
            interrupt: Interrupt::new(),
        }
    }

    /// Booking ID.
    #[must_use]
    pub const fn job_id(&self) -> u64 {
        self.job_id
    }

    /// The booked passenger.
    #[must_use]
    pub const fn passenger(&self) -> &Passenger {
        &self.passenger
    }

    /// The assigned driver, if one has been obtained.
    #[must_use]
    pub const fn driver(&self) -> Option<&Driver> {
        self.driver.as_ref()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BookingState {
        self.state
    }

    /// A token that interrupts this booking's waits when fired.
    #[must_use]
    pub fn interrupt_handle(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Run the trip: acquire a driver, pick up, drive, release the driver.
    ///
    /// Blocks the calling thread for the whole trip. An interrupted driver
    /// wait completes without a driver; an interrupted pickup or drive still
    /// returns the driver to the pool.
    pub fn run(mut self) -> BookingResult {
        self.log("starts, asks for driver");
        match self.core.get_driver_interruptible(&self.interrupt) {
            Ok(driver) => self.driver = Some(driver),
            Err(Interrupted) => {
                warn!(job_id = self.job_id, "booking interrupted while waiting for a driver");
                self.log("was interrupted while waiting for a driver");
                return self.complete();
            }
        }
        self.log("has a driver");

        match self.drive() {
            Ok(()) => {
                let elapsed = self.created_at.elapsed();
                self.log(&format!("is at destination, using {} ms", elapsed.as_millis()));
            }
            Err(Interrupted) => {
                warn!(
                    job_id = self.job_id,
                    state = ?self.state,
                    "booking interrupted during trip"
                );
                self.log(&format!("was interrupted during {:?}", self.state));
            }
        }
        self.complete()
    }

    fn drive(&mut self) -> Result<(), Interrupted> {
        self.state = BookingState::PickUp;
        self.log("is picking up passenger");
        if let Some(driver) = &self.driver {
            driver.pick_up_passenger(&self.passenger, &self.interrupt)?;
        }
        self.log("has picked up passenger");

        self.state = BookingState::Transit;
        self.log("is traveling");
        if let Some(driver) = &self.driver {
            driver.drive_to_destination(&self.passenger, &self.interrupt)?;
        }
        Ok(())
    }

    fn complete(mut self) -> BookingResult {
        let duration = self.created_at.elapsed();
        self.state = BookingState::Completed;

        let driver_name = self.driver.as_ref().map(|d| d.name().to_owned());
        if self.driver.is_some() {
            self.log("driver finished task and is idle now");
        }
        if let Some(driver) = self.driver.take() {
            if let Err(e) = self.core.add_driver(driver) {
                error!(job_id = self.job_id, error = %e, "failed to return driver to pool");
            }
        }

        BookingResult {
            job_id: self.job_id,
            passenger: self.passenger,
            driver: driver_name,
            duration,
        }
    }

    fn log(&self, message: &str) {
        self.core.log_event(self, message);
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.job_id,
            self.driver.as_ref().map_or("null", Driver::name),
            self.passenger.name()
        )
    }
}

impl fmt::Debug for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Booking")
            .field("job_id", &self.job_id)
            .field("passenger", &self.passenger)
            .field("driver", &self.driver)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::DispatcherBuilder;
    use crate::core::events::InMemoryEventSink;
    use std::collections::HashSet;
    use std::thread;

    fn dispatcher() -> Dispatcher {
        DispatcherBuilder::new().region("Test", 1).build().unwrap()
    }

    #[test]
    fn test_sequence_starts_at_one() {
        let sequence = BookingSequence::new();
        assert_eq!(sequence.last_issued(), 0);
        assert_eq!(sequence.next_id(), 1);
        assert_eq!(sequence.next_id(), 2);
        assert_eq!(sequence.last_issued(), 2);
    }

    #[test]
    fn test_display_without_driver() {
        let dispatcher = dispatcher();
        let booking = Booking::new(&dispatcher, Passenger::new("Alice", Duration::ZERO));
        assert_eq!(booking.to_string(), format!("{}:null:Alice", booking.job_id()));
        assert_eq!(booking.state(), BookingState::Requesting);
        assert!(booking.driver().is_none());
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let dispatcher = dispatcher();
        let per_thread: Vec<Vec<u64>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..100)
                            .map(|_| {
                                Booking::new(&dispatcher, Passenger::new("P", Duration::ZERO))
                                    .job_id()
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut all = HashSet::new();
        for ids in &per_thread {
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
            for id in ids {
                assert!(all.insert(*id));
            }
        }
        assert_eq!(all.len(), 800);
    }

    #[test]
    fn test_run_returns_driver_to_pool() {
        let dispatcher = dispatcher();
        dispatcher
            .add_driver(Driver::new("D1", Duration::from_millis(5)))
            .unwrap();

        let booking = Booking::new(&dispatcher, Passenger::new("Bob", Duration::from_millis(5)));
        let job_id = booking.job_id();
        let result = booking.run();

        assert_eq!(result.job_id, job_id);
        assert_eq!(result.driver.as_deref(), Some("D1"));
        assert_eq!(result.passenger.name(), "Bob");
        assert_eq!(result.to_string(), format!("{job_id}:D1:Bob"));
        assert_eq!(dispatcher.idle_drivers(), 1);
        assert_eq!(dispatcher.bookings_awaiting_driver(), 0);
    }

    #[test]
    fn test_interrupted_driver_wait_completes_without_driver() {
        let dispatcher = dispatcher();
        let booking = Booking::new(&dispatcher, Passenger::new("Carol", Duration::ZERO));
        booking.interrupt_handle().interrupt();

        let result = booking.run();
        assert!(result.driver.is_none());
        assert_eq!(dispatcher.bookings_awaiting_driver(), 0);
        assert_eq!(dispatcher.idle_drivers(), 0);
    }

    #[test]
    fn test_interrupted_trip_still_releases_driver() {
        let dispatcher = dispatcher();
        dispatcher
            .add_driver(Driver::new("Slow", Duration::from_secs(30)))
            .unwrap();

        let booking = Booking::new(&dispatcher, Passenger::new("Dave", Duration::from_secs(30)));
        let interrupt = booking.interrupt_handle();
        let handle = thread::spawn(move || booking.run());

        thread::sleep(Duration::from_millis(50));
        interrupt.interrupt();

        let result = handle.join().unwrap();
        assert_eq!(result.driver.as_deref(), Some("Slow"));
        assert!(result.duration < Duration::from_secs(30));
        assert_eq!(dispatcher.idle_drivers(), 1);
    }

    #[test]
    fn test_run_logs_each_transition() {
        let sink = Arc::new(InMemoryEventSink::new(64));
        let dispatcher = DispatcherBuilder::new()
            .region("Test", 1)
            .log_events(true)
            .event_sink(sink.clone())
            .build()
            .unwrap();
        dispatcher.add_driver(Driver::new("D1", Duration::ZERO)).unwrap();

        let booking = Booking::new(&dispatcher, Passenger::new("Eve", Duration::ZERO));
        let id = booking.job_id();
        booking.run();

        let lines = sink.lines();
        assert_eq!(lines[0], format!("{id}:null:Eve: starts, asks for driver"));
        assert_eq!(lines[1], format!("{id}:D1:Eve: has a driver"));
        assert_eq!(lines[2], format!("{id}:D1:Eve: is picking up passenger"));
        assert_eq!(lines[3], format!("{id}:D1:Eve: has picked up passenger"));
        assert_eq!(lines[4], format!("{id}:D1:Eve: is traveling"));
        assert!(lines[5].starts_with(&format!("{id}:D1:Eve: is at destination, using ")));
        assert_eq!(lines[6], format!("{id}:D1:Eve: driver finished task and is idle now"));
        assert_eq!(lines.len(), 7);
    }
}
