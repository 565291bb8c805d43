//! Dispatcher: owns the driver pool and the regions, routes bookings.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use super::booking::BookingSequence;
use super::driver_pool::DriverPool;
use super::error::{DispatchError, Interrupted};
use super::events::{render_event, EventSink};
use super::handle::BookingHandle;
use super::interrupt::Interrupt;
use super::region::RegionScheduler;
use super::worker_pool::PoolStats;
use crate::builders::DispatcherBuilder;
use crate::model::{Driver, Passenger};

/// Marks one booking as waiting for a driver for as long as it lives.
struct AwaitingTicket<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> AwaitingTicket<'a> {
    fn acquire(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for AwaitingTicket<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// State shared by the dispatcher, its regions, and every booking.
pub(crate) struct DispatchCore {
    drivers: DriverPool,
    awaiting_driver: AtomicUsize,
    sequence: BookingSequence,
    log_events: bool,
    sink: Arc<dyn EventSink>,
}

impl DispatchCore {
    pub(crate) fn new(max_drivers: usize, log_events: bool, sink: Arc<dyn EventSink>) -> Self {
        Self {
            drivers: DriverPool::new(max_drivers),
            awaiting_driver: AtomicUsize::new(0),
            sequence: BookingSequence::new(),
            log_events,
            sink,
        }
    }

    pub(crate) const fn sequence(&self) -> &BookingSequence {
        &self.sequence
    }

    pub(crate) fn get_driver(&self) -> Driver {
        let _ticket = AwaitingTicket::acquire(&self.awaiting_driver);
        self.drivers.take()
    }

    pub(crate) fn get_driver_interruptible(
        &self,
        interrupt: &Interrupt,
    ) -> Result<Driver, Interrupted> {
        let _ticket = AwaitingTicket::acquire(&self.awaiting_driver);
        self.drivers.take_interruptible(interrupt)
    }

    pub(crate) fn add_driver(&self, driver: Driver) -> Result<(), DispatchError> {
        self.drivers.add(driver)
    }

    pub(crate) fn idle_drivers(&self) -> usize {
        self.drivers.idle_count()
    }

    pub(crate) fn bookings_awaiting_driver(&self) -> usize {
        self.awaiting_driver.load(Ordering::SeqCst)
    }

    pub(crate) fn log_event(&self, subject: &dyn Display, message: &str) {
        if self.log_events {
            self.sink.record(&render_event(subject, message));
        }
    }

    pub(crate) fn log_line(&self, line: &str) {
        if self.log_events {
            self.sink.record(line);
        }
    }
}

/// Point-in-time view of the whole dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Bookings currently blocked waiting for a driver.
    pub bookings_awaiting_driver: usize,
    /// Drivers idle in the pool.
    pub idle_drivers: usize,
    /// Worker pool statistics per region.
    pub regions: BTreeMap<String, PoolStats>,
}

/// Top-level dispatcher.
///
/// Owns the shared driver pool and a fixed set of named regions. Bookings are
/// routed to their region by name; every region draws drivers from the same
/// pool.
pub struct Dispatcher {
    core: Arc<DispatchCore>,
    regions: HashMap<String, RegionScheduler>,
}

impl Dispatcher {
    /// Create a dispatcher with one region per entry of `region_info`
    /// (region name to maximum simultaneous bookings).
    ///
    /// Drivers are not created here; add them with [`add_driver`](Self::add_driver).
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidConfig` for a zero region limit and
    /// `DispatchError::Internal` if worker threads cannot be spawned.
    pub fn new(region_info: &HashMap<String, usize>, log_events: bool) -> Result<Self, DispatchError> {
        region_info
            .iter()
            .fold(DispatcherBuilder::new(), |builder, (name, limit)| {
                builder.region(name.as_str(), *limit)
            })
            .log_events(log_events)
            .build()
    }

    pub(crate) fn from_parts(
        core: DispatchCore,
        region_limits: &BTreeMap<String, usize>,
    ) -> Result<Self, DispatchError> {
        let core = Arc::new(core);
        let mut regions = HashMap::with_capacity(region_limits.len());
        for (name, limit) in region_limits {
            let region = RegionScheduler::new(Arc::clone(&core), name, *limit)?;
            regions.insert(name.clone(), region);
        }
        info!(regions = regions.len(), "dispatcher started");
        Ok(Self { core, regions })
    }

    pub(crate) const fn core(&self) -> &Arc<DispatchCore> {
        &self.core
    }

    /// Book `passenger` into the region named `region`.
    ///
    /// Returns `Ok(None)` if that region has been shut down.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnknownRegion` if no region has that name.
    pub fn book_passenger(
        &self,
        passenger: Passenger,
        region: &str,
    ) -> Result<Option<BookingHandle>, DispatchError> {
        let scheduler = self
            .regions
            .get(region)
            .ok_or_else(|| DispatchError::UnknownRegion(region.to_owned()))?;
        Ok(scheduler.book_passenger(passenger))
    }

    /// Take an idle driver, blocking until one is available.
    ///
    /// The caller counts as awaiting a driver while blocked.
    #[must_use]
    pub fn get_driver(&self) -> Driver {
        self.core.get_driver()
    }

    /// Add an idle driver to the shared pool.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::DriverPoolFull` if the pool is at capacity.
    pub fn add_driver(&self, driver: Driver) -> Result<(), DispatchError> {
        self.core.add_driver(driver)
    }

    /// Number of bookings currently blocked waiting for a driver, across all regions.
    #[must_use]
    pub fn bookings_awaiting_driver(&self) -> usize {
        self.core.bookings_awaiting_driver()
    }

    /// Number of drivers idle in the pool.
    #[must_use]
    pub fn idle_drivers(&self) -> usize {
        self.core.idle_drivers()
    }

    /// Render `<subject>: <message>` to the event sink if logging is enabled.
    pub fn log_event(&self, subject: &dyn Display, message: &str) {
        self.core.log_event(subject, message);
    }

    /// Look up a region by name.
    #[must_use]
    pub fn region(&self, name: &str) -> Option<&RegionScheduler> {
        self.regions.get(name)
    }

    /// Names of all regions, sorted.
    #[must_use]
    pub fn region_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.regions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Shut down every region. In-flight bookings keep their drivers and finish.
    pub fn shutdown(&self) {
        for region in self.regions.values() {
            region.shutdown();
        }
        info!("dispatcher shut down");
    }

    /// Wait up to `timeout` for every region to drain after shutdown.
    ///
    /// Returns `true` if all regions terminated in time.
    pub fn await_termination(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        self.regions.values().all(|region| {
            let remaining = deadline.map_or(Duration::MAX, |deadline| {
                deadline.saturating_duration_since(Instant::now())
            });
            region.await_termination(remaining)
        })
    }

    /// Snapshot of counters across the dispatcher and its regions.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            bookings_awaiting_driver: self.bookings_awaiting_driver(),
            idle_drivers: self.idle_drivers(),
            regions: self
                .regions
                .iter()
                .map(|(name, region)| (name.clone(), region.stats()))
                .collect(),
        }
    }
}
