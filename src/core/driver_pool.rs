//! Shared pool of idle drivers.
//!
//! A bounded crossbeam channel holds the idle drivers. The pool owns both
//! ends, so the channel can never disconnect: `take` blocks until another
//! thread returns a driver, and `add` only fails when the pool is at capacity.

use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use super::error::{DispatchError, Interrupted};
use super::interrupt::Interrupt;
use crate::model::Driver;

/// Default capacity of the idle driver pool.
pub const DEFAULT_MAX_DRIVERS: usize = 999;

/// Bounded MPMC pool of idle drivers, handed out in arrival order.
#[derive(Debug)]
pub struct DriverPool {
    tx: Sender<Driver>,
    rx: Receiver<Driver>,
    capacity: usize,
}

impl DriverPool {
    /// Create a pool that holds at most `capacity` idle drivers (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = bounded(capacity);
        Self { tx, rx, capacity }
    }

    /// Return an idle driver to the pool. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DriverPoolFull`] if the pool is at capacity.
    pub fn add(&self, driver: Driver) -> Result<(), DispatchError> {
        match self.tx.try_send(driver) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(driver)) => {
                warn!(driver = %driver.name(), capacity = self.capacity, "driver pool is full");
                Err(DispatchError::DriverPoolFull(driver.name().to_owned()))
            }
            Err(TrySendError::Disconnected(driver)) => Err(DispatchError::Internal(format!(
                "driver pool closed while returning {}",
                driver.name()
            ))),
        }
    }

    /// Take the longest-idle driver, blocking until one is available.
    #[must_use]
    pub fn take(&self) -> Driver {
        match self.rx.recv() {
            Ok(driver) => driver,
            Err(_) => unreachable!("the pool holds its own sender"),
        }
    }

    /// Take a driver, or give up once `interrupt` fires.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] if the interrupt fired before a driver arrived.
    pub fn take_interruptible(&self, interrupt: &Interrupt) -> Result<Driver, Interrupted> {
        if interrupt.is_interrupted() {
            return Err(Interrupted);
        }
        select! {
            recv(self.rx) -> driver => match driver {
                Ok(driver) => Ok(driver),
                Err(_) => unreachable!("the pool holds its own sender"),
            },
            recv(interrupt.receiver()) -> _ => {
                debug!("driver wait interrupted");
                Err(Interrupted)
            }
        }
    }

    /// Number of drivers currently idle in the pool.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.rx.len()
    }

    /// Maximum number of idle drivers the pool can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DriverPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DRIVERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn driver(name: &str) -> Driver {
        Driver::new(name, Duration::ZERO)
    }

    #[test]
    fn test_take_in_arrival_order() {
        let pool = DriverPool::new(8);
        pool.add(driver("D1")).unwrap();
        pool.add(driver("D2")).unwrap();
        pool.add(driver("D3")).unwrap();
        assert_eq!(pool.idle_count(), 3);

        assert_eq!(pool.take().name(), "D1");
        assert_eq!(pool.take().name(), "D2");
        assert_eq!(pool.take().name(), "D3");
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_add_beyond_capacity_fails() {
        let pool = DriverPool::new(1);
        pool.add(driver("D1")).unwrap();

        let err = pool.add(driver("D2")).unwrap_err();
        assert!(matches!(err, DispatchError::DriverPoolFull(ref name) if name == "D2"));
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_take_blocks_until_driver_added() {
        let pool = Arc::new(DriverPool::new(4));
        let taker = Arc::clone(&pool);

        let handle = thread::spawn(move || taker.take().name().to_owned());

        thread::sleep(Duration::from_millis(30));
        assert!(!handle.is_finished());

        pool.add(driver("Late")).unwrap();
        assert_eq!(handle.join().unwrap(), "Late");
    }

    #[test]
    fn test_take_interruptible_gives_up() {
        let pool = Arc::new(DriverPool::new(4));
        let interrupt = Interrupt::new();
        let waiter_pool = Arc::clone(&pool);
        let waiter_interrupt = interrupt.clone();

        let handle = thread::spawn(move || {
            let start = Instant::now();
            let outcome = waiter_pool.take_interruptible(&waiter_interrupt);
            (outcome.map(|d| d.name().to_owned()), start.elapsed())
        });

        thread::sleep(Duration::from_millis(20));
        interrupt.interrupt();

        let (outcome, elapsed) = handle.join().unwrap();
        assert_eq!(outcome, Err(Interrupted));
        assert!(elapsed < Duration::from_secs(5));
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_take_interruptible_returns_available_driver() {
        let pool = DriverPool::new(4);
        pool.add(driver("Ready")).unwrap();
        let taken = pool.take_interruptible(&Interrupt::new()).unwrap();
        assert_eq!(taken.name(), "Ready");
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let pool = DriverPool::new(0);
        assert_eq!(pool.capacity(), 1);
        pool.add(driver("Only")).unwrap();
        assert_eq!(pool.take().name(), "Only");
    }
}
