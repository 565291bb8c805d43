//! Driver record.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use super::{random_delay, Passenger};
use crate::core::{Interrupt, Interrupted};

/// A driver that can be handed out by the driver pool.
///
/// `Driver` is not `Clone`. A driver lives either in the idle pool or inside
/// exactly one running booking.
#[derive(Debug, PartialEq, Eq)]
pub struct Driver {
    name: String,
    max_sleep: Duration,
}

impl Driver {
    /// Create a driver whose pickups take up to `max_sleep`.
    pub fn new(name: impl Into<String>, max_sleep: Duration) -> Self {
        Self {
            name: name.into(),
            max_sleep,
        }
    }

    /// Driver name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Travel to the passenger and pick them up.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] if `interrupt` fires while travelling.
    pub fn pick_up_passenger(
        &self,
        passenger: &Passenger,
        interrupt: &Interrupt,
    ) -> Result<(), Interrupted> {
        let delay = random_delay(self.max_sleep);
        debug!(
            driver = %self.name,
            passenger = %passenger.name(),
            delay_ms = delay.as_millis(),
            "driver heading to pickup"
        );
        interrupt.sleep(delay)
    }

    /// Drive the passenger to their destination.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] if `interrupt` fires while driving.
    pub fn drive_to_destination(
        &self,
        passenger: &Passenger,
        interrupt: &Interrupt,
    ) -> Result<(), Interrupted> {
        let delay = passenger.travel_time();
        debug!(
            driver = %self.name,
            passenger = %passenger.name(),
            delay_ms = delay.as_millis(),
            "driver heading to destination"
        );
        interrupt.sleep(delay)
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
