//! Passenger record.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::random_delay;

/// A passenger waiting to be driven somewhere.
///
/// Apart from its name the passenger is opaque to the dispatcher; the only
/// behavior it carries is how long the ride to its destination takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    name: String,
    max_sleep: Duration,
}

impl Passenger {
    /// Create a passenger whose trips take up to `max_sleep`.
    pub fn new(name: impl Into<String>, max_sleep: Duration) -> Self {
        Self {
            name: name.into(),
            max_sleep,
        }
    }

    /// Passenger name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upper bound on the simulated travel time.
    #[must_use]
    pub const fn max_sleep(&self) -> Duration {
        self.max_sleep
    }

    /// Random travel time to the destination, below [`max_sleep`](Self::max_sleep).
    #[must_use]
    pub fn travel_time(&self) -> Duration {
        random_delay(self.max_sleep)
    }
}

impl fmt::Display for Passenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
