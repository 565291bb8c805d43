//! Trip participants: drivers and passengers with simulated timing.

pub mod driver;
pub mod passenger;

pub use driver::Driver;
pub use passenger::Passenger;

use std::time::Duration;

use rand::Rng;

/// Uniformly random delay in `[0, max)` at millisecond resolution.
pub(crate) fn random_delay(max: Duration) -> Duration {
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..max_ms))
}
