//! # Nuber Dispatch
//!
//! A ride-dispatch simulation built on OS threads and blocking queues.
//!
//! A [`Dispatcher`] owns one shared pool of idle drivers and a fixed set of
//! named regions. Each region runs bookings on its own worker threads, at most
//! `max_simultaneous_jobs` at a time. A booking takes a driver from the shared
//! pool (blocking while none is idle), simulates the pick-up and the trip, and
//! hands the driver back.
//!
//! ## Key Features
//!
//! - **Bounded Driver Pool**: FIFO hand-out, blocking `take`, capacity 999 by default
//! - **Per-Region Concurrency**: Independent worker pools, extra bookings queue
//! - **Non-Blocking Booking**: `book_passenger` returns a handle immediately
//! - **Graceful Shutdown**: Accepted bookings drain, new ones are rejected
//! - **Cancellation**: A booking waiting for a driver or on the road can be interrupted
//! - **Event Log**: Optional `<id>:<driver|null>:<passenger>: <message>` lines
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use std::time::Duration;
//! use nuber_dispatch::{Dispatcher, Driver, Passenger};
//!
//! let regions = HashMap::from([("CityA".to_string(), 1), ("CityB".to_string(), 2)]);
//! let dispatcher = Dispatcher::new(&regions, true)?;
//!
//! dispatcher.add_driver(Driver::new("D1", Duration::from_millis(100)))?;
//!
//! let handle = dispatcher
//!     .book_passenger(Passenger::new("P1", Duration::from_millis(100)), "CityA")?
//!     .expect("region accepts bookings");
//! let result = handle.wait()?;
//! println!("{result} took {} ms", result.duration_ms());
//!
//! dispatcher.shutdown();
//! dispatcher.await_termination(Duration::from_secs(5));
//! ```
//!
//! Dispatchers can also be built from JSON configuration, see
//! [`config::DispatchConfig`] and [`builders::build_dispatcher`].

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Dispatch core: driver pool, bookings, regions, and the dispatcher.
pub mod core;
/// Configuration models for the dispatcher and its regions.
pub mod config;
/// Builders to construct a dispatcher from code or configuration.
pub mod builders;
/// Drivers and passengers.
pub mod model;
/// Shared utilities.
pub mod util;

pub use builders::{build_dispatcher, DispatcherBuilder};
pub use config::{DispatchConfig, RegionConfig};
pub use self::core::{
    AppResult, BookingHandle, BookingResult, DispatchError, DispatchStats, Dispatcher,
    EventSink, InMemoryEventSink, Interrupt, Interrupted, RegionScheduler, StdoutEventSink,
};
pub use model::{Driver, Passenger};
