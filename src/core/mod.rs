//! Dispatch core: driver pool, bookings, regions, and the dispatcher.

pub mod booking;
mod completion;
pub mod dispatcher;
pub mod driver_pool;
pub mod error;
pub mod events;
pub mod handle;
pub mod interrupt;
pub mod region;
mod worker_pool;

pub use booking::{Booking, BookingResult, BookingSequence, BookingState};
pub use dispatcher::{DispatchStats, Dispatcher};
pub use driver_pool::{DriverPool, DEFAULT_MAX_DRIVERS};
pub use error::{AppResult, DispatchError, Interrupted};
pub use events::{render_event, EventSink, InMemoryEventSink, StdoutEventSink};
pub use handle::BookingHandle;
pub use interrupt::Interrupt;
pub use region::RegionScheduler;
pub use worker_pool::PoolStats;
