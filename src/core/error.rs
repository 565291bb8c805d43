//! Error types for dispatch operations.

use thiserror::Error;

/// Errors produced by the dispatcher, its regions, and booking handles.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Booking requested against a region name that was never registered.
    #[error("unknown region: {0}")]
    UnknownRegion(String),
    /// The idle driver pool is at capacity; carries the rejected driver's name.
    #[error("driver pool is full, cannot accept {0}")]
    DriverPoolFull(String),
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A bounded wait for a booking result expired.
    #[error("timed out waiting for booking result")]
    Timeout,
    /// The booking result was already taken from its handle.
    #[error("booking result already retrieved")]
    ResultNotFound,
    /// The booking stopped without producing a result (worker panic).
    #[error("booking was abandoned before completing")]
    Abandoned,
    /// Internal failure (worker thread spawn, join error, etc.).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A blocking wait was abandoned because its [`Interrupt`](crate::core::Interrupt) fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("wait interrupted")]
pub struct Interrupted;

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
