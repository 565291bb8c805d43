//! Configuration models for the dispatcher and its regions.

pub mod dispatch;

pub use dispatch::{DispatchConfig, RegionConfig, CONFIG_PATH_ENV, LOG_EVENTS_ENV};
