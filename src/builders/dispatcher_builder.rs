//! Builders to construct a dispatcher from code or configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::DispatchConfig;
use crate::core::dispatcher::DispatchCore;
use crate::core::{DispatchError, Dispatcher, EventSink, StdoutEventSink, DEFAULT_MAX_DRIVERS};

/// Fluent builder for [`Dispatcher`].
///
/// Regions are registered by name; registering the same name twice keeps the
/// last limit. Events go to stdout unless another sink is supplied.
pub struct DispatcherBuilder {
    regions: BTreeMap<String, usize>,
    log_events: bool,
    max_drivers: usize,
    sink: Option<Arc<dyn EventSink>>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherBuilder {
    /// Builder with no regions, logging off, and the default driver capacity.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            regions: BTreeMap::new(),
            log_events: false,
            max_drivers: DEFAULT_MAX_DRIVERS,
            sink: None,
        }
    }

    /// Register a region allowing `max_simultaneous_jobs` concurrent bookings.
    #[must_use]
    pub fn region(mut self, name: impl Into<String>, max_simultaneous_jobs: usize) -> Self {
        self.regions.insert(name.into(), max_simultaneous_jobs);
        self
    }

    /// Enable or disable event logging.
    #[must_use]
    pub const fn log_events(mut self, log_events: bool) -> Self {
        self.log_events = log_events;
        self
    }

    /// Capacity of the idle driver pool.
    #[must_use]
    pub const fn max_drivers(mut self, max_drivers: usize) -> Self {
        self.max_drivers = max_drivers;
        self
    }

    /// Destination for event lines.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Names of the regions registered so far, sorted.
    #[must_use]
    pub fn region_names(&self) -> Vec<&str> {
        self.regions.keys().map(String::as_str).collect()
    }

    /// Build the dispatcher and start every region's workers.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidConfig` for a zero region limit or a
    /// zero driver capacity, and `DispatchError::Internal` if worker threads
    /// cannot be spawned.
    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        if self.max_drivers == 0 {
            return Err(DispatchError::InvalidConfig(
                "max_drivers must be greater than 0".into(),
            ));
        }
        if let Some((name, _)) = self.regions.iter().find(|(_, limit)| **limit == 0) {
            return Err(DispatchError::InvalidConfig(format!(
                "region `{name}`: max_simultaneous_jobs must be greater than 0"
            )));
        }

        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(StdoutEventSink) as Arc<dyn EventSink>);
        let core = DispatchCore::new(self.max_drivers, self.log_events, sink);
        Dispatcher::from_parts(core, &self.regions)
    }
}

/// Build a dispatcher from a validated configuration.
///
/// # Errors
///
/// Returns `DispatchError::InvalidConfig` if the configuration fails
/// validation, otherwise any error from [`DispatcherBuilder::build`].
pub fn build_dispatcher(cfg: &DispatchConfig) -> Result<Dispatcher, DispatchError> {
    cfg.validate()
        .map_err(|e| DispatchError::InvalidConfig(format!("config invalid: {e}")))?;

    cfg.regions
        .iter()
        .fold(DispatcherBuilder::new(), |builder, (name, region)| {
            builder.region(name.as_str(), region.max_simultaneous_jobs)
        })
        .log_events(cfg.log_events)
        .max_drivers(cfg.max_drivers)
        .build()
}
