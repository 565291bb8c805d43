//! Dispatcher and region configuration structures.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, DEFAULT_MAX_DRIVERS};

/// Environment variable naming a JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "NUBER_DISPATCH_CONFIG";
/// Environment variable overriding `log_events` (`true`/`false`, `1`/`0`, `on`/`off`).
pub const LOG_EVENTS_ENV: &str = "NUBER_LOG_EVENTS";

fn default_max_simultaneous_jobs() -> usize {
    num_cpus::get()
}

const fn default_max_drivers() -> usize {
    DEFAULT_MAX_DRIVERS
}

/// Per-region configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Maximum bookings the region runs at once (defaults to the CPU count).
    #[serde(default = "default_max_simultaneous_jobs")]
    pub max_simultaneous_jobs: usize,
}

impl RegionConfig {
    /// Region allowing `max_simultaneous_jobs` concurrent bookings.
    #[must_use]
    pub const fn new(max_simultaneous_jobs: usize) -> Self {
        Self {
            max_simultaneous_jobs,
        }
    }

    /// Validate region configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_simultaneous_jobs == 0 {
            return Err("max_simultaneous_jobs must be greater than 0".into());
        }
        Ok(())
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self::new(default_max_simultaneous_jobs())
    }
}

/// Root dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Map of region name to configuration.
    pub regions: HashMap<String, RegionConfig>,
    /// Whether booking events are written to the event sink.
    #[serde(default)]
    pub log_events: bool,
    /// Capacity of the idle driver pool.
    #[serde(default = "default_max_drivers")]
    pub max_drivers: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchConfig {
    /// Empty configuration with logging off and the default driver capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regions: HashMap::new(),
            log_events: false,
            max_drivers: DEFAULT_MAX_DRIVERS,
        }
    }

    /// Add or replace a region.
    #[must_use]
    pub fn with_region(mut self, name: impl Into<String>, max_simultaneous_jobs: usize) -> Self {
        self.regions
            .insert(name.into(), RegionConfig::new(max_simultaneous_jobs));
        self
    }

    /// Enable or disable event logging.
    #[must_use]
    pub const fn with_log_events(mut self, log_events: bool) -> Self {
        self.log_events = log_events;
        self
    }

    /// Set the driver pool capacity.
    #[must_use]
    pub const fn with_max_drivers(mut self, max_drivers: usize) -> Self {
        self.max_drivers = max_drivers;
        self
    }

    /// Validate all regions and ensure at least one region exists.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.regions.is_empty() {
            return Err("at least one region must be defined".into());
        }
        if self.max_drivers == 0 {
            return Err("max_drivers must be greater than 0".into());
        }
        for (name, region) in &self.regions {
            if name.trim().is_empty() {
                return Err("region names must not be blank".into());
            }
            region
                .validate()
                .map_err(|e| format!("region `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, parsed, or validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading dispatch config {}", path.display()))?;
        Self::from_json_str(&raw)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("loading dispatch config {}", path.display()))
    }

    /// Load configuration from the environment.
    ///
    /// Reads `.env` if present, loads the file named by
    /// [`CONFIG_PATH_ENV`], then applies [`LOG_EVENTS_ENV`] on top.
    ///
    /// # Errors
    ///
    /// Fails if the path variable is unset, the file is invalid, or the
    /// logging override is not a recognised flag.
    pub fn from_env() -> AppResult<Self> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();

        let path = std::env::var(CONFIG_PATH_ENV)
            .with_context(|| format!("{CONFIG_PATH_ENV} is not set"))?;
        let mut cfg = Self::from_json_file(&path)?;

        if let Ok(raw) = std::env::var(LOG_EVENTS_ENV) {
            cfg.log_events = parse_flag(&raw)
                .ok_or_else(|| anyhow!("{LOG_EVENTS_ENV} has unrecognised value `{raw}`"))?;
        }
        Ok(cfg)
    }

    /// Region name to limit map, as accepted by [`Dispatcher::new`](crate::core::Dispatcher::new).
    #[must_use]
    pub fn region_limits(&self) -> HashMap<String, usize> {
        self.regions
            .iter()
            .map(|(name, region)| (name.clone(), region.max_simultaneous_jobs))
            .collect()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
