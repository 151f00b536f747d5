//! Sequencer configuration using Figment.
//!
//! Configuration is loaded from (in order of precedence, highest first):
//! 1. Environment variables prefixed with `POWERSEQ_` (nested keys separated by `__`)
//! 2. A TOML file (default: `config/powerseq.toml`)
//!
//! ```text
//! [device]
//! name = "multi-regulator.0"
//!
//! [logging]
//! level = "info"
//!
//! [constraints]
//! name = "soc_domain"
//! always_on = false
//!
//! [[supplies]]
//! name = "vdd_core"
//! min_microvolt = 800000
//! max_microvolt = 900000
//! power_on_delay_us = 100
//!
//! [[supplies]]
//! name = "vdd_io"
//! power_off_delay_us = 50
//! ```
//!
//! ```text
//! POWERSEQ_LOGGING__LEVEL=debug
//! POWERSEQ_DEVICE__NAME=board-rails
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::device::{RegulationConstraints, COMPATIBLE};
use crate::error::{SeqResult, SequencerError};
use crate::sequencer::check_labels;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Owning device settings
    pub device: DeviceConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Regulation constraints forwarded to registration
    #[serde(default)]
    pub constraints: Option<RegulationConstraints>,
    /// Rails in sequencing order
    #[serde(default)]
    pub supplies: Vec<SupplyEntry>,
}

/// Owning device settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device name; becomes the controller name
    pub name: String,
    /// Compatible string the device was matched on
    #[serde(default = "default_compatible")]
    pub compatible: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level or filter directive (`info`, `power_sequencer::sequencer=debug`)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// One sub-supply record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyEntry {
    /// Name the rail is resolved by
    pub name: String,
    /// Lower bound of the voltage window; 0 with `max_microvolt` 0 means "leave as is"
    #[serde(default)]
    pub min_microvolt: u32,
    /// Upper bound of the voltage window
    #[serde(default)]
    pub max_microvolt: u32,
    /// Wait after enabling this rail, in microseconds
    #[serde(default)]
    pub power_on_delay_us: u32,
    /// Wait after disabling this rail, in microseconds
    #[serde(default)]
    pub power_off_delay_us: u32,
}

impl SupplyEntry {
    /// Entry with only a name; every number defaults to 0.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

fn default_compatible() -> String {
    COMPATIBLE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl SequencerConfig {
    /// Load from `config/powerseq.toml` and the environment.
    pub fn load() -> SeqResult<Self> {
        Self::load_from("config/powerseq.toml")
    }

    /// Load from a specific TOML file merged with `POWERSEQ_` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or validation fails.
    pub fn load_from<P: AsRef<Path>>(path: P) -> SeqResult<Self> {
        let config: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("POWERSEQ_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse an in-memory TOML document (no environment overrides).
    pub fn from_toml_str(source: &str) -> SeqResult<Self> {
        let config: Self = Figment::new().merge(Toml::string(source)).extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Render back to TOML.
    pub fn to_toml_string(&self) -> SeqResult<String> {
        toml::to_string_pretty(self).map_err(|e| SequencerError::Configuration(e.to_string()))
    }

    /// Validate configuration after loading
    ///
    /// Checks:
    /// - Log level parses as a filter (`info`, `power_sequencer=debug`, ...)
    /// - Device name is non-empty and the compatible string is ours
    /// - At least one supply is listed
    /// - Supply names are non-empty and unique
    pub fn validate(&self) -> SeqResult<()> {
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(SequencerError::Configuration(format!(
                "Invalid log filter '{}': {}",
                self.logging.level, e
            )));
        }

        if self.device.name.is_empty() {
            return Err(SequencerError::Configuration(
                "device 'name' cannot be empty".to_string(),
            ));
        }

        if self.device.compatible != COMPATIBLE {
            return Err(SequencerError::Configuration(format!(
                "Unsupported compatible '{}'. Expected '{}'",
                self.device.compatible, COMPATIBLE
            )));
        }

        if self.supplies.is_empty() {
            return Err(SequencerError::NoSupplies);
        }

        check_labels(&self.device.name, self.supplies.iter().map(|s| s.name.as_str()))?;

        Ok(())
    }
}
