//! Custom error types for the power sequencer.
//!
//! Two error types live here:
//!
//! - **`ResourceError`**: returned by the per-rail capability ([`PowerResource`]) and by the
//!   [`ResourceRegistry`] that resolves rails by name. These are the failures reported by
//!   whatever owns the physical rail.
//! - **`SequencerError`**: the crate-level error. Construction failures (`Config`,
//!   `Configuration`, `NoSupplies`, `Registration`) are fatal to building a controller.
//!   `VoltageConfig` and `Enable` abort an enable pass and always carry the index and label
//!   of the rail that failed, with the underlying `ResourceError` as the source.
//!
//! Disable-time failures and redundant enable/disable calls are not errors at all: they are
//! logged as warnings and the operation reports success.
//!
//! [`PowerResource`]: crate::hardware::PowerResource
//! [`ResourceRegistry`]: crate::hardware::ResourceRegistry

use thiserror::Error;

/// Convenience alias for results using the sequencer error type.
pub type SeqResult<T> = std::result::Result<T, SequencerError>;

/// Failure reported by a rail capability or by the registry resolving it.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The rail handle was never bound because resolution failed at construction.
    #[error("supply '{0}' has no resolved resource handle")]
    NotResolved(String),

    /// The registry has no rail with this name.
    #[error("no regulator named '{0}' in registry")]
    NotFound(String),

    /// The rail refused the requested voltage window.
    #[error("voltage range {min_microvolt}..={max_microvolt} uV rejected")]
    VoltageOutOfRange {
        /// Requested lower bound in microvolts.
        min_microvolt: u32,
        /// Requested upper bound in microvolts.
        max_microvolt: u32,
    },

    /// The rail refused the operation for a driver-specific reason.
    #[error("rail rejected operation: {0}")]
    Rejected(String),

    /// Transport failure talking to the rail.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-level error type.
#[derive(Error, Debug)]
pub enum SequencerError {
    #[error("Configuration load error: {0}")]
    Config(#[from] figment::Error),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("Invalid number of inputs: configuration lists no supplies")]
    NoSupplies,

    #[error("Supply {index} ('{label}'): failed to set voltage: {source}")]
    VoltageConfig {
        index: usize,
        label: String,
        #[source]
        source: ResourceError,
    },

    #[error("Supply {index} ('{label}'): failed to enable regulator: {source}")]
    Enable {
        index: usize,
        label: String,
        #[source]
        source: ResourceError,
    },

    #[error("Failed to register regulator: {0}")]
    Registration(String),

    #[error("Logging initialization error: {0}")]
    Logging(String),
}

impl SequencerError {
    /// Index of the sub-supply that caused the failure, if the error is tied to one.
    pub fn supply_index(&self) -> Option<usize> {
        match self {
            SequencerError::VoltageConfig { index, .. } | SequencerError::Enable { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }

    /// True for errors that make controller construction fail.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SequencerError::Config(_)
                | SequencerError::Configuration(_)
                | SequencerError::NoSupplies
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SequencerError::Enable {
            index: 2,
            label: "vddio".to_string(),
            source: ResourceError::Rejected("overcurrent".into()),
        };
        assert_eq!(
            err.to_string(),
            "Supply 2 ('vddio'): failed to enable regulator: rail rejected operation: overcurrent"
        );
        assert_eq!(err.supply_index(), Some(2));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_voltage_error_keeps_source() {
        use std::error::Error as _;

        let err = SequencerError::VoltageConfig {
            index: 0,
            label: "vdd_core".into(),
            source: ResourceError::VoltageOutOfRange {
                min_microvolt: 900_000,
                max_microvolt: 800_000,
            },
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("voltage range 900000..=800000 uV rejected")
        );
    }

    #[test]
    fn test_no_supplies_is_configuration() {
        assert!(SequencerError::NoSupplies.is_configuration());
        assert_eq!(SequencerError::NoSupplies.supply_index(), None);
    }
}
