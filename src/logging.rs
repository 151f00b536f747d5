//! Tracing initialization.
//!
//! `RUST_LOG` takes precedence over the configured level, so fine-grained filters such as
//! `RUST_LOG=power_sequencer::sequencer=debug` work without touching the config file.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{SeqResult, SequencerError};

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns [`SequencerError::Logging`] if the level does not parse as a filter or a global
/// subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) -> SeqResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| SequencerError::Logging(e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| SequencerError::Logging(e.to_string()))
}
