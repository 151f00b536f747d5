//! Core library for the power_sequencer controller.
//!
//! A composite regulator: several physical supply rails brought up and down in a fixed
//! order behind one logical on/off switch, with a voltage window programmed before each
//! rail is energized and a settle delay after each step.
//!
//! - [`sequencer`] - the enable/disable state machine
//! - [`hardware`] - rail capability traits and simulated rails
//! - [`device`] - construction from configuration and framework registration
//! - [`config`] - Figment-based configuration
//! - [`logging`] - tracing setup
//! - [`error`] - error types

pub mod config;
pub mod device;
pub mod error;
pub mod hardware;
pub mod logging;
pub mod sequencer;

pub use device::probe;
pub use error::{ResourceError, SeqResult, SequencerError};
pub use sequencer::{SequenceController, SubSupply};
