//! Rail capabilities consumed by the sequencer.
//!
//! The sequencer never talks to hardware directly. Each sub-supply holds a
//! [`PowerResource`] handle obtained from a [`ResourceRegistry`] at construction time.
//!
//! - `capabilities` - the per-rail trait (set voltage, enable, disable)
//! - `registry` - name-based resolution of rail handles
//! - `mock` - simulated rails with a shared operation log, for tests and the CLI

pub mod capabilities;
pub mod mock;
pub mod registry;

pub use capabilities::PowerResource;
pub use registry::ResourceRegistry;
