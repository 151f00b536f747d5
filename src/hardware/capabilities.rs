//! Per-rail power capability.

use crate::error::ResourceError;

/// Capability for a single controllable supply rail.
///
/// Implementations wrap whatever owns the physical rail (a PMIC register map, a GPIO
/// load switch, a lab supply). Calls are synchronous and may block; the sequencer issues
/// them strictly one at a time.
pub trait PowerResource: Send {
    /// Request an output voltage inside `[min_microvolt, max_microvolt]`.
    ///
    /// Values are passed through exactly as configured. A rail may reject a window it
    /// cannot regulate to, including an inverted one.
    fn set_voltage(&mut self, min_microvolt: u32, max_microvolt: u32)
        -> Result<(), ResourceError>;

    /// Energize the rail.
    fn enable(&mut self) -> Result<(), ResourceError>;

    /// De-energize the rail.
    fn disable(&mut self) -> Result<(), ResourceError>;
}
