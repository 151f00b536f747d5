//! Mock Hardware Implementations
//!
//! Provides simulated supply rails for testing without physical hardware.
//! Every mock shares an [`OpLog`] so tests can assert the exact order in which the
//! sequencer touched the rails and waited between them.
//!
//! # Available Mocks
//!
//! - `MockRail` - Simulated rail with voltage window, enable state and fault injection
//! - `MockRegistry` - Name-based registry handing out `MockRail`s, with missing rails
//! - `RecordingDelay` - Settle delay that logs the requested wait instead of sleeping

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ResourceError;
use crate::hardware::{PowerResource, ResourceRegistry};
use crate::sequencer::delay::SettleDelay;

// =============================================================================
// Operation Log
// =============================================================================

/// One observable step performed against the simulated bench.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RailOp {
    /// `set_voltage` reached the rail (whether or not it was accepted).
    SetVoltage {
        /// Rail name
        rail: String,
        /// Requested minimum in microvolts
        min_microvolt: u32,
        /// Requested maximum in microvolts
        max_microvolt: u32,
    },
    /// `enable` reached the rail.
    Enable(String),
    /// `disable` reached the rail.
    Disable(String),
    /// The sequencer waited this long before touching the next rail.
    Settle(Duration),
}

/// Shared, ordered record of every [`RailOp`].
#[derive(Debug, Clone, Default)]
pub struct OpLog(Arc<Mutex<Vec<RailOp>>>);

impl OpLog {
    fn push(&self, op: RailOp) {
        self.0.lock().push(op);
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<RailOp> {
        self.0.lock().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.0.lock().clear();
    }

    /// Number of recorded operations.
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

// =============================================================================
// MockRail - Simulated Supply Rail
// =============================================================================

/// Which operations a [`MockRail`] should refuse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RailFaults {
    /// Refuse every `set_voltage` call
    pub set_voltage: bool,
    /// Refuse every `enable` call
    pub enable: bool,
    /// Refuse every `disable` call
    pub disable: bool,
}

impl RailFaults {
    /// Fail `set_voltage` only.
    pub fn set_voltage() -> Self {
        Self {
            set_voltage: true,
            ..Self::default()
        }
    }

    /// Fail `enable` only.
    pub fn enable() -> Self {
        Self {
            enable: true,
            ..Self::default()
        }
    }

    /// Fail `disable` only.
    pub fn disable() -> Self {
        Self {
            disable: true,
            ..Self::default()
        }
    }
}

/// Observable state of a simulated rail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RailState {
    /// Rail is currently energized
    pub enabled: bool,
    /// Last accepted voltage window
    pub voltage: Option<(u32, u32)>,
    /// Number of successful enable calls
    pub enable_count: u32,
    /// Number of successful disable calls
    pub disable_count: u32,
}

/// Mock supply rail.
///
/// Simulates a regulator that:
/// - records every call in the shared [`OpLog`] before acting on it
/// - rejects inverted voltage windows (`min > max`)
/// - exposes its state through a shared handle after ownership moves to a controller
///
/// # Example
///
/// ```rust,ignore
/// let log = OpLog::default();
/// let mut rail = MockRail::new("vdd_core", log.clone());
/// rail.set_voltage(800_000, 900_000)?;
/// rail.enable()?;
/// assert!(rail.state().enabled);
/// ```
pub struct MockRail {
    name: String,
    log: OpLog,
    faults: RailFaults,
    state: Arc<Mutex<RailState>>,
}

impl MockRail {
    /// Create a healthy rail that logs into `log`.
    pub fn new(name: impl Into<String>, log: OpLog) -> Self {
        Self {
            name: name.into(),
            log,
            faults: RailFaults::default(),
            state: Arc::new(Mutex::new(RailState::default())),
        }
    }

    /// Inject faults into this rail.
    pub fn with_faults(mut self, faults: RailFaults) -> Self {
        self.faults = faults;
        self
    }

    /// Current simulated state.
    pub fn state(&self) -> RailState {
        *self.state.lock()
    }

    fn state_handle(&self) -> Arc<Mutex<RailState>> {
        self.state.clone()
    }
}

impl PowerResource for MockRail {
    fn set_voltage(
        &mut self,
        min_microvolt: u32,
        max_microvolt: u32,
    ) -> Result<(), ResourceError> {
        self.log.push(RailOp::SetVoltage {
            rail: self.name.clone(),
            min_microvolt,
            max_microvolt,
        });

        if self.faults.set_voltage {
            return Err(ResourceError::Rejected(format!(
                "{}: voltage programming failed",
                self.name
            )));
        }
        if min_microvolt > max_microvolt {
            return Err(ResourceError::VoltageOutOfRange {
                min_microvolt,
                max_microvolt,
            });
        }

        self.state.lock().voltage = Some((min_microvolt, max_microvolt));
        Ok(())
    }

    fn enable(&mut self) -> Result<(), ResourceError> {
        self.log.push(RailOp::Enable(self.name.clone()));

        if self.faults.enable {
            return Err(ResourceError::Rejected(format!(
                "{}: enable failed",
                self.name
            )));
        }

        let mut state = self.state.lock();
        state.enabled = true;
        state.enable_count += 1;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ResourceError> {
        self.log.push(RailOp::Disable(self.name.clone()));

        if self.faults.disable {
            return Err(ResourceError::Rejected(format!(
                "{}: disable failed",
                self.name
            )));
        }

        let mut state = self.state.lock();
        state.enabled = false;
        state.disable_count += 1;
        Ok(())
    }
}

// =============================================================================
// MockRegistry - Simulated Regulator Registry
// =============================================================================

/// Registry of simulated rails.
///
/// Any name resolves to a fresh [`MockRail`] unless it was marked missing. State of every
/// rail handed out stays inspectable through [`MockRegistry::rail_state`].
#[derive(Default)]
pub struct MockRegistry {
    log: OpLog,
    missing: HashSet<String>,
    faults: HashMap<String, RailFaults>,
    rails: HashMap<String, Arc<Mutex<RailState>>>,
}

impl MockRegistry {
    /// Create an empty registry with its own log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `name` fail to resolve.
    pub fn with_missing(mut self, name: impl Into<String>) -> Self {
        self.missing.insert(name.into());
        self
    }

    /// Inject faults into the rail that will be handed out for `name`.
    pub fn with_faults(mut self, name: impl Into<String>, faults: RailFaults) -> Self {
        self.faults.insert(name.into(), faults);
        self
    }

    /// Shared log every rail from this registry writes to.
    pub fn log(&self) -> OpLog {
        self.log.clone()
    }

    /// State of a rail previously handed out by [`ResourceRegistry::resolve`].
    pub fn rail_state(&self, name: &str) -> Option<RailState> {
        self.rails.get(name).map(|state| *state.lock())
    }
}

impl ResourceRegistry for MockRegistry {
    fn resolve(&mut self, name: &str) -> Result<Box<dyn PowerResource>, ResourceError> {
        if self.missing.contains(name) {
            return Err(ResourceError::NotFound(name.to_string()));
        }

        let faults = self.faults.get(name).copied().unwrap_or_default();
        let rail = MockRail::new(name, self.log.clone()).with_faults(faults);
        self.rails.insert(name.to_string(), rail.state_handle());
        Ok(Box::new(rail))
    }
}

// =============================================================================
// RecordingDelay - Simulated Settle Delay
// =============================================================================

/// Settle delay that records requested waits into an [`OpLog`] instead of sleeping.
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    log: OpLog,
}

impl RecordingDelay {
    /// Record waits into `log`, interleaved with rail operations.
    pub fn new(log: OpLog) -> Self {
        Self { log }
    }
}

impl SettleDelay for RecordingDelay {
    fn settle(&mut self, delay: Duration) {
        self.log.push(RailOp::Settle(delay));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_rail_enable_disable() {
        let log = OpLog::default();
        let mut rail = MockRail::new("vdd_core", log.clone());

        rail.enable().unwrap();
        assert!(rail.state().enabled);
        assert_eq!(rail.state().enable_count, 1);

        rail.disable().unwrap();
        assert!(!rail.state().enabled);
        assert_eq!(rail.state().disable_count, 1);

        assert_eq!(
            log.snapshot(),
            vec![
                RailOp::Enable("vdd_core".into()),
                RailOp::Disable("vdd_core".into()),
            ]
        );
    }

    #[test]
    fn test_mock_rail_rejects_inverted_window() {
        let log = OpLog::default();
        let mut rail = MockRail::new("vdd_io", log.clone());

        let result = rail.set_voltage(3_300_000, 1_800_000);
        assert!(matches!(
            result,
            Err(ResourceError::VoltageOutOfRange {
                min_microvolt: 3_300_000,
                max_microvolt: 1_800_000
            })
        ));
        assert_eq!(rail.state().voltage, None);

        // Call is still recorded
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_mock_rail_faults() {
        let log = OpLog::default();
        let mut rail = MockRail::new("vdd_pll", log).with_faults(RailFaults::enable());

        rail.set_voltage(1_000_000, 1_000_000).unwrap();
        assert!(rail.enable().is_err());
        assert!(!rail.state().enabled);
        assert!(rail.disable().is_ok());
    }

    #[test]
    fn test_mock_registry_missing_and_state() {
        let mut registry = MockRegistry::new().with_missing("vdd_absent");

        assert!(matches!(
            registry.resolve("vdd_absent"),
            Err(ResourceError::NotFound(_))
        ));
        assert_eq!(registry.rail_state("vdd_absent"), None);

        let mut rail = registry.resolve("vdd_core").unwrap();
        rail.enable().unwrap();
        assert_eq!(registry.rail_state("vdd_core").map(|s| s.enabled), Some(true));
    }

    #[test]
    fn test_recording_delay_logs_wait() {
        let log = OpLog::default();
        let mut delay = RecordingDelay::new(log.clone());

        delay.settle(Duration::from_micros(250));
        assert_eq!(log.snapshot(), vec![RailOp::Settle(Duration::from_micros(250))]);
    }
}
