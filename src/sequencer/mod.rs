//! Composite power sequencing.
//!
//! A [`SequenceController`] drives an ordered list of [`SubSupply`] rails behind one
//! aggregate on/off flag.
//!
//! # Enable
//!
//! For every rail, in list order: program the voltage window (only when one is
//! configured), energize the rail, then wait out its power-on delay. The first failure
//! aborts the pass. Rails already energized in that pass are left on and the controller
//! stays marked disabled.
//!
//! # Disable
//!
//! Walks the list in the same forward order as enable. A rail that refuses to turn off
//! is logged and skipped; the rest still get their disable call and power-off delay, and
//! the controller always ends up marked disabled.
//!
//! # Thread Safety
//!
//! `enable` and `disable` take `&mut self` and run to completion on the calling thread.
//! There is no internal locking; share a controller across threads by putting it behind
//! a `Mutex`.

pub mod delay;

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use tracing::{debug, error, info_span, warn};

use crate::error::{ResourceError, SeqResult, SequencerError};
use crate::hardware::PowerResource;
use delay::{SettleDelay, ThreadSleep};

// =============================================================================
// SubSupply
// =============================================================================

/// One physical rail aggregated by the controller.
pub struct SubSupply {
    label: String,
    resource: Option<Box<dyn PowerResource>>,
    min_microvolt: u32,
    max_microvolt: u32,
    power_on_delay_us: u32,
    power_off_delay_us: u32,
}

impl SubSupply {
    /// Rail called `label`; `resource` is `None` when resolution failed.
    pub fn new(label: impl Into<String>, resource: Option<Box<dyn PowerResource>>) -> Self {
        Self {
            label: label.into(),
            resource,
            min_microvolt: 0,
            max_microvolt: 0,
            power_on_delay_us: 0,
            power_off_delay_us: 0,
        }
    }

    /// Voltage window to program before enabling. `(0, 0)` leaves the voltage alone.
    pub fn with_voltage(mut self, min_microvolt: u32, max_microvolt: u32) -> Self {
        self.min_microvolt = min_microvolt;
        self.max_microvolt = max_microvolt;
        self
    }

    /// Settle delays after power-on and power-off, in microseconds. 0 means no wait.
    pub fn with_delays(mut self, power_on_delay_us: u32, power_off_delay_us: u32) -> Self {
        self.power_on_delay_us = power_on_delay_us;
        self.power_off_delay_us = power_off_delay_us;
        self
    }

    /// Diagnostic name of the rail.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether a resource handle was bound at construction.
    pub fn is_resolved(&self) -> bool {
        self.resource.is_some()
    }

    /// Configured voltage window, or `None` when both bounds are zero.
    pub fn voltage_range(&self) -> Option<(u32, u32)> {
        if self.min_microvolt != 0 || self.max_microvolt != 0 {
            Some((self.min_microvolt, self.max_microvolt))
        } else {
            None
        }
    }

    /// Wait after energizing this rail, if any.
    pub fn power_on_delay(&self) -> Option<Duration> {
        settle_duration(self.power_on_delay_us)
    }

    /// Wait after de-energizing this rail, if any.
    pub fn power_off_delay(&self) -> Option<Duration> {
        settle_duration(self.power_off_delay_us)
    }

    fn resource_mut(&mut self) -> Result<&mut (dyn PowerResource + 'static), ResourceError> {
        match self.resource.as_deref_mut() {
            Some(resource) => Ok(resource),
            None => Err(ResourceError::NotResolved(self.label.clone())),
        }
    }
}

impl fmt::Debug for SubSupply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubSupply")
            .field("label", &self.label)
            .field("resolved", &self.is_resolved())
            .field("min_microvolt", &self.min_microvolt)
            .field("max_microvolt", &self.max_microvolt)
            .field("power_on_delay_us", &self.power_on_delay_us)
            .field("power_off_delay_us", &self.power_off_delay_us)
            .finish()
    }
}

fn settle_duration(us: u32) -> Option<Duration> {
    (us != 0).then(|| Duration::from_micros(u64::from(us)))
}

/// Every rail label must be non-empty and unique within one controller.
pub(crate) fn check_labels<'a>(
    owner: &str,
    labels: impl IntoIterator<Item = &'a str>,
) -> SeqResult<()> {
    let mut seen = HashSet::new();
    for (index, label) in labels.into_iter().enumerate() {
        if label.is_empty() {
            return Err(SequencerError::Configuration(format!(
                "{}: supply {} has an empty label",
                owner, index
            )));
        }
        if !seen.insert(label) {
            return Err(SequencerError::Configuration(format!(
                "{}: duplicate supply label '{}'",
                owner, label
            )));
        }
    }
    Ok(())
}

// =============================================================================
// SequenceController
// =============================================================================

/// Aggregates several rails behind a single enable/disable switch.
pub struct SequenceController {
    name: String,
    supplies: Vec<SubSupply>,
    enabled: bool,
    delay: Box<dyn SettleDelay>,
}

impl SequenceController {
    /// Build a controller over `supplies`, in the order given.
    ///
    /// # Errors
    ///
    /// - [`SequencerError::NoSupplies`] if `supplies` is empty
    /// - [`SequencerError::Configuration`] if `name` is empty, or a rail label is empty
    ///   or repeated
    pub fn new(name: impl Into<String>, supplies: Vec<SubSupply>) -> SeqResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SequencerError::Configuration(
                "controller name cannot be empty".to_string(),
            ));
        }
        if supplies.is_empty() {
            return Err(SequencerError::NoSupplies);
        }

        check_labels(&name, supplies.iter().map(SubSupply::label))?;

        Ok(Self {
            name,
            supplies,
            enabled: false,
            delay: Box::new(ThreadSleep),
        })
    }

    /// Replace the settle delay (defaults to [`ThreadSleep`]).
    pub fn with_delay(mut self, delay: impl SettleDelay + 'static) -> Self {
        self.delay = Box::new(delay);
        self
    }

    /// Display name of the controller.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rails in sequencing order.
    pub fn supplies(&self) -> &[SubSupply] {
        &self.supplies
    }

    /// Number of rails.
    pub fn len(&self) -> usize {
        self.supplies.len()
    }

    /// Always false; a controller is never built without rails.
    pub fn is_empty(&self) -> bool {
        self.supplies.is_empty()
    }

    /// Aggregate on/off state.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Power up every rail in order.
    ///
    /// Calling this while already enabled logs a warning and touches nothing.
    ///
    /// # Errors
    ///
    /// [`SequencerError::VoltageConfig`] or [`SequencerError::Enable`] for the first rail
    /// that fails. Earlier rails stay energized and the controller stays disabled.
    pub fn enable(&mut self) -> SeqResult<()> {
        let span = info_span!("enable", controller = %self.name);
        let _enter = span.enter();

        if self.enabled {
            warn!("{}: already enabled", self.name);
            return Ok(());
        }

        for (index, supply) in self.supplies.iter_mut().enumerate() {
            if let Some((min_microvolt, max_microvolt)) = supply.voltage_range() {
                let result = supply
                    .resource_mut()
                    .and_then(|resource| resource.set_voltage(min_microvolt, max_microvolt));
                if let Err(source) = result {
                    error!(
                        index,
                        supply = %supply.label,
                        min_microvolt,
                        max_microvolt,
                        error = %source,
                        "{}: failed to set voltage",
                        self.name
                    );
                    return Err(SequencerError::VoltageConfig {
                        index,
                        label: supply.label.clone(),
                        source,
                    });
                }
            }

            if let Err(source) = supply.resource_mut().and_then(|resource| resource.enable()) {
                error!(
                    index,
                    supply = %supply.label,
                    error = %source,
                    "{}: failed to enable regulator",
                    self.name
                );
                return Err(SequencerError::Enable {
                    index,
                    label: supply.label.clone(),
                    source,
                });
            }
            debug!(index, supply = %supply.label, "rail enabled");

            if let Some(delay) = supply.power_on_delay() {
                self.delay.settle(delay);
            }
        }

        self.enabled = true;
        Ok(())
    }

    /// Power down every rail, in the same order as [`enable`](Self::enable).
    ///
    /// Rails that refuse to turn off are logged and skipped. The controller is marked
    /// disabled afterwards no matter what, and this always returns `Ok`.
    pub fn disable(&mut self) -> SeqResult<()> {
        let span = info_span!("disable", controller = %self.name);
        let _enter = span.enter();

        if !self.enabled {
            warn!("{}: already disabled", self.name);
            return Ok(());
        }

        for (index, supply) in self.supplies.iter_mut().enumerate() {
            match supply.resource_mut().and_then(|resource| resource.disable()) {
                Ok(()) => debug!(index, supply = %supply.label, "rail disabled"),
                Err(err) => warn!(
                    index,
                    supply = %supply.label,
                    error = %err,
                    "{}: failed to disable regulator",
                    self.name
                ),
            }

            if let Some(delay) = supply.power_off_delay() {
                self.delay.settle(delay);
            }
        }

        self.enabled = false;
        Ok(())
    }
}

impl fmt::Debug for SequenceController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceController")
            .field("name", &self.name)
            .field("supplies", &self.supplies)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Aggregate state of an optional controller; an absent one reports disabled.
pub fn is_enabled(controller: Option<&SequenceController>) -> bool {
    controller.is_some_and(SequenceController::is_enabled)
}
