//! Device-level wiring: build a controller from configuration and register it.
//!
//! [`probe`] is the construction entry point. It resolves every configured rail through a
//! [`ResourceRegistry`], builds the [`SequenceController`], and registers it with a
//! [`RegulatorFramework`] as a single voltage regulator.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{SequencerConfig, SupplyEntry};
use crate::error::{SeqResult, SequencerError};
use crate::hardware::ResourceRegistry;
use crate::sequencer::{SequenceController, SubSupply};

/// Compatible string this controller binds to.
pub const COMPATIBLE: &str = "multi-regulator";

/// What a regulator regulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegulatorKind {
    /// Output voltage
    Voltage,
    /// Output current
    Current,
}

/// Static description handed to the framework at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegulatorDescriptor {
    /// Regulator name
    pub name: &'static str,
    /// What it regulates
    pub kind: RegulatorKind,
    /// Compatible string it was matched on
    pub compatible: &'static str,
}

/// Descriptor for the composite regulator.
pub const MULTI_REGULATOR: RegulatorDescriptor = RegulatorDescriptor {
    name: "multi-regulator",
    kind: RegulatorKind::Voltage,
    compatible: COMPATIBLE,
};

/// Standard regulation constraints for the composite rail.
///
/// The sequencer never reads these; they are forwarded unmodified to
/// [`RegulatorFramework::register`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulationConstraints {
    /// Name consumers see for the composite rail
    #[serde(default)]
    pub name: Option<String>,
    /// Lowest voltage consumers may request
    #[serde(default)]
    pub min_microvolt: Option<u32>,
    /// Highest voltage consumers may request
    #[serde(default)]
    pub max_microvolt: Option<u32>,
    /// Never switch the composite rail off
    #[serde(default)]
    pub always_on: bool,
    /// Composite rail was left on by the bootloader
    #[serde(default)]
    pub boot_on: bool,
}

/// Operations a framework drives a registered regulator through.
pub trait RegulatorOps {
    /// Power the regulator up.
    fn enable(&mut self) -> SeqResult<()>;
    /// Power the regulator down.
    fn disable(&mut self) -> SeqResult<()>;
    /// Current aggregate state.
    fn is_enabled(&self) -> bool;
}

impl RegulatorOps for SequenceController {
    fn enable(&mut self) -> SeqResult<()> {
        SequenceController::enable(self)
    }

    fn disable(&mut self) -> SeqResult<()> {
        SequenceController::disable(self)
    }

    fn is_enabled(&self) -> bool {
        SequenceController::is_enabled(self)
    }
}

/// The framework a built controller is registered with.
pub trait RegulatorFramework {
    /// Announce a regulator. Failure aborts construction.
    fn register(
        &mut self,
        device_name: &str,
        descriptor: &RegulatorDescriptor,
        constraints: &RegulationConstraints,
    ) -> SeqResult<()>;
}

/// One accepted registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Owning device name
    pub device_name: String,
    /// Descriptor it registered with
    pub descriptor: RegulatorDescriptor,
    /// Constraints it registered with
    pub constraints: RegulationConstraints,
}

/// In-process framework that records registrations.
#[derive(Debug, Default)]
pub struct LocalFramework {
    registrations: Vec<Registration>,
    refuse: Option<String>,
}

impl LocalFramework {
    /// Accept every registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every registration with `reason`.
    pub fn refusing(reason: impl Into<String>) -> Self {
        Self {
            registrations: Vec::new(),
            refuse: Some(reason.into()),
        }
    }

    /// Registrations accepted so far.
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }
}

impl RegulatorFramework for LocalFramework {
    fn register(
        &mut self,
        device_name: &str,
        descriptor: &RegulatorDescriptor,
        constraints: &RegulationConstraints,
    ) -> SeqResult<()> {
        if let Some(reason) = &self.refuse {
            return Err(SequencerError::Registration(reason.clone()));
        }

        self.registrations.push(Registration {
            device_name: device_name.to_string(),
            descriptor: *descriptor,
            constraints: constraints.clone(),
        });
        Ok(())
    }
}

/// Resolve every configured rail, in order.
///
/// A rail that fails to resolve is kept with no handle and all-zero parameters; its
/// failure surfaces the first time a sequence touches it.
pub fn build_supplies(
    device_name: &str,
    entries: &[SupplyEntry],
    registry: &mut dyn ResourceRegistry,
) -> Vec<SubSupply> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match registry.resolve(&entry.name) {
            Ok(resource) => {
                debug!(
                    index,
                    supply = %entry.name,
                    min_microvolt = entry.min_microvolt,
                    max_microvolt = entry.max_microvolt,
                    power_on_delay_us = entry.power_on_delay_us,
                    power_off_delay_us = entry.power_off_delay_us,
                    "{}: supply parsed",
                    device_name
                );
                SubSupply::new(entry.name.clone(), Some(resource))
                    .with_voltage(entry.min_microvolt, entry.max_microvolt)
                    .with_delays(entry.power_on_delay_us, entry.power_off_delay_us)
            }
            Err(err) => {
                error!(
                    index,
                    supply = %entry.name,
                    error = %err,
                    "{}: cannot get regulator {}-supply",
                    device_name,
                    entry.name
                );
                SubSupply::new(entry.name.clone(), None)
            }
        })
        .collect()
}

/// Build and register a controller from configuration.
///
/// # Errors
///
/// - [`SequencerError::NoSupplies`] / [`SequencerError::Configuration`] for invalid
///   configuration, including a missing `[constraints]` record
/// - [`SequencerError::Registration`] if the framework refuses the regulator
///
/// Unresolvable rails are not an error here.
pub fn probe(
    config: &SequencerConfig,
    registry: &mut dyn ResourceRegistry,
    framework: &mut dyn RegulatorFramework,
) -> SeqResult<SequenceController> {
    config.validate()?;

    let name = config.device.name.as_str();
    let supplies = build_supplies(name, &config.supplies, registry);
    let controller = SequenceController::new(name, supplies)?;

    let constraints = config.constraints.as_ref().ok_or_else(|| {
        SequencerError::Configuration(format!("{}: missing regulation constraints", name))
    })?;

    framework.register(name, &MULTI_REGULATOR, constraints)?;

    info!("probed ({}, {} supplies)", name, controller.len());
    Ok(controller)
}
