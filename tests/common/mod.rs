//! Common test utilities for power_sequencer integration tests
//!
//! - Bench setup: controllers over simulated rails sharing one operation log
//! - Log helpers for checking ordering
//! - Timing assertions for wall-clock settle delays

#![allow(dead_code)] // Not every test file uses every helper

use std::time::Duration;

use power_sequencer::hardware::mock::{MockRegistry, OpLog, RailOp, RecordingDelay};
use power_sequencer::hardware::ResourceRegistry;
use power_sequencer::{SequenceController, SubSupply};

/// Simulated rail list: `(name, min_uV, max_uV, on_delay_us, off_delay_us)`.
pub type RailSpec<'a> = (&'a str, u32, u32, u32, u32);

/// Build a controller over `rails`, resolving each through `registry`.
///
/// Settle delays are recorded in the registry's log instead of slept through.
pub fn bench(registry: &mut MockRegistry, rails: &[RailSpec<'_>]) -> SequenceController {
    let log = registry.log();
    let supplies = rails
        .iter()
        .map(|&(name, min, max, on, off)| {
            SubSupply::new(name, registry.resolve(name).ok())
                .with_voltage(min, max)
                .with_delays(on, off)
        })
        .collect();

    SequenceController::new("test-rails", supplies)
        .expect("valid rail list")
        .with_delay(RecordingDelay::new(log))
}

/// Plain rails with no voltage window and no delays.
pub fn plain(names: &[&'static str]) -> Vec<RailSpec<'static>> {
    names.iter().map(|&name| (name, 0, 0, 0, 0)).collect()
}

/// Rail names in the order they were touched, ignoring settle entries.
pub fn rails_touched(log: &OpLog) -> Vec<String> {
    log.snapshot()
        .into_iter()
        .filter_map(|op| match op {
            RailOp::SetVoltage { rail, .. } | RailOp::Enable(rail) | RailOp::Disable(rail) => {
                Some(rail)
            }
            RailOp::Settle(_) => None,
        })
        .collect()
}

/// Sum of every recorded settle delay.
pub fn total_settle(log: &OpLog) -> Duration {
    log.snapshot()
        .into_iter()
        .filter_map(|op| match op {
            RailOp::Settle(delay) => Some(delay),
            _ => None,
        })
        .sum()
}

/// Assert that a wall-clock wait honoured a settle delay.
///
/// The lower bound is strict. The upper bound is `2 * expected` plus `slack`, since a
/// loaded CI host can overshoot any sleep.
pub fn assert_settled_within(actual: Duration, expected: Duration, slack: Duration, context: &str) {
    let max = expected * 2 + slack;
    assert!(
        actual >= expected && actual <= max,
        "{}: expected between {:?} and {:?}, got {:?}",
        context,
        expected,
        max,
        actual
    );
}

/// Check if running in CI environment
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
}
