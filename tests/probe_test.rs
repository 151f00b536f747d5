//! Construction from on-disk configuration through to a running controller.

use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use power_sequencer::config::SequencerConfig;
use power_sequencer::device::{probe, LocalFramework, MULTI_REGULATOR};
use power_sequencer::hardware::mock::{MockRegistry, RailOp, RecordingDelay};
use power_sequencer::SequencerError;

const BOARD: &str = r#"
[device]
name = "board-rails"

[constraints]
name = "soc_domain"
boot_on = true

[[supplies]]
name = "vdd_core"
min_microvolt = 800000
max_microvolt = 900000

[[supplies]]
name = "vdd_io"
power_on_delay_us = 100
"#;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn load_probe_and_cycle() {
    let file = write_config(BOARD);
    let config = SequencerConfig::load_from(file.path()).unwrap();

    let mut registry = MockRegistry::new();
    let mut framework = LocalFramework::new();
    let mut ctrl = probe(&config, &mut registry, &mut framework)
        .unwrap()
        .with_delay(RecordingDelay::new(registry.log()));

    let registration = &framework.registrations()[0];
    assert_eq!(registration.device_name, "board-rails");
    assert_eq!(registration.descriptor, MULTI_REGULATOR);
    assert!(registration.constraints.boot_on);

    ctrl.enable().unwrap();
    ctrl.disable().unwrap();

    assert_eq!(
        registry.log().snapshot(),
        vec![
            RailOp::SetVoltage {
                rail: "vdd_core".into(),
                min_microvolt: 800_000,
                max_microvolt: 900_000
            },
            RailOp::Enable("vdd_core".into()),
            RailOp::Enable("vdd_io".into()),
            RailOp::Settle(std::time::Duration::from_micros(100)),
            RailOp::Disable("vdd_core".into()),
            RailOp::Disable("vdd_io".into()),
        ]
    );
}

#[test]
#[serial]
fn empty_supply_list_fails_construction() {
    let file = write_config(
        r#"
        [device]
        name = "board-rails"

        [constraints]
        "#,
    );

    let err = SequencerConfig::load_from(file.path()).unwrap_err();
    assert!(matches!(err, SequencerError::NoSupplies));
    assert!(err.is_configuration());
}

#[test]
#[serial]
fn environment_overrides_file() {
    let file = write_config(BOARD);

    std::env::set_var("POWERSEQ_DEVICE__NAME", "from-env");
    std::env::set_var("POWERSEQ_LOGGING__LEVEL", "debug");
    let result = SequencerConfig::load_from(file.path());
    std::env::remove_var("POWERSEQ_DEVICE__NAME");
    std::env::remove_var("POWERSEQ_LOGGING__LEVEL");

    let config = result.unwrap();
    assert_eq!(config.device.name, "from-env");
    assert_eq!(config.logging.level, "debug");
}

#[test]
#[serial]
fn malformed_file_is_a_load_error() {
    let file = write_config("[device\nname = ");

    let err = SequencerConfig::load_from(file.path()).unwrap_err();
    assert!(matches!(err, SequencerError::Config(_)));
}

#[test]
fn missing_rail_does_not_abort_probe() {
    let config = SequencerConfig::from_toml_str(BOARD).unwrap();
    let mut registry = MockRegistry::new().with_missing("vdd_io");

    let mut ctrl = probe(&config, &mut registry, &mut LocalFramework::new()).unwrap();
    assert_eq!(ctrl.len(), 2);

    let err = ctrl.enable().unwrap_err();
    assert_eq!(err.supply_index(), Some(1));
    assert_eq!(registry.rail_state("vdd_core").map(|s| s.enabled), Some(true));
    assert!(!ctrl.is_enabled());
}

#[test]
#[serial]
fn default_location_loads_bundled_config() {
    // Integration tests run from the package root
    let config = SequencerConfig::load().unwrap();

    let names: Vec<_> = config.supplies.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["vdd_core", "vdd_mem", "vdd_io"]);
    assert!(config.constraints.is_some());
}
