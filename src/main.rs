//! Command-line driver for the power sequencer.
//!
//! Runs a configured sequence against simulated rails so a rail list, its voltage
//! windows and delays can be checked before they go near real hardware.
//!
//! ```bash
//! cargo run -- --config config/powerseq.toml cycle
//! cargo run -- --config config/powerseq.toml --dry-run cycle
//! cargo run -- --config config/powerseq.toml --missing vdd_io enable
//! cargo run -- --config config/powerseq.toml --fail-disable vdd_core cycle
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use power_sequencer::config::SequencerConfig;
use power_sequencer::device::{probe, LocalFramework};
use power_sequencer::hardware::mock::{MockRegistry, OpLog, RailFaults, RailOp, RecordingDelay};
use power_sequencer::logging;

#[derive(Parser, Debug)]
#[command(name = "power_sequencer", version, about = "Composite power-sequencing controller")]
struct Cli {
    /// Path to the TOML configuration file [default: config/powerseq.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulate a rail that cannot be resolved
    #[arg(long, value_name = "NAME")]
    missing: Vec<String>,

    /// Simulate a rail whose enable call fails
    #[arg(long, value_name = "NAME")]
    fail_enable: Vec<String>,

    /// Simulate a rail whose disable call fails
    #[arg(long, value_name = "NAME")]
    fail_disable: Vec<String>,

    /// Record settle delays instead of sleeping through them
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Power every rail up in order
    Enable,
    /// Power down (a fresh controller starts disabled, so this only warns)
    Disable,
    /// Enable, then disable
    Cycle,
    /// Print the aggregate state after construction
    Status,
    /// Print the effective configuration
    ShowConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SequencerConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SequencerConfig::load().context("loading config/powerseq.toml")?,
    };
    logging::init_from_config(&config.logging)?;

    if let Command::ShowConfig = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let mut registry = simulated_bench(&cli);
    let log = registry.log();
    let mut framework = LocalFramework::new();
    let mut controller = probe(&config, &mut registry, &mut framework)?;
    if cli.dry_run {
        controller = controller.with_delay(RecordingDelay::new(log.clone()));
    }

    let start = Instant::now();
    match cli.command {
        Command::Enable => controller.enable()?,
        Command::Disable => controller.disable()?,
        Command::Cycle => {
            controller.enable()?;
            controller.disable()?;
        }
        Command::Status | Command::ShowConfig => {}
    }
    let elapsed = start.elapsed();

    print_log(&log);
    println!(
        "{}: {} ({} supplies, {:?})",
        controller.name(),
        if controller.is_enabled() { "enabled" } else { "disabled" },
        controller.len(),
        elapsed
    );
    Ok(())
}

fn simulated_bench(cli: &Cli) -> MockRegistry {
    let mut registry = MockRegistry::new();
    for name in &cli.missing {
        registry = registry.with_missing(name.clone());
    }
    for name in &cli.fail_enable {
        registry = registry.with_faults(name.clone(), RailFaults::enable());
    }
    for name in &cli.fail_disable {
        registry = registry.with_faults(name.clone(), RailFaults::disable());
    }
    registry
}

fn print_log(log: &OpLog) {
    for op in log.snapshot() {
        match op {
            RailOp::SetVoltage {
                rail,
                min_microvolt,
                max_microvolt,
            } => println!("  {rail:<16} set_voltage {min_microvolt}..={max_microvolt} uV"),
            RailOp::Enable(rail) => println!("  {rail:<16} enable"),
            RailOp::Disable(rail) => println!("  {rail:<16} disable"),
            RailOp::Settle(delay) => println!("  {:<16} settle {:?}", "", delay),
        }
    }
}
