//! Aggregate packing sweeps: grow sphere clusters, pull them together and
//! record how densely they fill their bounding sphere.

pub use aggpack_core;
pub use aggpack_data;
pub use aggpack_io;

use aggpack_core::physics::CentralForceStepper;
use aggpack_core::sweep::{SweepSummary, SweepRunner};
use aggpack_core::SweepConfig;
use aggpack_io::FileSink;
use anyhow::Context;
use std::path::Path;

/// Loads a sweep config, falling back to defaults when `path` does not exist.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<SweepConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(path = %path.display(), "Config file not found, using defaults");
        return Ok(SweepConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    SweepConfig::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
}

/// Runs the full sweep with the reference stepper and writes its output
/// files under `config.output.directory`.
pub fn run_sweep(config: &SweepConfig) -> anyhow::Result<SweepSummary> {
    config.validate()?;
    let mut sink = FileSink::new(config)?;
    let runner = SweepRunner::new(config, |c: &SweepConfig| {
        CentralForceStepper::from_config(&c.physics)
    });
    runner.run(&mut sink)
}
