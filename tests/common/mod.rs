pub mod macros;

use aggpack_lib::aggpack_core::config::{BoundingMode, FailurePolicy, SweepAxes, SweepConfig};
use std::path::PathBuf;
use uuid::Uuid;

/// Small, fast sweep configs for integration tests.
#[allow(dead_code)]
pub struct SweepConfigBuilder {
    config: SweepConfig,
}

#[allow(dead_code)]
impl SweepConfigBuilder {
    /// One tiny combination, coarse meshes, few frames, fixed seed, no files.
    pub fn new() -> Self {
        let mut config = SweepConfig::default();
        config.sweep = SweepAxes {
            particles_per_aggregate: vec![3],
            aggregate_counts: vec![6],
            jump_chances: vec![0.5],
        };
        config.particles.placement_radius = 12.0;
        config.mesh.segments = 8;
        config.mesh.rings = 4;
        config.field.strength = -50.0;
        config.physics.substeps = 2;
        config.simulation.frames = 5;
        config.simulation.seed = Some(42);
        config.output.export_geometry = false;
        Self { config }
    }

    pub fn with_axes(mut self, npp: &[usize], na: &[usize], jc: &[f64]) -> Self {
        self.config.sweep = SweepAxes {
            particles_per_aggregate: npp.to_vec(),
            aggregate_counts: na.to_vec(),
            jump_chances: jc.to_vec(),
        };
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.simulation.seed = Some(seed);
        self
    }

    pub fn with_frames(mut self, frames: u32) -> Self {
        self.config.simulation.frames = frames;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy, max_retries: u32) -> Self {
        self.config.simulation.failure_policy = policy;
        self.config.simulation.max_retries = max_retries;
        self
    }

    pub fn with_mode(mut self, mode: BoundingMode) -> Self {
        self.config.simulation.bounding_mode = mode;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.simulation.parallel = parallel;
        self
    }

    /// Writes into a fresh directory under the system temp dir.
    pub fn with_output(mut self, export_geometry: bool) -> Self {
        self.config.output.directory = temp_output_dir().display().to_string();
        self.config.output.export_geometry = export_geometry;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SweepConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn build(self) -> SweepConfig {
        self.config
            .validate()
            .expect("Invalid config in test builder");
        self.config
    }
}

#[allow(dead_code)]
pub fn temp_output_dir() -> PathBuf {
    std::env::temp_dir().join(format!("aggpack_test_{}", Uuid::new_v4()))
}
