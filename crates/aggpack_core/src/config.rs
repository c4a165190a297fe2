//! Configuration management for sweep parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! a `sweep.toml` file. Every section has defaults matching the reference
//! study, so a file only needs to list the values it overrides.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `sweep.toml` file (overrides defaults)
//! 3. Command-line flags for seed, frame count and output directory
//!
//! ## Example `sweep.toml`
//!
//! ```toml
//! [sweep]
//! particles_per_aggregate = [2, 5]
//! aggregate_counts = [10]
//! jump_chances = [0.5]
//!
//! [particles]
//! radius = 1.0
//! density = 1.5
//!
//! [simulation]
//! frames = 200
//! seed = 7
//! fraction_unit = "percent"
//! ```

use serde::{Deserialize, Serialize};

/// The value lists whose Cartesian product forms the sweep.
///
/// Iteration order is particles-per-aggregate outermost, then aggregate
/// count, then jump chance. Run numbering and file names depend on it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SweepAxes {
    pub particles_per_aggregate: Vec<usize>,
    pub aggregate_counts: Vec<usize>,
    pub jump_chances: Vec<f64>,
}

impl Default for SweepAxes {
    fn default() -> Self {
        Self {
            particles_per_aggregate: vec![2, 5, 8, 15],
            aggregate_counts: vec![500, 650, 800],
            jump_chances: vec![0.25, 0.50, 0.75],
        }
    }
}

/// Primary particle and aggregate construction settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    pub radius: f64,
    pub density: f64,
    /// Radius of the sphere the aggregate seeds are spread over.
    pub placement_radius: f64,
    /// Rejected candidates allowed per particle before construction fails.
    pub max_placement_attempts: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            density: 1.5,
            placement_radius: 50.0,
            max_placement_attempts: 10_000,
        }
    }
}

/// UV-sphere tessellation of each primary particle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    pub segments: u32,
    pub rings: u32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            segments: 32,
            rings: 16,
        }
    }
}

/// Central force field. Negative strength attracts toward `center`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    pub strength: f64,
    pub center: [f64; 3],
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            strength: -500.0,
            center: [0.0, 0.0, 0.0],
        }
    }
}

/// Rigid-body settings handed to the physics backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub friction: f64,
    pub linear_damping: f64,
    pub restitution: f64,
    /// Simulated seconds per frame.
    pub time_step: f64,
    pub substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            friction: 0.25,
            linear_damping: 0.5,
            restitution: 0.0,
            time_step: 1.0 / 24.0,
            substeps: 4,
        }
    }
}

/// Which points the bounding sphere is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoundingMode {
    /// Every surface vertex. Slower, used for analysis.
    #[default]
    Exact,
    /// The eight bounding-box corners of each body.
    Approximate,
}

/// How the packing fraction column is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FractionUnit {
    #[default]
    Ratio,
    Percent,
}

impl FractionUnit {
    #[must_use]
    pub fn scale(self) -> f64 {
        match self {
            Self::Ratio => 1.0,
            Self::Percent => 100.0,
        }
    }
}

/// What the sweep does when a combination fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and continue with the next combination.
    Skip,
    /// Rebuild the combination with fresh randomness, up to `max_retries` times.
    Retry,
    /// Stop the sweep and return the error.
    #[default]
    Abort,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub frames: u32,
    pub seed: Option<u64>,
    pub bounding_mode: BoundingMode,
    pub fraction_unit: FractionUnit,
    pub failure_policy: FailurePolicy,
    pub max_retries: u32,
    /// Run independent combinations on worker threads.
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frames: 800,
            seed: Some(42),
            bounding_mode: BoundingMode::Exact,
            fraction_unit: FractionUnit::Ratio,
            failure_policy: FailurePolicy::Abort,
            max_retries: 3,
            parallel: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub prefix: String,
    pub export_geometry: bool,
    pub write_manifest: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            prefix: "aggregate_data".to_string(),
            export_geometry: true,
            write_manifest: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SweepConfig {
    pub sweep: SweepAxes,
    pub particles: ParticleConfig,
    pub mesh: MeshConfig,
    pub field: FieldConfig,
    pub physics: PhysicsConfig,
    pub simulation: SimulationConfig,
    pub output: OutputConfig,
}

impl SweepConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    ///
    /// # Validation Rules
    /// - Sweep axes must be non-empty; counts must be at least 1
    /// - Jump chances must lie in [0.0, 1.0]
    /// - Radius, density, time step must be positive
    /// - Tessellation must describe a closed sphere (segments >= 3, rings >= 2)
    pub fn validate(&self) -> anyhow::Result<()> {
        // Sweep validation
        anyhow::ensure!(
            !self.sweep.particles_per_aggregate.is_empty(),
            "particles_per_aggregate must not be empty"
        );
        anyhow::ensure!(
            !self.sweep.aggregate_counts.is_empty(),
            "aggregate_counts must not be empty"
        );
        anyhow::ensure!(
            !self.sweep.jump_chances.is_empty(),
            "jump_chances must not be empty"
        );
        anyhow::ensure!(
            self.sweep.particles_per_aggregate.iter().all(|&n| n >= 1),
            "Particles per aggregate must be at least 1"
        );
        anyhow::ensure!(
            self.sweep.aggregate_counts.iter().all(|&n| n >= 1),
            "Aggregate count must be at least 1"
        );
        anyhow::ensure!(
            self.sweep
                .jump_chances
                .iter()
                .all(|&p| (0.0..=1.0).contains(&p)),
            "Jump chance must be in [0.0, 1.0]"
        );

        // Particle validation
        anyhow::ensure!(
            self.particles.radius > 0.0 && self.particles.radius.is_finite(),
            "Particle radius must be positive"
        );
        anyhow::ensure!(
            self.particles.density > 0.0,
            "Particle density must be positive"
        );
        anyhow::ensure!(
            self.particles.placement_radius >= 0.0,
            "Placement radius must be non-negative"
        );
        anyhow::ensure!(
            self.particles.max_placement_attempts >= 1,
            "Max placement attempts must be at least 1"
        );

        // Mesh validation
        anyhow::ensure!(self.mesh.segments >= 3, "Mesh segments must be at least 3");
        anyhow::ensure!(self.mesh.rings >= 2, "Mesh rings must be at least 2");

        // Physics validation
        anyhow::ensure!(self.field.strength.is_finite(), "Field strength must be finite");
        anyhow::ensure!(
            self.physics.friction >= 0.0,
            "Friction must be non-negative"
        );
        anyhow::ensure!(
            self.physics.linear_damping >= 0.0,
            "Linear damping must be non-negative"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.physics.restitution),
            "Restitution must be in [0.0, 1.0]"
        );
        anyhow::ensure!(self.physics.time_step > 0.0, "Time step must be positive");
        anyhow::ensure!(self.physics.substeps >= 1, "Substeps must be at least 1");

        // Simulation validation
        anyhow::ensure!(self.simulation.frames >= 1, "Frame count must be at least 1");
        anyhow::ensure!(
            !self.output.prefix.trim().is_empty(),
            "Output prefix must not be empty"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of combinations in the sweep.
    #[must_use]
    pub fn total_runs(&self) -> usize {
        self.sweep.particles_per_aggregate.len()
            * self.sweep.aggregate_counts.len()
            * self.sweep.jump_chances.len()
    }

    /// Digest of every setting that changes the numbers a run produces.
    /// Output paths and parallelism are excluded.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.sweep).as_bytes());
        hasher.update(format!("{:?}", self.particles).as_bytes());
        hasher.update(format!("{:?}", self.mesh).as_bytes());
        hasher.update(format!("{:?}", self.field).as_bytes());
        hasher.update(format!("{:?}", self.physics).as_bytes());
        hasher.update(format!("{:?}", self.simulation.frames).as_bytes());
        hasher.update(format!("{:?}", self.simulation.seed).as_bytes());
        hasher.update(format!("{:?}", self.simulation.bounding_mode).as_bytes());
        hasher.update(format!("{:?}", self.simulation.fraction_unit).as_bytes());
        hex::encode(hasher.finalize())
    }
}
