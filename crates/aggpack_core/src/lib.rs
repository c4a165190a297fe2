//! # Aggpack Core
//!
//! The geometry engine for aggregate packing studies: synthetic clusters of
//! touching spheres are grown, pulled toward a common center, and the
//! fraction of their enclosing sphere they fill is tracked frame by frame.
//!
//! This crate contains:
//! - Even seed placement on a sphere (golden-ratio spiral)
//! - Stochastic aggregate growth with a bounded retry budget
//! - UV-sphere tessellation and mesh volume
//! - Bounding-sphere estimation in exact and approximate modes
//! - The per-frame packing-fraction pipeline
//! - The physics backend seam and a reference central-force stepper
//! - The parametric sweep driver, configuration and metrics
//!
//! ## Architecture
//!
//! - **Pure construction**: builders return new immutable values
//! - **Explicit scene context**: each run owns its RNG, bodies and backend
//! - **Deterministic sweeps**: run seeds derive from the sweep position
//!
//! ## Example
//!
//! ```
//! use aggpack_core::aggregate::AggregateBuilder;
//! use aggpack_core::distribution::distribute_on_sphere;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let seeds = distribute_on_sphere(4, 10.0);
//! let builder = AggregateBuilder::new(1.0).with_jump_chance(0.5);
//! let aggregate = builder.build(seeds[0], 5, &mut rng).unwrap();
//! assert_eq!(aggregate.len(), 5);
//! ```

/// Stochastic aggregate growth
pub mod aggregate;
/// Bounding-sphere estimation
pub mod bounding;
/// Configuration management for sweep parameters
pub mod config;
/// Golden-ratio spiral placement on a sphere
pub mod distribution;
/// Typed geometry errors
pub mod error;
/// UV-sphere tessellation of particles and aggregates
pub mod mesh;
/// Sweep progress metrics and logging setup
pub mod metrics;
/// Per-frame packing-fraction pipeline
pub mod packing;
/// Physics backend seam and reference stepper
pub mod physics;
/// Per-run scene context
pub mod scene;
/// Uniform-grid broad phase
pub mod spatial_hash;
/// Parametric sweep driver
pub mod sweep;
/// Enclosed volume of triangle meshes
pub mod volume;

pub use aggregate::AggregateBuilder;
pub use bounding::BoundingSphere;
pub use config::SweepConfig;
pub use error::GeometryError;
pub use metrics::{init_logging, SweepMetrics};
pub use packing::PackingFractionPipeline;
pub use physics::{CentralForceStepper, PhysicsBackend};
pub use scene::SceneContext;
pub use sweep::{RunSink, SweepRunner};
