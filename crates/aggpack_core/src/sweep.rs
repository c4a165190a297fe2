//! Parametric sweep driver.
//!
//! Enumerates the Cartesian product of the configured axes, builds a fresh
//! scene for each combination, records its packing-fraction time series and
//! hands the result to a [`RunSink`] for persistence.
//!
//! Combinations are independent: each one owns its scene, its backend and a
//! seed derived from its position in the sweep, so results do not depend on
//! execution order and the sweep may run on several threads.

use crate::config::{FailurePolicy, SweepConfig};
use crate::error::GeometryError;
use crate::metrics::SweepMetrics;
use crate::packing::PackingFractionPipeline;
use crate::physics::{ForceField, PhysicsBackend};
use crate::scene::SceneContext;
use aggpack_data::{FrameRecord, ParameterSet, TriMesh};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// All combinations in sweep order: particles per aggregate outermost, then
/// aggregate count, then jump chance.
#[must_use]
pub fn parameter_grid(config: &SweepConfig) -> Vec<ParameterSet> {
    let mut grid = Vec::with_capacity(config.total_runs());
    for &particles_per_aggregate in &config.sweep.particles_per_aggregate {
        for &aggregate_count in &config.sweep.aggregate_counts {
            for &jump_chance in &config.sweep.jump_chances {
                grid.push(ParameterSet {
                    particle_radius: config.particles.radius,
                    particles_per_aggregate,
                    aggregate_count,
                    jump_chance,
                    density: config.particles.density,
                    field_strength: config.field.strength,
                    frames: config.simulation.frames,
                });
            }
        }
    }
    grid
}

/// Seed of run `index` on its `attempt`-th try. Attempt 0 is `base + index`.
#[must_use]
pub fn run_seed(base: u64, index: usize, attempt: u32) -> u64 {
    base.wrapping_add(index as u64)
        .wrapping_add(u64::from(attempt) << 32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    /// Abandoned under the skip policy.
    Skipped { error_kind: String, message: String },
}

/// The result of one combination.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub index: usize,
    pub name: String,
    pub params: ParameterSet,
    pub seed: u64,
    pub attempts: u32,
    pub status: RunStatus,
    pub records: Vec<FrameRecord>,
    /// World-space surfaces at the last frame, when geometry export is on.
    pub final_meshes: Vec<TriMesh>,
    pub duration: Duration,
}

/// Manifest line for one combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub index: usize,
    pub name: String,
    pub params: ParameterSet,
    pub seed: u64,
    pub attempts: u32,
    #[serde(flatten)]
    pub status: RunStatus,
    pub frames: usize,
    pub final_packing_fraction: Option<f64>,
    pub duration_s: f64,
}

impl From<&RunOutcome> for RunSummary {
    fn from(run: &RunOutcome) -> Self {
        Self {
            index: run.index,
            name: run.name.clone(),
            params: run.params,
            seed: run.seed,
            attempts: run.attempts,
            status: run.status.clone(),
            frames: run.records.len(),
            final_packing_fraction: run.records.last().map(|r| r.packing_fraction),
            duration_s: run.duration.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub fingerprint: String,
    pub base_seed: u64,
    pub total_runs: usize,
    pub completed: usize,
    pub skipped: usize,
    pub elapsed_s: f64,
    /// Ordered by run index.
    pub runs: Vec<RunSummary>,
}

/// Destination for finished runs.
pub trait RunSink {
    /// Persists one run. Called once per combination, possibly out of order
    /// when the sweep is parallel.
    fn write_run(&mut self, run: &RunOutcome) -> anyhow::Result<()>;

    /// Called once after the last run.
    fn finish(&mut self, summary: &SweepSummary) -> anyhow::Result<()>;

    /// Called instead of [`RunSink::finish`] when a failing run stops the
    /// sweep. `summary` lists only the runs already written.
    fn abort(&mut self, summary: &SweepSummary, error: &anyhow::Error) -> anyhow::Result<()>;
}

/// A sink that keeps every outcome in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub runs: Vec<RunOutcome>,
    pub summary: Option<SweepSummary>,
    /// Partial summary and error message of a stopped sweep.
    pub aborted: Option<(SweepSummary, String)>,
}

impl RunSink for MemorySink {
    fn write_run(&mut self, run: &RunOutcome) -> anyhow::Result<()> {
        self.runs.push(run.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &SweepSummary) -> anyhow::Result<()> {
        self.runs.sort_by_key(|r| r.index);
        self.summary = Some(summary.clone());
        Ok(())
    }

    fn abort(&mut self, summary: &SweepSummary, error: &anyhow::Error) -> anyhow::Result<()> {
        self.runs.sort_by_key(|r| r.index);
        self.aborted = Some((summary.clone(), format!("{error:#}")));
        Ok(())
    }
}

pub struct SweepRunner<'a, F> {
    config: &'a SweepConfig,
    backend_factory: F,
    base_seed: u64,
    metrics: SweepMetrics,
}

impl<'a, F, B> SweepRunner<'a, F>
where
    F: Fn(&SweepConfig) -> B + Sync,
    B: PhysicsBackend,
{
    /// `backend_factory` is called once per combination so every run owns
    /// an independent backend.
    pub fn new(config: &'a SweepConfig, backend_factory: F) -> Self {
        let base_seed = config.simulation.seed.unwrap_or_else(rand::random);
        Self {
            config,
            backend_factory,
            base_seed,
            metrics: SweepMetrics::new(config.total_runs()),
        }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    pub fn metrics(&self) -> &SweepMetrics {
        &self.metrics
    }

    /// Runs every combination and reports it to `sink`.
    ///
    /// Under the abort policy, and under the retry policy once retries are
    /// used up, the first failing combination stops the sweep and its error
    /// is returned. The sink then gets [`RunSink::abort`] with the runs
    /// written so far instead of `finish`.
    pub fn run<S: RunSink + Send>(&self, sink: &mut S) -> anyhow::Result<SweepSummary> {
        self.metrics.start();
        let grid = parameter_grid(self.config);
        tracing::info!(
            runs = grid.len(),
            base_seed = self.base_seed,
            policy = ?self.config.simulation.failure_policy,
            parallel = self.config.simulation.parallel,
            "Starting sweep"
        );

        let sink = Mutex::new(sink);
        let summaries = Mutex::new(Vec::with_capacity(grid.len()));
        let process = |(index, params): (usize, &ParameterSet)| -> anyhow::Result<()> {
            let outcome = self.run_one(index, params)?;
            let mut sink = sink.lock().unwrap_or_else(|e| e.into_inner());
            sink.write_run(&outcome)
                .with_context(|| format!("writing run {}", outcome.name))?;
            summaries
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(RunSummary::from(&outcome));
            Ok(())
        };

        let processed = if self.config.simulation.parallel {
            self.run_parallel(&grid, &process)
        } else {
            grid.iter().enumerate().try_for_each(&process)
        };

        let mut runs = summaries.into_inner().unwrap_or_else(|e| e.into_inner());
        runs.sort_by_key(|r| r.index);
        let summary = self.summarize(grid.len(), runs);
        let sink = sink.into_inner().unwrap_or_else(|e| e.into_inner());
        self.metrics.log_summary();

        if let Err(err) = processed {
            if let Err(abort_err) = sink.abort(&summary, &err) {
                tracing::error!(error = %format!("{abort_err:#}"), "Could not record aborted sweep");
            }
            return Err(err);
        }
        sink.finish(&summary).context("finishing sweep output")?;
        Ok(summary)
    }

    fn summarize(&self, total_runs: usize, runs: Vec<RunSummary>) -> SweepSummary {
        SweepSummary {
            fingerprint: self.config.fingerprint(),
            base_seed: self.base_seed,
            total_runs,
            completed: runs
                .iter()
                .filter(|r| r.status == RunStatus::Completed)
                .count(),
            skipped: runs
                .iter()
                .filter(|r| r.status != RunStatus::Completed)
                .count(),
            elapsed_s: self.metrics.elapsed().as_secs_f64(),
            runs,
        }
    }

    #[cfg(feature = "rayon")]
    fn run_parallel<P>(&self, grid: &[ParameterSet], process: &P) -> anyhow::Result<()>
    where
        P: Fn((usize, &ParameterSet)) -> anyhow::Result<()> + Sync,
    {
        use rayon::prelude::*;
        grid.par_iter().enumerate().try_for_each(process)
    }

    #[cfg(not(feature = "rayon"))]
    fn run_parallel<P>(&self, grid: &[ParameterSet], process: &P) -> anyhow::Result<()>
    where
        P: Fn((usize, &ParameterSet)) -> anyhow::Result<()> + Sync,
    {
        tracing::warn!("Built without rayon, running sweep sequentially");
        grid.iter().enumerate().try_for_each(process)
    }

    /// Runs one combination under the configured failure policy.
    pub fn run_one(&self, index: usize, params: &ParameterSet) -> anyhow::Result<RunOutcome> {
        let name = params.file_stem(&self.config.output.prefix);
        let policy = self.config.simulation.failure_policy;
        let max_attempts = match policy {
            FailurePolicy::Retry => self.config.simulation.max_retries + 1,
            FailurePolicy::Skip | FailurePolicy::Abort => 1,
        };
        tracing::info!(run = %name, index, "Starting run");
        let start = Instant::now();

        let mut attempt = 0;
        loop {
            let seed = run_seed(self.base_seed, index, attempt);
            match self.attempt(params, seed) {
                Ok((records, final_meshes)) => {
                    let outcome = RunOutcome {
                        index,
                        name,
                        params: *params,
                        seed,
                        attempts: attempt + 1,
                        status: RunStatus::Completed,
                        records,
                        final_meshes,
                        duration: start.elapsed(),
                    };
                    self.metrics.record_run(&outcome.name, outcome.duration, true);
                    return Ok(outcome);
                }
                Err(err) => {
                    let kind = error_kind(&err);
                    attempt += 1;
                    if attempt < max_attempts {
                        tracing::warn!(run = %name, attempt, kind, error = %err, "Retrying run with a fresh seed");
                        self.metrics.increment_counter("retries");
                        continue;
                    }
                    if policy == FailurePolicy::Skip {
                        tracing::warn!(run = %name, kind, error = %err, "Skipping run");
                        self.metrics.record_skip();
                        self.metrics.record_run(&name, start.elapsed(), false);
                        return Ok(RunOutcome {
                            index,
                            name,
                            params: *params,
                            seed,
                            attempts: attempt,
                            status: RunStatus::Skipped {
                                error_kind: kind.to_string(),
                                message: format!("{err:#}"),
                            },
                            records: Vec::new(),
                            final_meshes: Vec::new(),
                            duration: start.elapsed(),
                        });
                    }
                    tracing::error!(run = %name, attempts = attempt, kind, error = %err, "Run failed, aborting sweep");
                    self.metrics.record_failure();
                    return Err(err.context(format!("run {name} failed after {attempt} attempt(s)")));
                }
            }
        }
    }

    fn attempt(
        &self,
        params: &ParameterSet,
        seed: u64,
    ) -> anyhow::Result<(Vec<FrameRecord>, Vec<TriMesh>)> {
        let config = self.config;
        let mut scene = SceneContext::new(seed, (self.backend_factory)(config));
        let field = ForceField {
            strength: params.field_strength,
            ..ForceField::from(&config.field)
        };
        scene
            .populate(
                params,
                &config.particles,
                &config.mesh,
                &config.physics,
                field,
            )
            .context("building aggregates")?;

        let mut pipeline = PackingFractionPipeline::new(
            scene.surfaces(),
            config.simulation.bounding_mode,
            config.simulation.fraction_unit,
        );
        pipeline.run(&mut scene, params.frames, &self.metrics)?;

        let meshes = if config.output.export_geometry {
            scene.world_meshes().context("exporting final geometry")?
        } else {
            Vec::new()
        };
        Ok((pipeline.into_records(), meshes))
    }
}

/// Manifest name of the geometry error behind `err`, or `"physics"` for
/// failures raised by the backend.
fn error_kind(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<GeometryError>())
        .map_or("physics", GeometryError::kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SweepAxes;

    fn axes() -> SweepConfig {
        SweepConfig {
            sweep: SweepAxes {
                particles_per_aggregate: vec![2, 5],
                aggregate_counts: vec![10, 20],
                jump_chances: vec![0.25, 0.75],
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_grid_order() {
        let grid = parameter_grid(&axes());
        assert_eq!(grid.len(), 8);
        let keys: Vec<_> = grid
            .iter()
            .map(|p| (p.particles_per_aggregate, p.aggregate_count, p.jump_chance))
            .collect();
        assert_eq!(
            keys,
            vec![
                (2, 10, 0.25),
                (2, 10, 0.75),
                (2, 20, 0.25),
                (2, 20, 0.75),
                (5, 10, 0.25),
                (5, 10, 0.75),
                (5, 20, 0.25),
                (5, 20, 0.75),
            ]
        );
    }

    #[test]
    fn test_grid_carries_scalars() {
        let config = axes();
        for p in parameter_grid(&config) {
            assert_eq!(p.particle_radius, config.particles.radius);
            assert_eq!(p.density, config.particles.density);
            assert_eq!(p.field_strength, config.field.strength);
            assert_eq!(p.frames, config.simulation.frames);
        }
    }

    #[test]
    fn test_run_seed() {
        assert_eq!(run_seed(42, 0, 0), 42);
        assert_eq!(run_seed(42, 3, 0), 45);
        assert_ne!(run_seed(42, 3, 1), run_seed(42, 4, 0));
        assert_eq!(run_seed(u64::MAX, 1, 0), 0);
    }

    #[test]
    fn test_error_kind_sees_through_context() {
        let err = anyhow::Error::new(GeometryError::EmptyGeometry).context("frame 3");
        assert_eq!(error_kind(&err), "empty_geometry");
        assert_eq!(error_kind(&anyhow::anyhow!("boom")), "physics");
    }
}
