//! Per-frame packing-fraction reduction.
//!
//! The pipeline measures the total solid volume once, when it is created,
//! then turns each frame's snapshot into a [`FrameRecord`]: bounding sphere
//! over the bodies' world points, sphere volume, packing fraction and the
//! farthest point from the sphere center.

use crate::bounding::{bounding_sphere, max_distance, world_points, BoundingSphere};
use crate::config::{BoundingMode, FractionUnit};
use crate::error::{GeometryError, Result};
use crate::metrics::SweepMetrics;
use crate::physics::PhysicsBackend;
use crate::scene::{BodySurface, SceneContext};
use aggpack_data::{FrameRecord, SceneSnapshot};
use anyhow::Context;

/// `total_volume / sphere.volume()`, failing when the sphere has no volume.
pub fn packing_fraction(total_volume: f64, sphere: &BoundingSphere) -> Result<f64> {
    if !(sphere.radius > 0.0 && sphere.radius.is_finite()) {
        return Err(GeometryError::DegenerateBoundingSphere {
            radius: sphere.radius,
        });
    }
    Ok(total_volume / sphere.volume())
}

#[derive(Debug, Clone)]
pub struct PackingFractionPipeline {
    mode: BoundingMode,
    unit: FractionUnit,
    total_volume: f64,
    records: Vec<FrameRecord>,
}

impl PackingFractionPipeline {
    /// Starts a run over `surfaces`, summing their volumes once.
    #[must_use]
    pub fn new(surfaces: &[BodySurface], mode: BoundingMode, unit: FractionUnit) -> Self {
        Self::with_total_volume(surfaces.iter().map(|s| s.volume).sum(), mode, unit)
    }

    #[must_use]
    pub fn with_total_volume(total_volume: f64, mode: BoundingMode, unit: FractionUnit) -> Self {
        Self {
            mode,
            unit,
            total_volume,
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn total_volume(&self) -> f64 {
        self.total_volume
    }

    #[must_use]
    pub fn mode(&self) -> BoundingMode {
        self.mode
    }

    #[must_use]
    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<FrameRecord> {
        self.records
    }

    /// Reduces one frame and appends its record.
    ///
    /// Frames must arrive in strictly increasing order. On error nothing is
    /// appended.
    pub fn record(
        &mut self,
        surfaces: &[BodySurface],
        snapshot: &SceneSnapshot,
    ) -> Result<FrameRecord> {
        if let Some(last) = self.records.last() {
            if snapshot.frame <= last.time {
                return Err(GeometryError::invalid(format!(
                    "frame {} arrived after frame {}",
                    snapshot.frame, last.time
                )));
            }
        }

        let points = world_points(self.mode, surfaces, snapshot)?;
        let sphere = bounding_sphere(&points)?;
        let fraction = packing_fraction(self.total_volume, &sphere)?;
        let max_radius = max_distance(&points, sphere.center)?;

        let record = FrameRecord {
            time: snapshot.frame,
            aggregate_volume: self.total_volume,
            bounding_radius: sphere.radius,
            packing_fraction: fraction * self.unit.scale(),
            max_radius,
        };
        self.records.push(record);
        Ok(record)
    }

    /// Records `frames` frames of `scene`: the current state as frame 0,
    /// then one backend step before each further frame.
    pub fn run<B: PhysicsBackend>(
        &mut self,
        scene: &mut SceneContext<B>,
        frames: u32,
        metrics: &SweepMetrics,
    ) -> anyhow::Result<()> {
        for t in 0..frames {
            if t > 0 {
                scene
                    .step()
                    .with_context(|| format!("physics step to frame {t}"))?;
            }
            let snapshot = scene.snapshot();
            let record = self
                .record(scene.surfaces(), &snapshot)
                .with_context(|| format!("reducing frame {}", snapshot.frame))?;
            metrics.record_frame(record.time, record.packing_fraction);
        }
        Ok(())
    }
}
