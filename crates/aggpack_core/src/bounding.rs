//! Bounding-sphere estimation.
//!
//! The center is the midpoint of the per-axis extents and the radius is the
//! distance to the farthest input point. This is not the minimal enclosing
//! sphere, but it is cheap, deterministic and contains every point.

use crate::config::BoundingMode;
use crate::error::{GeometryError, Result};
use crate::scene::BodySurface;
use aggpack_data::{Aabb, SceneSnapshot};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    /// `(4/3)·π·r³`
    #[must_use]
    pub fn volume(&self) -> f64 {
        (4.0 / 3.0) * PI * self.radius.powi(3)
    }

    #[must_use]
    pub fn contains(&self, point: DVec3, eps: f64) -> bool {
        point.distance(self.center) <= self.radius + eps
    }
}

/// Center-of-extents bounding sphere of `points`.
pub fn bounding_sphere(points: &[DVec3]) -> Result<BoundingSphere> {
    let extents =
        Aabb::from_points(points.iter().copied()).ok_or(GeometryError::EmptyGeometry)?;
    let center = extents.center();
    let radius = max_distance(points, center)?;
    Ok(BoundingSphere { center, radius })
}

/// Largest distance from `center` to any of `points`.
pub fn max_distance(points: &[DVec3], center: DVec3) -> Result<f64> {
    if points.is_empty() {
        return Err(GeometryError::EmptyGeometry);
    }
    Ok(points
        .iter()
        .map(|p| p.distance_squared(center))
        .fold(0.0, f64::max)
        .sqrt())
}

/// World-space points of every body at the snapshot's frame.
///
/// `Exact` yields each surface vertex; `Approximate` yields the eight corners
/// of each body's build-frame bounding box, carried along with the body.
pub fn world_points(
    mode: BoundingMode,
    surfaces: &[BodySurface],
    snapshot: &SceneSnapshot,
) -> Result<Vec<DVec3>> {
    if snapshot.body_count() != surfaces.len() {
        return Err(GeometryError::invalid(format!(
            "snapshot has {} bodies but the scene has {}",
            snapshot.body_count(),
            surfaces.len()
        )));
    }

    let capacity = match mode {
        BoundingMode::Exact => surfaces.iter().map(|s| s.mesh.vertices.len()).sum(),
        BoundingMode::Approximate => surfaces.len() * 8,
    };
    let mut points = Vec::with_capacity(capacity);
    for (surface, transform) in surfaces.iter().zip(&snapshot.transforms) {
        match mode {
            BoundingMode::Exact => points.extend(
                surface
                    .mesh
                    .vertices
                    .iter()
                    .map(|v| transform.apply(*v, surface.pivot)),
            ),
            BoundingMode::Approximate => points.extend(
                surface
                    .local_aabb
                    .corners()
                    .iter()
                    .map(|v| transform.apply(*v, surface.pivot)),
            ),
        }
    }
    Ok(points)
}
