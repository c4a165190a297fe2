//! Even placement of points on a sphere.
//!
//! Uses a golden-ratio spiral: points are spaced uniformly in height and
//! advanced by a constant irrational fraction of a turn, which gives close to
//! uniform surface density without any randomness.

use glam::DVec3;
use std::f64::consts::TAU;

/// Fraction of a turn between consecutive points, `(sqrt(5) - 1) / 2`.
pub const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_894_8;

/// Returns `n` points on the origin-centered sphere of radius `radius`.
///
/// Point `i` sits at height `y = r(1 - 2(i + 0.5)/n)`, so the sequence runs
/// from the top pole region to the bottom. `n = 0` yields an empty vector and
/// `radius = 0` yields `n` copies of the origin.
#[must_use]
pub fn distribute_on_sphere(n: usize, radius: f64) -> Vec<DVec3> {
    (0..n)
        .map(|i| {
            let index = i as f64 + 0.5;
            let y = 2.0 * radius * (1.0 - index / n as f64) - radius;
            let ring = (radius * radius - y * y).max(0.0).sqrt();
            let theta = TAU * GOLDEN_RATIO_CONJUGATE * index;
            DVec3::new(ring * theta.cos(), y, ring * theta.sin())
        })
        .collect()
}
