//! Stochastic growth of touching-sphere aggregates.
//!
//! Each new particle is placed tangent to a *base* particle chosen from the
//! ones already placed. With probability `jump_chance` the base is a random
//! earlier particle (branching), otherwise it is the most recent one
//! (chaining). High jump chances give compact, branchy clusters; low ones
//! give strings.
//!
//! Candidates that overlap an existing particle are rejected and redrawn.
//! The number of redraws per particle is bounded, so crowded configurations
//! fail with [`GeometryError::PlacementExhausted`] instead of spinning.

use crate::error::{GeometryError, Result};
use aggpack_data::{Aggregate, Particle};
use glam::DVec3;
use rand::Rng;
use std::f64::consts::{PI, TAU};

/// Default redraw budget per particle.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Relative slack on the contact distance. Tangent candidates are computed as
/// `base + dir * 2r` and can land a rounding error short of `2r`.
const CONTACT_TOLERANCE: f64 = 1e-9;

/// Random direction from an azimuth in `[0, 2π)` and a polar angle drawn
/// uniformly from `[0, π)`.
///
/// The polar angle is not cosine-weighted, so directions cluster toward the
/// poles compared to a true uniform distribution on the sphere. Aggregate
/// morphology statistics are calibrated against this sampler.
pub fn polar_biased_direction<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    let theta = rng.gen_range(0.0..TAU);
    let phi = rng.gen_range(0.0..PI);
    DVec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
}

/// Builds aggregates of equal spheres.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateBuilder {
    particle_radius: f64,
    jump_chance: f64,
    density: f64,
    max_attempts: usize,
}

impl AggregateBuilder {
    #[must_use]
    pub fn new(particle_radius: f64) -> Self {
        Self {
            particle_radius,
            jump_chance: 0.5,
            density: 1.0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_jump_chance(mut self, jump_chance: f64) -> Self {
        self.jump_chance = jump_chance;
        self
    }

    #[must_use]
    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn particle_radius(&self) -> f64 {
        self.particle_radius
    }

    #[must_use]
    pub fn jump_chance(&self) -> f64 {
        self.jump_chance
    }

    fn validate(&self, count: usize) -> Result<()> {
        if !(self.particle_radius > 0.0 && self.particle_radius.is_finite()) {
            return Err(GeometryError::invalid(format!(
                "particle radius must be positive, got {}",
                self.particle_radius
            )));
        }
        if !(0.0..=1.0).contains(&self.jump_chance) {
            return Err(GeometryError::invalid(format!(
                "jump chance must be in [0, 1], got {}",
                self.jump_chance
            )));
        }
        if count == 0 {
            return Err(GeometryError::invalid("aggregate needs at least one particle"));
        }
        if self.max_attempts == 0 {
            return Err(GeometryError::invalid("max attempts must be at least 1"));
        }
        Ok(())
    }

    /// Grows an aggregate of `count` particles with the first one at `center`.
    ///
    /// All pairwise center distances in the result are at least `2r` (less
    /// a relative 1e-9). The random stream is consumed in a fixed order, so a
    /// seeded generator reproduces the same positions bit for bit.
    pub fn build<R: Rng + ?Sized>(
        &self,
        center: DVec3,
        count: usize,
        rng: &mut R,
    ) -> Result<Aggregate> {
        self.validate(count)?;

        let contact = 2.0 * self.particle_radius;
        let min_dist_sq = (contact * (1.0 - CONTACT_TOLERANCE)).powi(2);
        let mut positions = Vec::with_capacity(count);
        positions.push(center);

        while positions.len() < count {
            let mut attempts = 0;
            let placed = loop {
                if attempts == self.max_attempts {
                    tracing::warn!(
                        placed = positions.len(),
                        target = count,
                        attempts,
                        "Aggregate placement exhausted"
                    );
                    return Err(GeometryError::PlacementExhausted {
                        placed: positions.len(),
                        target: count,
                        attempts,
                    });
                }
                attempts += 1;

                let base = self.choose_base(&positions, rng);
                let candidate = base + polar_biased_direction(rng) * contact;
                if positions
                    .iter()
                    .all(|p| p.distance_squared(candidate) >= min_dist_sq)
                {
                    break candidate;
                }
            };
            positions.push(placed);
        }

        Ok(Aggregate::new(
            positions.into_iter().map(Particle::new).collect(),
            self.particle_radius,
            self.density,
        ))
    }

    /// Picks the particle the next candidate grows from.
    fn choose_base<R: Rng + ?Sized>(&self, positions: &[DVec3], rng: &mut R) -> DVec3 {
        let last = positions.len() - 1;
        if positions.len() > 1 && rng.gen::<f64>() < self.jump_chance {
            positions[rng.gen_range(0..last)]
        } else {
            positions[last]
        }
    }
}
