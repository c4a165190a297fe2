use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A primary particle: one sphere of an aggregate.
///
/// The radius is shared by every particle of the owning [`Aggregate`], so only
/// the center is stored here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: DVec3,
}

impl Particle {
    #[must_use]
    pub fn new(position: DVec3) -> Self {
        Self { position }
    }
}

/// A rigid cluster of touching, equal spheres.
///
/// Particle order is growth order: index 0 is the seed, and every later
/// particle was placed tangent to one of the particles before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    particles: Vec<Particle>,
    particle_radius: f64,
    density: f64,
}

impl Aggregate {
    #[must_use]
    pub fn new(particles: Vec<Particle>, particle_radius: f64, density: f64) -> Self {
        Self {
            particles,
            particle_radius,
            density,
        }
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[must_use]
    pub fn particle_radius(&self) -> f64 {
        self.particle_radius
    }

    #[must_use]
    pub fn density(&self) -> f64 {
        self.density
    }

    /// The seed particle's center.
    #[must_use]
    pub fn seed(&self) -> Option<DVec3> {
        self.particles.first().map(|p| p.position)
    }

    /// Sum of the ideal sphere volumes, ignoring tessellation.
    #[must_use]
    pub fn nominal_volume(&self) -> f64 {
        (4.0 / 3.0) * PI * self.particle_radius.powi(3) * self.particles.len() as f64
    }

    /// Mass handed to the rigid body: nominal volume times density.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.nominal_volume() * self.density
    }

    /// Arithmetic mean of the particle centers.
    #[must_use]
    pub fn centroid(&self) -> DVec3 {
        if self.particles.is_empty() {
            return DVec3::ZERO;
        }
        let sum: DVec3 = self.particles.iter().map(|p| p.position).sum();
        sum / self.particles.len() as f64
    }

    /// Distance from the centroid to the farthest particle surface.
    #[must_use]
    pub fn bounding_radius(&self) -> f64 {
        let c = self.centroid();
        self.particles
            .iter()
            .map(|p| p.position.distance(c))
            .fold(0.0, f64::max)
            + self.particle_radius
    }
}
