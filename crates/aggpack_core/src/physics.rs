//! The physics collaborator seam.
//!
//! Moving aggregates over time is not part of the geometry core. The core
//! talks to a [`PhysicsBackend`], which owns the rigid bodies, advances them
//! one frame per call and reports their world transforms. Any engine can sit
//! behind the trait; [`CentralForceStepper`] is a small stand-in that pulls
//! bodies toward a point and keeps them from interpenetrating.

use crate::config::{FieldConfig, PhysicsConfig};
use crate::spatial_hash::SpatialHash;
use aggpack_data::{Aggregate, BodyId, BodyTransform, SceneSnapshot};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Per-body rigid settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBodySettings {
    pub mass: f64,
    pub friction: f64,
    pub linear_damping: f64,
    pub restitution: f64,
}

impl RigidBodySettings {
    /// Settings for `aggregate` under `physics`: mass comes from the
    /// aggregate's volume and density.
    #[must_use]
    pub fn for_aggregate(aggregate: &Aggregate, physics: &PhysicsConfig) -> Self {
        Self {
            mass: aggregate.mass(),
            friction: physics.friction,
            linear_damping: physics.linear_damping,
            restitution: physics.restitution,
        }
    }
}

/// A force of constant magnitude along the line to `center`. Negative
/// strength attracts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceField {
    pub center: DVec3,
    pub strength: f64,
}

impl From<&FieldConfig> for ForceField {
    fn from(config: &FieldConfig) -> Self {
        Self {
            center: DVec3::from_array(config.center),
            strength: config.strength,
        }
    }
}

impl ForceField {
    /// Force on a body at `position`. Zero at the center itself.
    #[must_use]
    pub fn force_at(&self, position: DVec3) -> DVec3 {
        (position - self.center).normalize_or_zero() * self.strength
    }
}

/// An engine that evolves rigid aggregate bodies frame by frame.
///
/// Every call blocks until the engine has finished; `step` must advance
/// exactly one frame.
pub trait PhysicsBackend {
    /// Removes every body and force field, returning to frame 0.
    fn reset(&mut self);

    /// Adds `aggregate` as one rigid body, at rest in its build frame.
    fn add_body(&mut self, aggregate: &Aggregate, settings: &RigidBodySettings) -> BodyId;

    fn set_force_field(&mut self, field: ForceField);

    /// Advances the simulation by one frame.
    fn step(&mut self) -> anyhow::Result<()>;

    /// Transforms of all bodies at the current frame, indexed by [`BodyId`].
    fn snapshot(&self) -> SceneSnapshot;

    fn frame(&self) -> u32;
}

#[derive(Debug, Clone)]
struct Body {
    origin: DVec3,
    position: DVec3,
    velocity: DVec3,
    inv_mass: f64,
    settings: RigidBodySettings,
    /// Particle centers relative to `origin`.
    offsets: Vec<DVec3>,
    particle_radius: f64,
    bounding_radius: f64,
}

/// Translation-only rigid bodies under a central force field.
///
/// Each frame is split into `substeps` explicit Euler steps. After every
/// substep, overlapping particles of different bodies are pushed apart along
/// their center line in proportion to inverse mass, and the approaching
/// part of their relative velocity is removed. Bodies never rotate.
pub struct CentralForceStepper {
    bodies: Vec<Body>,
    field: Option<ForceField>,
    time_step: f64,
    substeps: u32,
    frame: u32,
    broad_phase: SpatialHash,
}

impl CentralForceStepper {
    #[must_use]
    pub fn new(time_step: f64, substeps: u32) -> Self {
        Self {
            bodies: Vec::new(),
            field: None,
            time_step,
            substeps: substeps.max(1),
            frame: 0,
            broad_phase: SpatialHash::new(1.0),
        }
    }

    #[must_use]
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(config.time_step, config.substeps)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Current centroid and velocity of a body.
    pub fn body_state(&self, id: BodyId) -> Option<(DVec3, DVec3)> {
        self.bodies.get(id.0).map(|b| (b.position, b.velocity))
    }

    fn integrate(&mut self, dt: f64) {
        for body in &mut self.bodies {
            if let Some(field) = &self.field {
                body.velocity += field.force_at(body.position) * body.inv_mass * dt;
            }
            body.velocity *= (1.0 - body.settings.linear_damping).clamp(0.0, 1.0).powf(dt);
            body.position += body.velocity * dt;
        }
    }

    fn resolve_contacts(&mut self) {
        if self.bodies.len() < 2 {
            return;
        }
        let max_radius = self
            .bodies
            .iter()
            .map(|b| b.bounding_radius)
            .fold(0.0, f64::max);
        let centers: Vec<DVec3> = self.bodies.iter().map(|b| b.position).collect();
        self.broad_phase = SpatialHash::new(2.0 * max_radius);
        self.broad_phase.build(&centers);

        let mut candidates = Vec::new();
        for i in 0..self.bodies.len() {
            let reach = self.bodies[i].bounding_radius + max_radius;
            self.broad_phase
                .query_into(self.bodies[i].position, reach, &mut candidates);
            candidates.sort_unstable();
            for &j in candidates.iter().filter(|&&j| j > i) {
                let (left, right) = self.bodies.split_at_mut(j);
                resolve_pair(&mut left[i], &mut right[0]);
            }
        }
    }
}

fn resolve_pair(a: &mut Body, b: &mut Body) {
    let reach = a.bounding_radius + b.bounding_radius;
    if a.position.distance_squared(b.position) > reach * reach {
        return;
    }
    let inv_sum = a.inv_mass + b.inv_mass;
    if inv_sum <= 0.0 {
        return;
    }
    let contact = a.particle_radius + b.particle_radius;
    let restitution = a.settings.restitution.max(b.settings.restitution);
    let friction = 0.5 * (a.settings.friction + b.settings.friction);

    for offset_a in &a.offsets {
        for offset_b in &b.offsets {
            let pa = a.position + *offset_a;
            let pb = b.position + *offset_b;
            let diff = pb - pa;
            let dist_sq = diff.length_squared();
            if dist_sq >= contact * contact || dist_sq < 1.0e-20 {
                continue;
            }
            let dist = dist_sq.sqrt();
            let normal = diff / dist;
            let correction = normal * (contact - dist) / inv_sum;
            a.position -= correction * a.inv_mass;
            b.position += correction * b.inv_mass;

            let rel = b.velocity - a.velocity;
            let rel_normal = rel.dot(normal);
            if rel_normal < 0.0 {
                let tangent = rel - normal * rel_normal;
                let impulse = normal * (-(1.0 + restitution) * rel_normal)
                    - tangent * friction.clamp(0.0, 1.0);
                let impulse = impulse / inv_sum;
                a.velocity -= impulse * a.inv_mass;
                b.velocity += impulse * b.inv_mass;
            }
        }
    }
}

impl PhysicsBackend for CentralForceStepper {
    fn reset(&mut self) {
        self.bodies.clear();
        self.field = None;
        self.frame = 0;
        self.broad_phase.clear();
    }

    fn add_body(&mut self, aggregate: &Aggregate, settings: &RigidBodySettings) -> BodyId {
        let origin = aggregate.centroid();
        let inv_mass = if settings.mass > 0.0 {
            1.0 / settings.mass
        } else {
            0.0
        };
        self.bodies.push(Body {
            origin,
            position: origin,
            velocity: DVec3::ZERO,
            inv_mass,
            settings: *settings,
            offsets: aggregate
                .particles()
                .iter()
                .map(|p| p.position - origin)
                .collect(),
            particle_radius: aggregate.particle_radius(),
            bounding_radius: aggregate.bounding_radius(),
        });
        BodyId(self.bodies.len() - 1)
    }

    fn set_force_field(&mut self, field: ForceField) {
        self.field = Some(field);
    }

    fn step(&mut self) -> anyhow::Result<()> {
        let dt = self.time_step / f64::from(self.substeps);
        for _ in 0..self.substeps {
            self.integrate(dt);
            self.resolve_contacts();
        }
        if let Some(idx) = self.bodies.iter().position(|b| !b.position.is_finite()) {
            anyhow::bail!("body {idx} left finite space at frame {}", self.frame + 1);
        }
        self.frame += 1;
        Ok(())
    }

    fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot::new(
            self.frame,
            self.bodies
                .iter()
                .map(|b| BodyTransform::from_translation(b.position - b.origin))
                .collect(),
        )
    }

    fn frame(&self) -> u32 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aggpack_data::Particle;

    fn sphere_at(p: DVec3) -> Aggregate {
        Aggregate::new(vec![Particle::new(p)], 1.0, 1.0)
    }

    fn settings(agg: &Aggregate) -> RigidBodySettings {
        RigidBodySettings::for_aggregate(agg, &PhysicsConfig::default())
    }

    #[test]
    fn test_force_field_direction() {
        let field = ForceField {
            center: DVec3::ZERO,
            strength: -10.0,
        };
        let f = field.force_at(DVec3::new(5.0, 0.0, 0.0));
        assert_eq!(f, DVec3::new(-10.0, 0.0, 0.0));
        assert_eq!(field.force_at(DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn test_body_moves_toward_center() {
        let mut stepper = CentralForceStepper::new(1.0 / 24.0, 4);
        let agg = sphere_at(DVec3::new(20.0, 0.0, 0.0));
        let id = stepper.add_body(&agg, &settings(&agg));
        stepper.set_force_field(ForceField {
            center: DVec3::ZERO,
            strength: -50.0,
        });
        for _ in 0..10 {
            stepper.step().unwrap();
        }
        let (position, _) = stepper.body_state(id).unwrap();
        assert!(position.x < 20.0);
        let snapshot = stepper.snapshot();
        assert_eq!(snapshot.frame, 10);
        assert!(snapshot.transforms[0].translation.x < 0.0);
    }

    #[test]
    fn test_no_field_no_motion() {
        let mut stepper = CentralForceStepper::new(1.0 / 24.0, 2);
        let agg = sphere_at(DVec3::new(3.0, 4.0, 5.0));
        stepper.add_body(&agg, &settings(&agg));
        stepper.step().unwrap();
        assert_eq!(stepper.snapshot().transforms[0], BodyTransform::IDENTITY);
    }

    #[test]
    fn test_overlapping_bodies_separate() {
        let mut stepper = CentralForceStepper::new(1.0 / 24.0, 1);
        let a = sphere_at(DVec3::new(-0.5, 0.0, 0.0));
        let b = sphere_at(DVec3::new(0.5, 0.0, 0.0));
        let ia = stepper.add_body(&a, &settings(&a));
        let ib = stepper.add_body(&b, &settings(&b));
        stepper.step().unwrap();
        let (pa, _) = stepper.body_state(ia).unwrap();
        let (pb, _) = stepper.body_state(ib).unwrap();
        assert!(pa.distance(pb) >= 2.0 - 1e-9);
    }

    #[test]
    fn test_reset_clears_bodies() {
        let mut stepper = CentralForceStepper::new(1.0 / 24.0, 1);
        let agg = sphere_at(DVec3::ZERO);
        stepper.add_body(&agg, &settings(&agg));
        stepper.step().unwrap();
        stepper.reset();
        assert_eq!(stepper.body_count(), 0);
        assert_eq!(stepper.frame(), 0);
        assert_eq!(stepper.snapshot().body_count(), 0);
    }
}
