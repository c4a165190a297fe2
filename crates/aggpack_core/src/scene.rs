//! Per-run scene state.
//!
//! A [`SceneContext`] holds everything one sweep combination touches: its
//! random stream, the aggregates it built, their surfaces and the physics
//! backend evolving them. It is created per run and passed by reference;
//! nothing about a scene lives in global state.

use crate::aggregate::AggregateBuilder;
use crate::config::{MeshConfig, ParticleConfig, PhysicsConfig};
use crate::distribution::distribute_on_sphere;
use crate::error::{GeometryError, Result};
use crate::mesh::aggregate_surface;
use crate::physics::{ForceField, PhysicsBackend, RigidBodySettings};
use crate::volume::mesh_volume;
use aggpack_data::{Aabb, Aggregate, BodyId, ParameterSet, SceneSnapshot, TriMesh};
use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The surface of one body in the frame it was built in.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySurface {
    pub mesh: TriMesh,
    /// Rotation pivot for the body's transforms: the aggregate centroid.
    pub pivot: DVec3,
    pub local_aabb: Aabb,
    /// Enclosed mesh volume, fixed because bodies are rigid.
    pub volume: f64,
}

impl BodySurface {
    /// Tessellates `aggregate` and measures it once.
    pub fn from_aggregate(aggregate: &Aggregate, mesh: &MeshConfig) -> Result<Self> {
        let surface = aggregate_surface(aggregate, mesh.segments, mesh.rings)?;
        let local_aabb = surface.aabb().ok_or(GeometryError::EmptyGeometry)?;
        let volume = mesh_volume(&surface);
        Ok(Self {
            mesh: surface,
            pivot: aggregate.centroid(),
            local_aabb,
            volume,
        })
    }

    /// Mesh vertices moved by the body's transform. Fails when `snapshot`
    /// carries no transform for `id`.
    pub fn world_mesh(&self, snapshot: &SceneSnapshot, id: BodyId) -> Result<TriMesh> {
        let transform = snapshot.transform(id).ok_or_else(|| {
            GeometryError::invalid(format!(
                "snapshot has {} bodies but body {} was requested",
                snapshot.body_count(),
                id.0
            ))
        })?;
        Ok(TriMesh::new(
            self.mesh
                .vertices
                .iter()
                .map(|v| transform.apply(*v, self.pivot))
                .collect(),
            self.mesh.triangles.clone(),
        ))
    }
}

pub struct SceneContext<B: PhysicsBackend> {
    seed: u64,
    rng: ChaCha8Rng,
    aggregates: Vec<Aggregate>,
    surfaces: Vec<BodySurface>,
    backend: B,
}

impl<B: PhysicsBackend> SceneContext<B> {
    /// An empty scene whose random stream starts from `seed`.
    pub fn new(seed: u64, mut backend: B) -> Self {
        backend.reset();
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            aggregates: Vec::new(),
            surfaces: Vec::new(),
            backend,
        }
    }

    /// Empties the scene and restarts the random stream from `seed`.
    pub fn reset(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.aggregates.clear();
        self.surfaces.clear();
        self.backend.reset();
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn aggregates(&self) -> &[Aggregate] {
        &self.aggregates
    }

    pub fn surfaces(&self) -> &[BodySurface] {
        &self.surfaces
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Registers a built aggregate with the backend.
    pub fn add_aggregate(
        &mut self,
        aggregate: Aggregate,
        mesh: &MeshConfig,
        physics: &PhysicsConfig,
    ) -> Result<BodyId> {
        let surface = BodySurface::from_aggregate(&aggregate, mesh)?;
        let settings = RigidBodySettings::for_aggregate(&aggregate, physics);
        let id = self.backend.add_body(&aggregate, &settings);
        self.aggregates.push(aggregate);
        self.surfaces.push(surface);
        Ok(id)
    }

    /// Builds the scene for one combination: seeds spread evenly over the
    /// placement sphere, one aggregate grown from each seed in seed order,
    /// then the force field. Fails on the first aggregate that cannot be
    /// built; the scene is then partially filled and must be reset.
    pub fn populate(
        &mut self,
        params: &ParameterSet,
        particles: &ParticleConfig,
        mesh: &MeshConfig,
        physics: &PhysicsConfig,
        field: ForceField,
    ) -> Result<()> {
        let builder = AggregateBuilder::new(params.particle_radius)
            .with_jump_chance(params.jump_chance)
            .with_density(params.density)
            .with_max_attempts(particles.max_placement_attempts);

        for seed in distribute_on_sphere(params.aggregate_count, particles.placement_radius) {
            let aggregate = builder.build(seed, params.particles_per_aggregate, &mut self.rng)?;
            self.add_aggregate(aggregate, mesh, physics)?;
        }
        self.backend.set_force_field(field);

        tracing::debug!(
            aggregates = self.aggregates.len(),
            seed = self.seed,
            "Scene populated"
        );
        Ok(())
    }

    /// Total enclosed volume of every body's surface.
    pub fn solid_volume(&self) -> f64 {
        self.surfaces.iter().map(|s| s.volume).sum()
    }

    pub fn step(&mut self) -> anyhow::Result<()> {
        self.backend.step()
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        self.backend.snapshot()
    }

    /// All body surfaces in world space at the current frame.
    pub fn world_meshes(&self) -> Result<Vec<TriMesh>> {
        let snapshot = self.snapshot();
        self.surfaces
            .iter()
            .enumerate()
            .map(|(i, s)| s.world_mesh(&snapshot, BodyId(i)))
            .collect()
    }
}
