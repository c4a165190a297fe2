//! Surface tessellation for primary particles and aggregates.

use crate::error::{GeometryError, Result};
use aggpack_data::{Aggregate, TriMesh};
use glam::DVec3;
use std::f64::consts::{PI, TAU};

/// Builds a closed UV sphere with `segments` meridians and `rings` bands,
/// z-up, wound counter-clockwise seen from outside.
///
/// Vertex layout: north pole, then `rings - 1` latitude rings of `segments`
/// vertices each from north to south, then the south pole. Every vertex lies
/// exactly on the sphere, so the mesh volume is slightly below the ideal
/// sphere volume.
pub fn uv_sphere(center: DVec3, radius: f64, segments: u32, rings: u32) -> Result<TriMesh> {
    if segments < 3 || rings < 2 {
        return Err(GeometryError::invalid(format!(
            "UV sphere needs segments >= 3 and rings >= 2, got {segments}x{rings}"
        )));
    }
    if !(radius > 0.0 && radius.is_finite()) {
        return Err(GeometryError::invalid(format!(
            "sphere radius must be positive, got {radius}"
        )));
    }

    let seg = segments as usize;
    let mut vertices = Vec::with_capacity(2 + seg * (rings as usize - 1));
    vertices.push(center + DVec3::Z * radius);
    for k in 1..rings {
        let phi = PI * f64::from(k) / f64::from(rings);
        let (ring, z) = (radius * phi.sin(), radius * phi.cos());
        for j in 0..segments {
            let theta = TAU * f64::from(j) / f64::from(segments);
            vertices.push(center + DVec3::new(ring * theta.cos(), ring * theta.sin(), z));
        }
    }
    vertices.push(center - DVec3::Z * radius);

    let south = (vertices.len() - 1) as u32;
    let at = |k: u32, j: u32| 1 + (k - 1) * segments + (j % segments);

    let mut triangles = Vec::with_capacity(2 * seg * (rings as usize - 1));
    for j in 0..segments {
        triangles.push([0, at(1, j), at(1, j + 1)]);
    }
    for k in 1..rings - 1 {
        for j in 0..segments {
            let (a, b) = (at(k, j), at(k, j + 1));
            let (c, d) = (at(k + 1, j), at(k + 1, j + 1));
            triangles.push([a, c, d]);
            triangles.push([a, d, b]);
        }
    }
    for j in 0..segments {
        triangles.push([south, at(rings - 1, j + 1), at(rings - 1, j)]);
    }

    Ok(TriMesh::new(vertices, triangles))
}

/// Joins one UV sphere per particle into a single mesh in the aggregate's
/// build frame. Spheres are not merged; touching spheres share no vertices.
pub fn aggregate_surface(aggregate: &Aggregate, segments: u32, rings: u32) -> Result<TriMesh> {
    let r = aggregate.particle_radius();
    let mut surface = TriMesh::default();
    for particle in aggregate.particles() {
        surface.append(&uv_sphere(particle.position, r, segments, rings)?);
    }
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aggpack_data::Particle;

    #[test]
    fn test_uv_sphere_counts() {
        let mesh = uv_sphere(DVec3::ZERO, 1.0, 32, 16).unwrap();
        assert_eq!(mesh.vertices.len(), 2 + 32 * 15);
        assert_eq!(mesh.triangles.len(), 2 * 32 * 15);
    }

    #[test]
    fn test_uv_sphere_vertices_on_surface() {
        let center = DVec3::new(1.0, 2.0, 3.0);
        let mesh = uv_sphere(center, 2.5, 12, 6).unwrap();
        for v in &mesh.vertices {
            assert!((v.distance(center) - 2.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_uv_sphere_indices_in_range() {
        let mesh = uv_sphere(DVec3::ZERO, 1.0, 8, 4).unwrap();
        let n = mesh.vertices.len() as u32;
        assert!(mesh.triangles.iter().flatten().all(|&i| i < n));
    }

    #[test]
    fn test_uv_sphere_rejects_degenerate() {
        assert!(uv_sphere(DVec3::ZERO, 1.0, 2, 16).is_err());
        assert!(uv_sphere(DVec3::ZERO, 1.0, 32, 1).is_err());
        assert!(uv_sphere(DVec3::ZERO, 0.0, 32, 16).is_err());
    }

    #[test]
    fn test_aggregate_surface_joins_spheres() {
        let agg = Aggregate::new(
            vec![
                Particle::new(DVec3::ZERO),
                Particle::new(DVec3::new(2.0, 0.0, 0.0)),
            ],
            1.0,
            1.0,
        );
        let surface = aggregate_surface(&agg, 8, 4).unwrap();
        let single = uv_sphere(DVec3::ZERO, 1.0, 8, 4).unwrap();
        assert_eq!(surface.vertices.len(), 2 * single.vertices.len());
        assert_eq!(surface.triangles.len(), 2 * single.triangles.len());
        let aabb = surface.aabb().unwrap();
        assert!((aabb.max.x - 3.0).abs() < 1e-12);
        assert!((aabb.min.x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_surface_shells_index_own_vertices() {
        let agg = Aggregate::new(
            vec![
                Particle::new(DVec3::new(-1.5, 0.0, 0.0)),
                Particle::new(DVec3::new(1.5, 0.0, 0.0)),
            ],
            1.0,
            1.0,
        );
        let surface = aggregate_surface(&agg, 8, 4).unwrap();
        let shell = uv_sphere(DVec3::ZERO, 1.0, 8, 4).unwrap();
        let per_shell = shell.triangles.len();
        for (t, tri) in surface.triangles.iter().enumerate() {
            let owner = if t < per_shell { 0 } else { 1 };
            let center = agg.particles()[owner].position;
            for &i in tri {
                let v = surface.vertices[i as usize];
                assert!((v.distance(center) - 1.0).abs() < 1e-12);
            }
        }
        assert_eq!(surface.triangles[per_shell], {
            let n = shell.vertices.len() as u32;
            let [a, b, c] = shell.triangles[0];
            [a + n, b + n, c + n]
        });
    }
}
