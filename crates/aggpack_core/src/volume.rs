//! Enclosed volume of closed triangle meshes.
//!
//! Each triangle forms a tetrahedron with the origin; summing their signed
//! volumes (divergence theorem) gives the enclosed volume of a closed,
//! consistently wound mesh regardless of where the origin lies.
//!
//! Volumes of separate meshes are summed independently. Two aggregates whose
//! surfaces interpenetrate are double-counted in the overlap. Packing
//! fractions are defined relative to this convention.

use aggpack_data::TriMesh;

/// Signed enclosed volume of one mesh. Positive for outward winding.
#[must_use]
pub fn mesh_volume(mesh: &TriMesh) -> f64 {
    (0..mesh.triangles.len())
        .map(|i| {
            let [a, b, c] = mesh.triangle(i);
            a.dot(b.cross(c))
        })
        .sum::<f64>()
        / 6.0
}

/// Sum of the enclosed volumes of `meshes`.
pub fn total_volume<'a, I>(meshes: I) -> f64
where
    I: IntoIterator<Item = &'a TriMesh>,
{
    meshes.into_iter().map(mesh_volume).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::uv_sphere;
    use glam::DVec3;
    use std::f64::consts::PI;

    fn unit_cube() -> TriMesh {
        let v = |x: f64, y: f64, z: f64| DVec3::new(x, y, z);
        TriMesh::new(
            vec![
                v(0.0, 0.0, 0.0),
                v(1.0, 0.0, 0.0),
                v(1.0, 1.0, 0.0),
                v(0.0, 1.0, 0.0),
                v(0.0, 0.0, 1.0),
                v(1.0, 0.0, 1.0),
                v(1.0, 1.0, 1.0),
                v(0.0, 1.0, 1.0),
            ],
            vec![
                [0, 2, 1],
                [0, 3, 2],
                [4, 5, 6],
                [4, 6, 7],
                [0, 1, 5],
                [0, 5, 4],
                [2, 3, 7],
                [2, 7, 6],
                [1, 2, 6],
                [1, 6, 5],
                [0, 4, 7],
                [0, 7, 3],
            ],
        )
    }

    #[test]
    fn test_cube_volume() {
        assert!((mesh_volume(&unit_cube()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_volume_is_translation_invariant() {
        let mut cube = unit_cube();
        for v in &mut cube.vertices {
            *v += DVec3::new(10.0, -4.0, 7.0);
        }
        assert!((mesh_volume(&cube) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_uv_sphere_volume_approaches_ideal() {
        let ideal = 4.0 / 3.0 * PI;
        let coarse = mesh_volume(&uv_sphere(DVec3::ZERO, 1.0, 32, 16).unwrap());
        let fine = mesh_volume(&uv_sphere(DVec3::ZERO, 1.0, 128, 64).unwrap());
        assert!(coarse > 0.9 * ideal && coarse < ideal);
        assert!(fine > coarse && fine < ideal);
    }

    #[test]
    fn test_overlapping_meshes_double_count() {
        let cube = unit_cube();
        assert!((total_volume([&cube, &cube]) - 2.0).abs() < 1e-12);
    }
}
