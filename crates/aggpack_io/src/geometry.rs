//! Wavefront OBJ export of final aggregate surfaces.

use crate::error::{IoError, Result};
use aggpack_data::TriMesh;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes every mesh as its own `o aggregate_<i>` object. Face indices are
/// 1-based and global to the file, as OBJ requires.
pub fn write_obj<W: Write>(writer: W, meshes: &[TriMesh]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "# aggpack surface export")?;
    writeln!(writer, "# objects: {}", meshes.len())?;

    let mut offset: u64 = 1;
    for (i, mesh) in meshes.iter().enumerate() {
        writeln!(writer, "o aggregate_{i}")?;
        for v in &mesh.vertices {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for [a, b, c] in &mesh.triangles {
            writeln!(
                writer,
                "f {} {} {}",
                offset + u64::from(*a),
                offset + u64::from(*b),
                offset + u64::from(*c)
            )?;
        }
        offset += mesh.vertices.len() as u64;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_obj_file<P: AsRef<Path>>(path: P, meshes: &[TriMesh]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("creating {path:?}")))?;
    write_obj(file, meshes).map_err(|e| e.with_context(format!("writing {path:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn triangle(shift: f64) -> TriMesh {
        TriMesh::new(
            vec![
                DVec3::new(shift, 0.0, 0.0),
                DVec3::new(shift + 1.0, 0.0, 0.0),
                DVec3::new(shift, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    fn export(meshes: &[TriMesh]) -> String {
        let mut buf = Vec::new();
        write_obj(&mut buf, meshes).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_faces_are_one_based_and_offset() {
        let text = export(&[triangle(0.0), triangle(5.0)]);
        let faces: Vec<&str> = text.lines().filter(|l| l.starts_with("f ")).collect();
        assert_eq!(faces, vec!["f 1 2 3", "f 4 5 6"]);
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 6);
    }

    #[test]
    fn test_one_object_per_mesh() {
        let text = export(&[triangle(0.0), triangle(1.0), triangle(2.0)]);
        let objects: Vec<&str> = text.lines().filter(|l| l.starts_with("o ")).collect();
        assert_eq!(objects, vec!["o aggregate_0", "o aggregate_1", "o aggregate_2"]);
    }

    #[test]
    fn test_empty_export() {
        let text = export(&[]);
        assert!(text.contains("# objects: 0"));
        assert!(!text.contains("\nv "));
    }
}
