//! Wavefront OBJ: one object, welded vertices, 1-based faces.

use std::fmt::Write;

use plate_kernel::RenderMesh;

use crate::errors::ExportError;
use crate::indexed::IndexedMesh;

pub fn write_obj(mesh: &RenderMesh, name: &str) -> Result<String, ExportError> {
    let mesh = IndexedMesh::weld(mesh)?;
    let mut out = String::with_capacity(mesh.positions.len() * 32 + mesh.triangles.len() * 24);
    // Writing to a String cannot fail.
    let _ = writeln!(out, "# {} vertices, {} triangles", mesh.positions.len(), mesh.triangles.len());
    let _ = writeln!(out, "o {}", name);
    for [x, y, z] in &mesh.positions {
        let _ = writeln!(out, "v {} {} {}", x, y, z);
    }
    for [a, b, c] in &mesh.triangles {
        let _ = writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_are_one_based() {
        let mesh = RenderMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            normals: vec![0.0; 12],
            indices: vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
            face_ranges: Vec::new(),
        };
        let text = write_obj(&mesh, "tet").unwrap();
        assert!(text.contains("\no tet\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert!(text.contains("\nf 1 3 2\n"));
        assert!(text.ends_with("f 2 3 4\n"));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        assert!(matches!(write_obj(&RenderMesh::default(), "x"), Err(ExportError::EmptyMesh)));
    }
}
