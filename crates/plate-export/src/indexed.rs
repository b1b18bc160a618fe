//! Shared-vertex meshes for the formats that index their vertices.

use std::collections::HashMap;

use plate_kernel::RenderMesh;

use crate::errors::ExportError;
use crate::stl::check_mesh;

/// A triangle mesh whose coincident vertices have been merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    pub positions: Vec<[f32; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Merge vertices with identical coordinates and drop triangles that
    /// collapse as a result.
    pub fn weld(mesh: &RenderMesh) -> Result<Self, ExportError> {
        check_mesh(mesh)?;
        let mut out = IndexedMesh::default();
        let mut seen: HashMap<[u32; 3], u32> = HashMap::new();
        let mut remap = Vec::with_capacity(mesh.vertices.len() / 3);
        for i in 0..mesh.vertices.len() / 3 {
            let p = mesh.vertex(i as u32);
            // -0.0 and 0.0 are the same point.
            let key = p.map(|x| if x == 0.0 { 0 } else { x.to_bits() });
            let index = *seen.entry(key).or_insert_with(|| {
                out.positions.push(p);
                (out.positions.len() - 1) as u32
            });
            remap.push(index);
        }
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [remap[tri[0] as usize], remap[tri[1] as usize], remap[tri[2] as usize]];
            if a != b && b != c && a != c {
                out.triangles.push([a, b, c]);
            }
        }
        if out.triangles.is_empty() {
            return Err(ExportError::EmptyMesh);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_faces_share_their_corners() {
        // Two triangles of one square, each with its own copy of the diagonal.
        let mesh = RenderMesh {
            vertices: vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
            ],
            normals: vec![0.0; 18],
            indices: vec![0, 1, 2, 3, 4, 5],
            face_ranges: Vec::new(),
        };
        let welded = IndexedMesh::weld(&mesh).unwrap();
        assert_eq!(welded.positions.len(), 4);
        assert_eq!(welded.triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn collapsed_triangles_are_dropped() {
        let mesh = RenderMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0],
            normals: vec![0.0; 12],
            indices: vec![0, 1, 2, 0, 1, 3],
            face_ranges: Vec::new(),
        };
        let welded = IndexedMesh::weld(&mesh).unwrap();
        assert_eq!(welded.triangles.len(), 1);
    }
}
