//! STL in binary and ASCII form.
//!
//! Binary layout: 80-byte header, u32 triangle count (little-endian), then
//! per triangle 3×f32 normal + 3×(3×f32 vertex) + u16 attribute = 50 bytes.

use std::fmt::Write;

use plate_kernel::RenderMesh;

use crate::errors::ExportError;

const HEADER_LEN: usize = 80;
const TRIANGLE_LEN: usize = 50;

pub(crate) fn check_mesh(mesh: &RenderMesh) -> Result<(), ExportError> {
    if mesh.triangle_count() == 0 {
        return Err(ExportError::EmptyMesh);
    }
    let vertex_count = mesh.vertices.len() / 3;
    if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(ExportError::IndexOutOfRange { index, vertex_count });
    }
    Ok(())
}

/// Unit normal from the winding; +Z for a degenerate triangle.
fn facet_normal([a, b, c]: [[f32; 3]; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [u[1] * v[2] - u[2] * v[1], u[2] * v[0] - u[0] * v[2], u[0] * v[1] - u[1] * v[0]];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 1e-12 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

pub fn write_binary_stl(mesh: &RenderMesh, name: &str) -> Result<Vec<u8>, ExportError> {
    check_mesh(mesh)?;
    let count = mesh.triangle_count();
    let mut buf = Vec::with_capacity(HEADER_LEN + 4 + count * TRIANGLE_LEN);

    let header = format!("binary STL: {}", name);
    let header = header.as_bytes();
    buf.extend_from_slice(&header[..header.len().min(HEADER_LEN)]);
    buf.resize(HEADER_LEN, 0u8);
    buf.extend_from_slice(&(count as u32).to_le_bytes());

    for tri in mesh.triangles() {
        for x in facet_normal(tri) {
            buf.extend_from_slice(&x.to_le_bytes());
        }
        for vertex in tri {
            for x in vertex {
                buf.extend_from_slice(&x.to_le_bytes());
            }
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }
    Ok(buf)
}

pub fn write_ascii_stl(mesh: &RenderMesh, name: &str) -> Result<String, ExportError> {
    check_mesh(mesh)?;
    let mut out = String::with_capacity(mesh.triangle_count() * 256);
    // Writing to a String cannot fail.
    let _ = writeln!(out, "solid {}", name);
    for tri in mesh.triangles() {
        let [nx, ny, nz] = facet_normal(tri);
        let _ = writeln!(out, "  facet normal {} {} {}", nx, ny, nz);
        out.push_str("    outer loop\n");
        for [x, y, z] in tri {
            let _ = writeln!(out, "      vertex {} {} {}", x, y, z);
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    let _ = writeln!(out, "endsolid {}", name);
    Ok(out)
}

/// Parse binary STL back into an unindexed mesh: three fresh vertices per
/// triangle, each carrying the facet normal.
pub fn read_binary_stl(bytes: &[u8]) -> Result<RenderMesh, ExportError> {
    let malformed = |reason: String| ExportError::MalformedStl { reason };
    let count_bytes = bytes
        .get(HEADER_LEN..HEADER_LEN + 4)
        .ok_or_else(|| malformed(format!("{} bytes is shorter than the header", bytes.len())))?;
    let count = u32::from_le_bytes([count_bytes[0], count_bytes[1], count_bytes[2], count_bytes[3]]) as usize;
    let expected = HEADER_LEN + 4 + count * TRIANGLE_LEN;
    if bytes.len() != expected {
        return Err(malformed(format!(
            "{} triangles need {} bytes, found {}",
            count,
            expected,
            bytes.len()
        )));
    }

    let mut mesh = RenderMesh::default();
    for (t, record) in bytes[HEADER_LEN + 4..].chunks_exact(TRIANGLE_LEN).enumerate() {
        let floats: Vec<f32> = record[..48]
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        for v in 0..3 {
            mesh.vertices.extend_from_slice(&floats[3 + v * 3..6 + v * 3]);
            mesh.normals.extend_from_slice(&floats[..3]);
            mesh.indices.push((t * 3 + v) as u32);
        }
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> RenderMesh {
        RenderMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            normals: vec![0.0; 12],
            indices: vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
            face_ranges: Vec::new(),
        }
    }

    #[test]
    fn binary_layout() {
        let bytes = write_binary_stl(&tetrahedron(), "tet").unwrap();
        assert_eq!(bytes.len(), 80 + 4 + 4 * 50);
        assert!(bytes.starts_with(b"binary STL: tet"));
        assert_eq!(u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]), 4);
        // First facet lies in z = 0 and faces down.
        let nz = f32::from_le_bytes([bytes[92], bytes[93], bytes[94], bytes[95]]);
        assert_eq!(nz, -1.0);
    }

    #[test]
    fn binary_reads_back() {
        let bytes = write_binary_stl(&tetrahedron(), "tet").unwrap();
        let mesh = read_binary_stl(&bytes).unwrap();
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.vertices.len(), 36);
        assert_eq!(mesh.vertex(4), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn truncated_binary_is_rejected() {
        let bytes = write_binary_stl(&tetrahedron(), "tet").unwrap();
        assert!(matches!(
            read_binary_stl(&bytes[..bytes.len() - 1]),
            Err(ExportError::MalformedStl { .. })
        ));
        assert!(read_binary_stl(&bytes[..40]).is_err());
    }

    #[test]
    fn ascii_structure() {
        let text = write_ascii_stl(&tetrahedron(), "tet").unwrap();
        assert!(text.starts_with("solid tet\n"));
        assert!(text.ends_with("endsolid tet\n"));
        assert_eq!(text.matches("facet normal").count(), 4);
        assert_eq!(text.matches("vertex").count(), 12);
    }

    #[test]
    fn bad_meshes_are_rejected() {
        assert!(matches!(write_binary_stl(&RenderMesh::default(), "x"), Err(ExportError::EmptyMesh)));
        let mut mesh = tetrahedron();
        mesh.indices[5] = 9;
        assert!(matches!(
            write_ascii_stl(&mesh, "x"),
            Err(ExportError::IndexOutOfRange { index: 9, vertex_count: 4 })
        ));
    }
}
