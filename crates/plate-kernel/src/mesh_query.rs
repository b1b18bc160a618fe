//! Measurements taken on a closed triangle mesh.
//!
//! The BREP kernel answers volume and containment queries through its
//! tessellation; the same functions double as cross-checks on slab meshes.

use std::collections::HashMap;

use crate::types::{BoundingBox, RenderMesh};

/// Enclosed volume by the divergence theorem. Positive for outward normals.
pub fn mesh_volume(mesh: &RenderMesh) -> f64 {
    mesh.triangles()
        .map(|[a, b, c]| {
            let (a, b, c) = (widen(a), widen(b), widen(c));
            let cross = [
                b[1] * c[2] - b[2] * c[1],
                b[2] * c[0] - b[0] * c[2],
                b[0] * c[1] - b[1] * c[0],
            ];
            (a[0] * cross[0] + a[1] * cross[1] + a[2] * cross[2]) / 6.0
        })
        .sum()
}

pub fn mesh_bounding_box(mesh: &RenderMesh) -> Option<BoundingBox> {
    let mut points = mesh.vertices.chunks_exact(3).map(|v| [v[0] as f64, v[1] as f64, v[2] as f64]);
    let first = points.next()?;
    let mut bbox = BoundingBox {
        min: first,
        max: first,
    };
    for p in points {
        bbox.include(p);
    }
    Some(bbox)
}

/// Parity of crossings along a fixed, slightly skewed ray. The skew keeps
/// the ray off the axis-aligned edges that plates are full of.
pub fn mesh_contains_point(mesh: &RenderMesh, p: [f64; 3]) -> bool {
    const DIR: [f64; 3] = [0.9, 0.3, 0.1];
    let crossings = mesh
        .triangles()
        .filter(|&[a, b, c]| ray_hits_triangle(p, DIR, widen(a), widen(b), widen(c)))
        .count();
    crossings % 2 == 1
}

/// Every edge, matched by position, is used once in each direction.
pub fn mesh_is_closed(mesh: &RenderMesh) -> bool {
    if mesh.indices.is_empty() {
        return false;
    }
    let mut directed: HashMap<(EdgeKey, EdgeKey), i32> = HashMap::new();
    for [a, b, c] in mesh.triangles() {
        let (a, b, c) = (edge_key(a), edge_key(b), edge_key(c));
        for (from, to) in [(a, b), (b, c), (c, a)] {
            if from == to {
                continue;
            }
            if from < to {
                *directed.entry((from, to)).or_insert(0) += 1;
            } else {
                *directed.entry((to, from)).or_insert(0) -= 1;
            }
        }
    }
    directed.values().all(|&n| n == 0)
}

/// Closed, and every edge borders exactly two triangles. Two bodies that
/// touch along an edge pass [`mesh_is_closed`] but fail here.
pub fn mesh_is_manifold(mesh: &RenderMesh) -> bool {
    if !mesh_is_closed(mesh) {
        return false;
    }
    let mut uses: HashMap<(EdgeKey, EdgeKey), u32> = HashMap::new();
    for [a, b, c] in mesh.triangles() {
        let (a, b, c) = (edge_key(a), edge_key(b), edge_key(c));
        for (from, to) in [(a, b), (b, c), (c, a)] {
            if from != to {
                *uses.entry((from.min(to), from.max(to))).or_insert(0) += 1;
            }
        }
    }
    uses.values().all(|&n| n == 2)
}

type EdgeKey = (i64, i64, i64);

fn edge_key(v: [f32; 3]) -> EdgeKey {
    let q = |x: f32| (x as f64 * 10_000.0).round() as i64;
    (q(v[0]), q(v[1]), q(v[2]))
}

fn widen(v: [f32; 3]) -> [f64; 3] {
    [v[0] as f64, v[1] as f64, v[2] as f64]
}

/// Möller–Trumbore, counting only hits in front of the origin.
fn ray_hits_triangle(origin: [f64; 3], dir: [f64; 3], a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> bool {
    let sub = |x: [f64; 3], y: [f64; 3]| [x[0] - y[0], x[1] - y[1], x[2] - y[2]];
    let cross = |x: [f64; 3], y: [f64; 3]| {
        [
            x[1] * y[2] - x[2] * y[1],
            x[2] * y[0] - x[0] * y[2],
            x[0] * y[1] - x[1] * y[0],
        ]
    };
    let dot = |x: [f64; 3], y: [f64; 3]| x[0] * y[0] + x[1] * y[1] + x[2] * y[2];

    let e1 = sub(b, a);
    let e2 = sub(c, a);
    let h = cross(dir, e2);
    let det = dot(e1, h);
    if det.abs() < 1e-12 {
        return false;
    }
    let inv = 1.0 / det;
    let s = sub(origin, a);
    let u = inv * dot(s, h);
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let q = cross(s, e1);
    let v = inv * dot(dir, q);
    if v < 0.0 || u + v > 1.0 {
        return false;
    }
    inv * dot(e2, q) > 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit cube with outward-facing triangles.
    fn cube() -> RenderMesh {
        let v: [[f32; 3]; 8] = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        let tris: [[u32; 3]; 12] = [
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [1, 2, 6],
            [1, 6, 5],
            [2, 3, 7],
            [2, 7, 6],
            [3, 0, 4],
            [3, 4, 7],
        ];
        RenderMesh {
            vertices: v.iter().flatten().copied().collect(),
            normals: vec![0.0; 24],
            indices: tris.iter().flatten().copied().collect(),
            face_ranges: Vec::new(),
        }
    }

    #[test]
    fn cube_measures() {
        let mesh = cube();
        assert!((mesh_volume(&mesh) - 1.0).abs() < 1e-9);
        assert!(mesh_is_closed(&mesh));
        let bb = mesh_bounding_box(&mesh).unwrap();
        assert_eq!(bb.max, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn containment_by_ray_parity() {
        let mesh = cube();
        assert!(mesh_contains_point(&mesh, [0.5, 0.5, 0.5]));
        assert!(mesh_contains_point(&mesh, [0.1, 0.9, 0.2]));
        assert!(!mesh_contains_point(&mesh, [1.5, 0.5, 0.5]));
        assert!(!mesh_contains_point(&mesh, [-0.5, 0.3, 0.5]));
    }

    #[test]
    fn edge_sharing_cubes_are_closed_but_not_manifold() {
        let mut mesh = cube();
        assert!(mesh_is_manifold(&mesh));
        let other = cube();
        let base = (mesh.vertices.len() / 3) as u32;
        for (i, v) in other.vertices.iter().enumerate() {
            mesh.vertices.push(if i % 3 == 2 { *v } else { *v + 1.0 });
        }
        mesh.normals.extend(other.normals.iter().copied());
        mesh.indices.extend(other.indices.iter().map(|i| i + base));

        assert!(mesh_is_closed(&mesh));
        assert!(!mesh_is_manifold(&mesh));
        assert!((mesh_volume(&mesh) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn open_mesh_is_not_closed() {
        let mut mesh = cube();
        mesh.indices.truncate(33);
        assert!(!mesh_is_closed(&mesh));
    }
}
