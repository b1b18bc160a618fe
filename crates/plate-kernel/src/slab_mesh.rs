//! Watertight triangle meshes for slab solids.
//!
//! Walls come from each slab's rings, caps from the difference between
//! neighbouring slabs at every level. Caps and walls meeting at a level do
//! not share vertices by construction (a cap edge may span several wall
//! edges and vice versa), so every triangle edge lying on a level is split
//! at all level vertices that sit on it. After that pass each edge is
//! shared by exactly two triangles.

use std::collections::HashMap;

use plate_types::Point2;

use crate::region::Region;
use crate::slab::{Slab, SlabSolid};
use crate::types::{FaceRange, KernelError, KernelId, RenderMesh};

/// How far a level vertex may sit from an edge and still split it. Grid
/// rounding of intersection points moves them up to half a cell diagonal.
const ON_EDGE_TOL: f64 = 0.008;
const CELL: f64 = 1.0;
const MAX_SPLITS: usize = 256;

type P3 = [f64; 3];

struct Face {
    triangles: Vec<[P3; 3]>,
}

/// Vertices present at one level, bucketed for edge queries.
#[derive(Default)]
struct LevelPoints {
    cells: HashMap<(i64, i64), Vec<Point2>>,
}

impl LevelPoints {
    fn cell(v: f64) -> i64 {
        (v / CELL).floor() as i64
    }

    fn insert(&mut self, p: Point2) {
        let bucket = self.cells.entry((Self::cell(p[0]), Self::cell(p[1]))).or_default();
        if !bucket.contains(&p) {
            bucket.push(p);
        }
    }

    fn insert_region(&mut self, region: &Region) {
        for p in region.rings().iter().flatten() {
            self.insert(*p);
        }
    }

    /// Points strictly inside segment a→b, ordered from a.
    fn on_segment(&self, a: Point2, b: Point2) -> Vec<(f64, Point2)> {
        let d = [b[0] - a[0], b[1] - a[1]];
        let len2 = d[0] * d[0] + d[1] * d[1];
        if len2 == 0.0 {
            return Vec::new();
        }
        let len = len2.sqrt();
        let (x0, x1) = (Self::cell(a[0].min(b[0]) - ON_EDGE_TOL), Self::cell(a[0].max(b[0]) + ON_EDGE_TOL));
        let (y0, y1) = (Self::cell(a[1].min(b[1]) - ON_EDGE_TOL), Self::cell(a[1].max(b[1]) + ON_EDGE_TOL));

        let mut hits = Vec::new();
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                let Some(bucket) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for &p in bucket {
                    if p == a || p == b {
                        continue;
                    }
                    let v = [p[0] - a[0], p[1] - a[1]];
                    let t = (v[0] * d[0] + v[1] * d[1]) / len2;
                    let t_tol = ON_EDGE_TOL / len;
                    if t <= t_tol || t >= 1.0 - t_tol {
                        continue;
                    }
                    let dist = (v[0] * d[1] - v[1] * d[0]).abs() / len;
                    if dist <= ON_EDGE_TOL {
                        hits.push((t, p));
                    }
                }
            }
        }
        hits.sort_by(|x, y| x.0.total_cmp(&y.0));
        hits
    }
}

pub(crate) fn mesh_slab_solid(solid: &SlabSolid) -> Result<RenderMesh, KernelError> {
    let slabs = solid.slabs();
    let mut faces: Vec<Face> = Vec::new();
    let mut levels: HashMap<u64, LevelPoints> = HashMap::new();

    for slab in slabs {
        faces.push(Face {
            triangles: walls(slab),
        });
        for z in [slab.z0, slab.z1] {
            levels.entry(z.to_bits()).or_default().insert_region(&slab.region);
        }
    }

    let mut zs: Vec<f64> = slabs.iter().flat_map(|s| [s.z0, s.z1]).collect();
    zs.sort_by(f64::total_cmp);
    zs.dedup();
    let empty = Region::empty();
    for z in zs {
        let below = slabs.iter().find(|s| s.z1 == z).map_or(&empty, |s| &s.region);
        let above = slabs.iter().find(|s| s.z0 == z).map_or(&empty, |s| &s.region);
        let up = below.difference(above)?;
        let down = above.difference(below)?;

        let level = levels.entry(z.to_bits()).or_default();
        level.insert_region(&up);
        level.insert_region(&down);

        if !up.is_empty() {
            faces.push(Face {
                triangles: cap(&up, z, true)?,
            });
        }
        if !down.is_empty() {
            faces.push(Face {
                triangles: cap(&down, z, false)?,
            });
        }
    }

    let mut mesh = RenderMesh::default();
    for (face_index, face) in faces.into_iter().enumerate() {
        let start_index = mesh.indices.len() as u32;
        for tri in face.triangles {
            for refined in refine(tri, &levels) {
                push_triangle(&mut mesh, refined);
            }
        }
        let end_index = mesh.indices.len() as u32;
        if end_index > start_index {
            mesh.face_ranges.push(FaceRange {
                face_id: KernelId(face_index as u64),
                start_index,
                end_index,
            });
        }
    }
    Ok(mesh)
}

fn walls(slab: &Slab) -> Vec<[P3; 3]> {
    let (z0, z1) = (slab.z0, slab.z1);
    let mut tris = Vec::new();
    for ring in slab.region.oriented_rings() {
        let n = ring.len();
        for i in 0..n {
            let (p, q) = (ring[i], ring[(i + 1) % n]);
            let (p_lo, q_lo) = ([p[0], p[1], z0], [q[0], q[1], z0]);
            let (p_hi, q_hi) = ([p[0], p[1], z1], [q[0], q[1], z1]);
            tris.push([p_lo, q_lo, q_hi]);
            tris.push([p_lo, q_hi, p_hi]);
        }
    }
    tris
}

fn cap(region: &Region, z: f64, facing_up: bool) -> Result<Vec<[P3; 3]>, KernelError> {
    Ok(region
        .triangulate()?
        .into_iter()
        .map(|[a, b, c]| {
            let (a, b, c) = ([a[0], a[1], z], [b[0], b[1], z], [c[0], c[1], z]);
            if facing_up {
                [a, b, c]
            } else {
                [a, c, b]
            }
        })
        .collect())
}

/// Split a triangle wherever a level vertex lies on one of its level edges.
fn refine(tri: [P3; 3], levels: &HashMap<u64, LevelPoints>) -> Vec<[P3; 3]> {
    let mut out = Vec::new();
    let mut pending = vec![tri];
    let mut splits = 0;

    'next: while let Some(t) = pending.pop() {
        if splits < MAX_SPLITS {
            for e in 0..3 {
                let (a, b, c) = (t[e], t[(e + 1) % 3], t[(e + 2) % 3]);
                if a[2] != b[2] {
                    continue;
                }
                let Some(level) = levels.get(&a[2].to_bits()) else {
                    continue;
                };
                let hits = level.on_segment([a[0], a[1]], [b[0], b[1]]);
                if hits.is_empty() {
                    continue;
                }
                splits += 1;
                let mut prev = a;
                for (_, p) in hits {
                    let v = [p[0], p[1], a[2]];
                    pending.push([prev, v, c]);
                    prev = v;
                }
                pending.push([prev, b, c]);
                continue 'next;
            }
        }
        out.push(t);
    }
    out
}

fn push_triangle(mesh: &mut RenderMesh, [a, b, c]: [P3; 3]) {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len < 1e-14 {
        return;
    }
    for p in [a, b, c] {
        let index = (mesh.vertices.len() / 3) as u32;
        mesh.vertices.extend(p.iter().map(|&x| x as f32));
        mesh.normals.extend(n.iter().map(|&x| (x / len) as f32));
        mesh.indices.push(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_query::{mesh_is_closed, mesh_volume};
    use crate::slab::SlabOp;
    use plate_types::{Polygon, Profile};

    fn block(x0: f64, y0: f64, x1: f64, y1: f64, z0: f64, z1: f64) -> SlabSolid {
        let outer = Polygon::new(vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]]);
        SlabSolid::extrude(&Profile::solid(outer), z0, z1).unwrap()
    }

    #[test]
    fn box_mesh_has_twelve_triangles() {
        let mesh = mesh_slab_solid(&block(0.0, 0.0, 2.0, 3.0, 0.0, 1.0)).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        assert!((mesh_volume(&mesh) - 6.0).abs() < 1e-6);
        assert!(mesh_is_closed(&mesh));
    }

    #[test]
    fn raised_boss_mesh_is_closed() {
        let plate = block(0.0, 0.0, 10.0, 10.0, 0.0, 3.0);
        let boss = block(2.0, 2.0, 4.0, 4.0, 2.99, 5.0);
        let solid = plate.combine(&boss, SlabOp::Union).unwrap();
        let mesh = mesh_slab_solid(&solid).unwrap();
        assert!(mesh_is_closed(&mesh));
        assert!((mesh_volume(&mesh) - solid.volume()).abs() < 1e-3);
    }

    #[test]
    fn pocket_crossing_the_edge_is_stitched() {
        // The pocket overhangs the plate edge, so the cap around it meets the
        // plate wall at points that are no wall vertex.
        let plate = block(0.0, 0.0, 10.0, 10.0, 0.0, 3.0);
        let notch = block(7.0, 4.0, 12.0, 6.0, 1.0, 13.0);
        let solid = plate.combine(&notch, SlabOp::Subtract).unwrap();
        let mesh = mesh_slab_solid(&solid).unwrap();
        assert!(mesh_is_closed(&mesh));
        assert!((mesh_volume(&mesh) - (300.0 - 3.0 * 2.0 * 2.0)).abs() < 1e-3);
    }

    #[test]
    fn every_triangle_belongs_to_a_face_range() {
        let plate = block(0.0, 0.0, 10.0, 10.0, 0.0, 3.0);
        let hole = block(4.0, 4.0, 6.0, 6.0, -1.0, 4.0);
        let mesh = mesh_slab_solid(&plate.combine(&hole, SlabOp::Subtract).unwrap()).unwrap();
        let covered: u32 = mesh.face_ranges.iter().map(|r| r.end_index - r.start_index).sum();
        assert_eq!(covered as usize, mesh.indices.len());
    }
}
