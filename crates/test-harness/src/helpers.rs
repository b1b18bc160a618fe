//! Helper functions: error type, profile builders, mesh math.

use std::collections::HashMap;
use std::f64::consts::PI;

use composition_engine::BuildError;
use plate_export::ExportError;
use plate_kernel::{KernelError, RenderMesh};
use plate_types::{Point2, Polygon, Profile};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("build failed: {0}")]
    Build(#[from] BuildError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("unknown fixture glyph {ch:?}")]
    UnknownGlyph { ch: char },
}

// ── Profile Builders ────────────────────────────────────────────────────────

/// Axis-aligned rectangle with its lower-left corner at `(x, y)`.
pub fn rect_profile(x: f64, y: f64, w: f64, h: f64) -> Profile {
    Profile::solid(Polygon::new(vec![[x, y], [x + w, y], [x + w, y + h], [x, y + h]]))
}

/// Circle approximated by a regular polygon with `segments` sides.
pub fn circle_profile(cx: f64, cy: f64, r: f64, segments: u32) -> Profile {
    let points = (0..segments)
        .map(|i| {
            let a = 2.0 * PI * f64::from(i) / f64::from(segments);
            [cx + r * a.cos(), cy + r * a.sin()]
        })
        .collect();
    Profile::solid(Polygon::new(points))
}

/// Rectangle with a centred rectangular hole.
pub fn frame_profile(w: f64, h: f64, band: f64) -> Profile {
    let outer = rect_profile(-w / 2.0, -h / 2.0, w, h).outer;
    let inner = rect_profile(-w / 2.0 + band, -h / 2.0 + band, w - 2.0 * band, h - 2.0 * band)
        .outer
        .reversed();
    Profile::new(outer, vec![inner])
}

// ── Area Math ───────────────────────────────────────────────────────────────

/// Shoelace area of a closed ring; positive when counter-clockwise.
///
/// Deliberately separate from the geometry crate so fixture areas are
/// checked against an independent computation.
pub fn ring_area(points: &[Point2]) -> f64 {
    let n = points.len();
    let mut twice = 0.0;
    for i in 0..n {
        let [x0, y0] = points[i];
        let [x1, y1] = points[(i + 1) % n];
        twice += x0 * y1 - x1 * y0;
    }
    twice / 2.0
}

// ── Mesh Math Utilities ─────────────────────────────────────────────────────

/// Compute the total surface area of a triangle mesh.
pub fn mesh_surface_area(mesh: &RenderMesh) -> f64 {
    mesh.triangles()
        .map(|[a, b, c]| {
            let u = [
                f64::from(b[0] - a[0]),
                f64::from(b[1] - a[1]),
                f64::from(b[2] - a[2]),
            ];
            let v = [
                f64::from(c[0] - a[0]),
                f64::from(c[1] - a[1]),
                f64::from(c[2] - a[2]),
            ];
            let cx = u[1] * v[2] - u[2] * v[1];
            let cy = u[2] * v[0] - u[0] * v[2];
            let cz = u[0] * v[1] - u[1] * v[0];
            (cx * cx + cy * cy + cz * cz).sqrt() / 2.0
        })
        .sum()
}

/// Count mesh edges: returns (total_edges, boundary_edges).
///
/// Edges are matched by index. A boundary edge is used by exactly one
/// triangle.
pub fn count_mesh_edges(mesh: &RenderMesh) -> (usize, usize) {
    let mut edge_counts: HashMap<(u32, u32), usize> = HashMap::new();

    for tri in mesh.indices.chunks(3) {
        if tri.len() < 3 {
            continue;
        }
        for &(a, b) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let key = (a.min(b), a.max(b));
            *edge_counts.entry(key).or_insert(0) += 1;
        }
    }

    let total = edge_counts.len();
    let boundary = edge_counts.values().filter(|&&c| c == 1).count();
    (total, boundary)
}

/// An indexed unit cube, outward winding, one face range.
pub fn unit_cube_mesh() -> RenderMesh {
    RenderMesh {
        vertices: vec![
            0.0, 0.0, 0.0, // v0
            1.0, 0.0, 0.0, // v1
            1.0, 1.0, 0.0, // v2
            0.0, 1.0, 0.0, // v3
            0.0, 0.0, 1.0, // v4
            1.0, 0.0, 1.0, // v5
            1.0, 1.0, 1.0, // v6
            0.0, 1.0, 1.0, // v7
        ],
        normals: {
            let s = 1.0 / 3f32.sqrt();
            vec![
                -s, -s, -s, s, -s, -s, s, s, -s, -s, s, -s, -s, -s, s, s, -s, s, s, s, s, -s, s, s,
            ]
        },
        indices: vec![
            0, 2, 1, 0, 3, 2, // bottom
            4, 5, 6, 4, 6, 7, // top
            0, 1, 5, 0, 5, 4, // front
            2, 3, 7, 2, 7, 6, // back
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ],
        face_ranges: vec![plate_kernel::FaceRange {
            face_id: plate_kernel::KernelId(0),
            start_index: 0,
            end_index: 36,
        }],
    }
}
