//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics.
//! This lets a test collect all failures in one pass.

use std::collections::HashMap;

use plate_kernel::{mesh_bounding_box, mesh_volume, RenderMesh, SolidBody};
use serde::Serialize;

use crate::sampling::{filled_heights, sample_column};

/// The result of a single oracle check.
#[derive(Debug, Clone, Serialize)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: Some(value),
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: Some(value),
        }
    }
}

// ── Mesh Oracles ────────────────────────────────────────────────────────────

fn triangle_corners(mesh: &RenderMesh, tri: &[u32]) -> Option<[usize; 3]> {
    let vertex_count = mesh.vertices.len() / 3;
    let corners = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
    corners.iter().all(|&i| i < vertex_count).then_some(corners)
}

fn position(mesh: &RenderMesh, i: usize) -> [f32; 3] {
    [mesh.vertices[i * 3], mesh.vertices[i * 3 + 1], mesh.vertices[i * 3 + 2]]
}

fn cross(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    [u[1] * v[2] - u[2] * v[1], u[2] * v[0] - u[0] * v[2], u[0] * v[1] - u[1] * v[0]]
}

/// Check that the mesh is watertight: every edge is used once in each
/// direction.
///
/// Edges are matched by quantized position (1e-4) because slab meshes
/// carry separate vertices per face.
pub fn check_watertight_mesh(mesh: &RenderMesh) -> OracleVerdict {
    type Key = (i64, i64, i64);

    fn quantize(v: [f32; 3]) -> Key {
        let q = |x: f32| (f64::from(x) * 10_000.0).round() as i64;
        (q(v[0]), q(v[1]), q(v[2]))
    }

    if mesh.indices.is_empty() {
        return OracleVerdict::fail("watertight_mesh", "mesh has no triangles".to_string());
    }

    // Forward uses minus backward uses, keyed by the sorted endpoint pair.
    let mut balance: HashMap<(Key, Key), i32> = HashMap::new();
    for tri in mesh.indices.chunks(3) {
        if tri.len() < 3 {
            continue;
        }
        let Some([a, b, c]) = triangle_corners(mesh, tri) else {
            continue;
        };
        let (a, b, c) = (
            quantize(position(mesh, a)),
            quantize(position(mesh, b)),
            quantize(position(mesh, c)),
        );
        for (from, to) in [(a, b), (b, c), (c, a)] {
            if from == to {
                continue;
            }
            if from < to {
                *balance.entry((from, to)).or_insert(0) += 1;
            } else {
                *balance.entry((to, from)).or_insert(0) -= 1;
            }
        }
    }

    let unpaired = balance.values().filter(|&&n| n != 0).count();
    if unpaired == 0 {
        OracleVerdict::pass("watertight_mesh", format!("all {} edges paired", balance.len()))
    } else {
        OracleVerdict::fail(
            "watertight_mesh",
            format!("{} unpaired edges out of {} total", unpaired, balance.len()),
        )
    }
}

/// Check that stored normals are consistent with geometric winding.
pub fn check_consistent_normals(mesh: &RenderMesh) -> OracleVerdict {
    let norms = &mesh.normals;
    let mut inconsistent = 0usize;
    let total = mesh.indices.len() / 3;

    for tri in mesh.indices.chunks(3) {
        if tri.len() < 3 {
            continue;
        }
        let Some([i0, i1, i2]) = triangle_corners(mesh, tri) else {
            continue;
        };
        if norms.len() < (i0.max(i1).max(i2) + 1) * 3 {
            continue;
        }
        let g = cross(position(mesh, i0), position(mesh, i1), position(mesh, i2));

        // Average stored normal for the triangle's vertices
        let s: Vec<f32> = (0..3)
            .map(|k| (norms[i0 * 3 + k] + norms[i1 * 3 + k] + norms[i2 * 3 + k]) / 3.0)
            .collect();

        if g[0] * s[0] + g[1] * s[1] + g[2] * s[2] < 0.0 {
            inconsistent += 1;
        }
    }

    if inconsistent == 0 {
        OracleVerdict::pass(
            "consistent_normals",
            format!("all {} triangles have consistent winding", total),
        )
    } else {
        OracleVerdict::fail(
            "consistent_normals",
            format!("{} of {} triangles have reversed normals", inconsistent, total),
        )
    }
}

/// Check that no triangles have zero area (degenerate).
pub fn check_no_degenerate_triangles(mesh: &RenderMesh) -> OracleVerdict {
    let mut degenerate = 0usize;
    let total = mesh.indices.len() / 3;

    for tri in mesh.indices.chunks(3) {
        if tri.len() < 3 {
            continue;
        }
        let Some([i0, i1, i2]) = triangle_corners(mesh, tri) else {
            continue;
        };
        let c = cross(position(mesh, i0), position(mesh, i1), position(mesh, i2));
        let area = (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt() / 2.0;
        if area < 1e-12 {
            degenerate += 1;
        }
    }

    if degenerate == 0 {
        OracleVerdict::pass(
            "no_degenerate_triangles",
            format!("all {} triangles have non-zero area", total),
        )
    } else {
        OracleVerdict::fail(
            "no_degenerate_triangles",
            format!("{} of {} triangles are degenerate", degenerate, total),
        )
    }
}

/// Check that all stored normals have approximately unit length.
pub fn check_unit_normals(mesh: &RenderMesh) -> OracleVerdict {
    let vertex_count = mesh.normals.len() / 3;
    let bad = mesh
        .normals
        .chunks_exact(3)
        .filter(|n| ((n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() - 1.0).abs() > 0.01)
        .count();

    if bad == 0 {
        OracleVerdict::pass("unit_normals", format!("all {} normals are unit length", vertex_count))
    } else {
        OracleVerdict::fail(
            "unit_normals",
            format!("{} of {} normals are not unit length", bad, vertex_count),
        )
    }
}

/// Check that face ranges cover all indices without gaps or overlaps.
pub fn check_face_range_coverage(mesh: &RenderMesh) -> OracleVerdict {
    let ranges = &mesh.face_ranges;
    let total_indices = mesh.indices.len() as u32;

    if ranges.is_empty() {
        return OracleVerdict::fail("face_range_coverage", "no face ranges defined".to_string());
    }

    let mut expected_start = 0u32;
    for (i, fr) in ranges.iter().enumerate() {
        if fr.start_index != expected_start {
            return OracleVerdict::fail(
                "face_range_coverage",
                format!(
                    "gap/overlap at range {}: expected start={}, got start={}",
                    i, expected_start, fr.start_index
                ),
            );
        }
        if fr.end_index <= fr.start_index {
            return OracleVerdict::fail("face_range_coverage", format!("empty range at index {}", i));
        }
        expected_start = fr.end_index;
    }

    if expected_start != total_indices {
        return OracleVerdict::fail(
            "face_range_coverage",
            format!("ranges end at {} but mesh has {} indices", expected_start, total_indices),
        );
    }

    OracleVerdict::pass("face_range_coverage", format!("{} ranges, no gaps", ranges.len()))
}

/// Check that all index values are within bounds.
pub fn check_valid_indices(mesh: &RenderMesh) -> OracleVerdict {
    let vertex_count = mesh.vertices.len() / 3;
    let bad: Vec<(usize, u32)> = mesh
        .indices
        .iter()
        .enumerate()
        .filter(|(_, &idx)| idx as usize >= vertex_count)
        .map(|(i, &idx)| (i, idx))
        .collect();

    if bad.is_empty() {
        OracleVerdict::pass("valid_indices", format!("all indices < {}", vertex_count))
    } else {
        OracleVerdict::fail(
            "valid_indices",
            format!(
                "{} out-of-bounds indices (vertex_count={}): {:?}",
                bad.len(),
                vertex_count,
                &bad[..bad.len().min(5)]
            ),
        )
    }
}

/// Check that the mesh bounding box matches the expected corners.
pub fn check_bounding_box(
    mesh: &RenderMesh,
    expected_min: [f64; 3],
    expected_max: [f64; 3],
    tolerance: f64,
) -> OracleVerdict {
    let Some(bb) = mesh_bounding_box(mesh) else {
        return OracleVerdict::fail("bounding_box", "mesh has no vertices".to_string());
    };

    for i in 0..3 {
        if (bb.min[i] - expected_min[i]).abs() > tolerance {
            return OracleVerdict::fail(
                "bounding_box",
                format!(
                    "min[{}]: expected {:.3}, got {:.3} (tol={})",
                    i, expected_min[i], bb.min[i], tolerance
                ),
            );
        }
        if (bb.max[i] - expected_max[i]).abs() > tolerance {
            return OracleVerdict::fail(
                "bounding_box",
                format!(
                    "max[{}]: expected {:.3}, got {:.3} (tol={})",
                    i, expected_max[i], bb.max[i], tolerance
                ),
            );
        }
    }

    OracleVerdict::pass(
        "bounding_box",
        format!(
            "({:.1},{:.1},{:.1}) -> ({:.1},{:.1},{:.1})",
            bb.min[0], bb.min[1], bb.min[2], bb.max[0], bb.max[1], bb.max[2],
        ),
    )
}

/// Run all mesh oracles and return their verdicts.
pub fn run_all_mesh_checks(mesh: &RenderMesh) -> Vec<OracleVerdict> {
    vec![
        check_watertight_mesh(mesh),
        check_consistent_normals(mesh),
        check_no_degenerate_triangles(mesh),
        check_unit_normals(mesh),
        check_face_range_coverage(mesh),
        check_valid_indices(mesh),
    ]
}

// ── Volume Oracles ──────────────────────────────────────────────────────────

/// Check `actual` against `expected` within a relative tolerance.
pub fn check_volume(actual: f64, expected: f64, rel_tol: f64) -> OracleVerdict {
    let err = if expected == 0.0 {
        actual.abs()
    } else {
        ((actual - expected) / expected).abs()
    };
    if err <= rel_tol {
        OracleVerdict::pass_val(
            "volume",
            format!("{:.3} within {:.2}% of {:.3}", actual, rel_tol * 100.0, expected),
            actual,
        )
    } else {
        OracleVerdict::fail_val(
            "volume",
            format!(
                "{:.3} is {:.2}% away from {:.3} (tol {:.2}%)",
                actual,
                err * 100.0,
                expected,
                rel_tol * 100.0
            ),
            actual,
        )
    }
}

/// Check that the tessellated volume agrees with the solid's own volume.
pub fn check_mesh_volume_agrees(solid: &dyn SolidBody, mesh: &RenderMesh, rel_tol: f64) -> OracleVerdict {
    let mut verdict = check_volume(mesh_volume(mesh), solid.volume(), rel_tol);
    verdict.oracle_name = "mesh_volume".to_string();
    verdict
}

// ── Solid Oracles ───────────────────────────────────────────────────────────

/// Check that the solid reports itself closed and manifold.
pub fn check_solid_manifold(solid: &dyn SolidBody) -> OracleVerdict {
    if solid.is_manifold() {
        OracleVerdict::pass("solid_manifold", "solid is closed and manifold".to_string())
    } else {
        OracleVerdict::fail("solid_manifold", "solid is not manifold".to_string())
    }
}

/// Check that no sample in the column at `xy` hits material.
pub fn check_open_column(solid: &dyn SolidBody, xy: [f64; 2], z_min: f64, z_max: f64) -> OracleVerdict {
    let hits = filled_heights(solid, xy, z_min, z_max, 16);
    if hits.is_empty() {
        OracleVerdict::pass(
            "open_column",
            format!("({:.2},{:.2}) open over z {:.2}..{:.2}", xy[0], xy[1], z_min, z_max),
        )
    } else {
        OracleVerdict::fail(
            "open_column",
            format!(
                "({:.2},{:.2}) has material at {} heights, first z={:.3}",
                xy[0],
                xy[1],
                hits.len(),
                hits[0]
            ),
        )
    }
}

/// Check that every sample in the column at `xy` hits material.
pub fn check_filled_column(solid: &dyn SolidBody, xy: [f64; 2], z_min: f64, z_max: f64) -> OracleVerdict {
    let gaps: Vec<f64> = sample_column(solid, xy, z_min, z_max, 16)
        .into_iter()
        .filter(|s| !s.inside)
        .map(|s| s.z)
        .collect();
    if gaps.is_empty() {
        OracleVerdict::pass(
            "filled_column",
            format!("({:.2},{:.2}) filled over z {:.2}..{:.2}", xy[0], xy[1], z_min, z_max),
        )
    } else {
        OracleVerdict::fail(
            "filled_column",
            format!(
                "({:.2},{:.2}) is empty at {} heights, first z={:.3}",
                xy[0],
                xy[1],
                gaps.len(),
                gaps[0]
            ),
        )
    }
}

/// Run the oracles every finished nameplate must pass.
pub fn run_solid_checks(solid: &dyn SolidBody, mesh: &RenderMesh) -> Vec<OracleVerdict> {
    let mut verdicts = vec![check_solid_manifold(solid)];
    let volume = solid.volume();
    verdicts.push(if volume > 0.0 {
        OracleVerdict::pass_val("positive_volume", format!("volume {:.3}", volume), volume)
    } else {
        OracleVerdict::fail_val("positive_volume", format!("volume {:.3}", volume), volume)
    });
    verdicts.extend(run_all_mesh_checks(mesh));
    verdicts.push(check_mesh_volume_agrees(solid, mesh, 1e-3));
    verdicts
}
