//! Tessellation of truck solids with face-range metadata.
//!
//! Each BREP face becomes one FaceRange so exporters and viewers can tell
//! the plate's top face from the walls of an engraving.

use crate::types::{FaceRange, KernelError, KernelId, RenderMesh, Tessellation};
use truck_meshalgo::prelude::*;
use truck_modeling::InnerSpace;
use truck_meshalgo::tessellation::MeshableShape;

type TruckSolid = truck_modeling::Solid;

/// Tessellate a truck Solid into a RenderMesh with per-face tracking.
pub fn tessellate_solid(
    solid: &TruckSolid,
    tolerance: &Tessellation,
    next_id: &mut u64,
) -> std::result::Result<RenderMesh, KernelError> {
    let meshed_solid = solid.triangulation(tolerance.linear_deflection);

    let mut mesh = RenderMesh::default();

    for shell in meshed_solid.boundaries().iter() {
        for face in shell.face_iter() {
            let face_id = KernelId(*next_id);
            *next_id += 1;

            let maybe_mesh: Option<PolygonMesh> = face.surface();
            let Some(mut face_mesh) = maybe_mesh else {
                continue;
            };
            if !face.orientation() {
                face_mesh.invert();
            }

            let start_index = mesh.indices.len() as u32;
            append_polygon_mesh(&mut mesh, &face_mesh);
            let end_index = mesh.indices.len() as u32;
            if end_index > start_index {
                mesh.face_ranges.push(FaceRange {
                    face_id,
                    start_index,
                    end_index,
                });
            }
        }
    }

    if mesh.vertices.is_empty() {
        return tessellate_solid_merged(solid, tolerance, next_id);
    }
    Ok(mesh)
}

/// Fallback tessellation: merge everything into a single PolygonMesh.
fn tessellate_solid_merged(
    solid: &TruckSolid,
    tolerance: &Tessellation,
    next_id: &mut u64,
) -> std::result::Result<RenderMesh, KernelError> {
    use truck_meshalgo::tessellation::MeshedShape;

    let polygon = solid.triangulation(tolerance.linear_deflection).to_polygon();
    let mut mesh = RenderMesh::default();
    append_polygon_mesh(&mut mesh, &polygon);
    if mesh.indices.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "solid produced no triangles".to_string(),
        });
    }

    let face_id = KernelId(*next_id);
    *next_id += 1;
    mesh.face_ranges.push(FaceRange {
        face_id,
        start_index: 0,
        end_index: mesh.indices.len() as u32,
    });
    Ok(mesh)
}

/// Unroll a polygon mesh so every corner carries its own normal. truck
/// stores normals per attribute index, not per position.
fn append_polygon_mesh(mesh: &mut RenderMesh, polygon: &PolygonMesh) {
    let positions = polygon.positions();
    let normals = polygon.normals();

    for tri in polygon.tri_faces() {
        let corners = [positions[tri[0].pos], positions[tri[1].pos], positions[tri[2].pos]];
        let flat = {
            let u = corners[1] - corners[0];
            let v = corners[2] - corners[0];
            u.cross(v)
        };
        for (corner, vertex) in corners.iter().zip(tri.iter()) {
            let index = (mesh.vertices.len() / 3) as u32;
            mesh.vertices
                .extend([corner[0] as f32, corner[1] as f32, corner[2] as f32]);
            let normal = vertex
                .nor
                .and_then(|n| normals.get(n))
                .unwrap_or(flat);
            let len = normal.magnitude();
            if len > 0.0 {
                mesh.normals.extend([
                    (normal[0] / len) as f32,
                    (normal[1] / len) as f32,
                    (normal[2] / len) as f32,
                ]);
            } else {
                mesh.normals.extend([0.0, 0.0, 1.0]);
            }
            mesh.indices.push(index);
        }
    }
}
