//! TruckKernel: BREP geometry kernel wrapping truck's API.

use crate::mesh_query::{mesh_bounding_box, mesh_contains_point, mesh_volume};
use crate::tessellation;
use crate::traits::{Kernel, KernelIntrospect, SolidBody};
use crate::types::{BoundingBox, KernelError, KernelSolidHandle, RenderMesh, Tessellation};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use plate_types::{Point2, Profile};
use tracing::debug;
use truck_modeling::builder;
use truck_modeling::topology::{Edge, Solid, Wire};
use truck_modeling::{Point3, Vector3};
use truck_stepio::out;
use truck_topology::shell::ShellCondition;

/// Tolerance handed to truck's boolean operations.
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// Real geometry kernel backed by the truck BREP library.
///
/// truck's booleans are sensitive to coplanar faces, which nameplates have
/// in abundance; callers that need guaranteed results use `SlabKernel`.
pub struct TruckKernel {
    next_handle: u64,
    next_id: u64,
    solids: HashMap<u64, Solid>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            next_id: 1,
            solids: HashMap::new(),
        }
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> KernelSolidHandle {
        let handle = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub(crate) fn get_solid(&self, handle: &KernelSolidHandle) -> Result<&Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or_else(|| KernelError::not_found(handle))
    }

    fn query_mesh(&self, handle: &KernelSolidHandle) -> Result<RenderMesh, KernelError> {
        let mut scratch = 0;
        tessellation::tessellate_solid(self.get_solid(handle)?, &Tessellation::default(), &mut scratch)
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// A closed polyline wire at height `z`, sharing vertices between edges.
fn ring_wire(ring: &[Point2], z: f64) -> Wire {
    let pts: Vec<Point3> = ring.iter().map(|p| Point3::new(p[0], p[1], z)).collect();
    let vertices: Vec<_> = pts.iter().map(|&p| builder::vertex(p)).collect();
    let n = pts.len();
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            Edge::new(
                &vertices[i],
                &vertices[j],
                truck_modeling::geometry::Curve::Line(truck_modeling::geometry::Line(pts[i], pts[j])),
            )
        })
        .collect()
}

impl Kernel for TruckKernel {
    fn extrude_profile(
        &mut self,
        profile: &Profile,
        z_bottom: f64,
        z_top: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let height = z_top - z_bottom;
        if !height.is_finite() || height <= 0.0 {
            return Err(KernelError::InvalidProfile {
                reason: format!("extrusion heights {z_bottom}..{z_top} enclose no volume"),
            });
        }
        let profile = profile.oriented();
        if profile.rings().any(|r| r.len() < 3) {
            return Err(KernelError::InvalidProfile {
                reason: "ring with fewer than 3 vertices".to_string(),
            });
        }

        let wires: Vec<Wire> = profile.rings().map(|r| ring_wire(&r.points, z_bottom)).collect();
        let face = builder::try_attach_plane(&wires).map_err(|e| KernelError::InvalidProfile {
            reason: format!("failed to create planar face: {}", e),
        })?;
        let solid = builder::tsweep(&face, Vector3::new(0.0, 0.0, height));
        Ok(self.store_solid(solid))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.get_solid(a)?;
        let solid_b = self.get_solid(b)?;
        let result = truck_shapeops::or(solid_a, solid_b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck or() returned None".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.get_solid(a)?;
        let mut solid_b = self.get_solid(b)?.clone();

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result = truck_shapeops::and(solid_a, &solid_b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck and() returned None for subtraction".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: &Tessellation,
    ) -> Result<RenderMesh, KernelError> {
        let truck_solid = self
            .solids
            .get(&solid.id())
            .ok_or_else(|| KernelError::not_found(solid))?;
        tessellation::tessellate_solid(truck_solid, tolerance, &mut self.next_id)
    }

    fn release(&mut self, solid: &KernelSolidHandle) {
        self.solids.remove(&solid.id());
    }

    fn detach(&mut self, solid: &KernelSolidHandle) -> Result<Arc<dyn SolidBody>, KernelError> {
        let truck_solid = self
            .solids
            .remove(&solid.id())
            .ok_or_else(|| KernelError::not_found(solid))?;
        let mut scratch = 0;
        let mesh = tessellation::tessellate_solid(&truck_solid, &Tessellation::default(), &mut scratch)?;
        debug!(triangles = mesh.triangle_count(), "detached truck solid");
        Ok(Arc::new(TruckBody {
            solid: truck_solid,
            mesh,
        }))
    }
}

impl KernelIntrospect for TruckKernel {
    fn volume(&self, solid: &KernelSolidHandle) -> Result<f64, KernelError> {
        Ok(mesh_volume(&self.query_mesh(solid)?))
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Result<Option<BoundingBox>, KernelError> {
        Ok(mesh_bounding_box(&self.query_mesh(solid)?))
    }

    fn contains_point(&self, solid: &KernelSolidHandle, p: [f64; 3]) -> Result<bool, KernelError> {
        Ok(mesh_contains_point(&self.query_mesh(solid)?, p))
    }

    fn is_empty(&self, solid: &KernelSolidHandle) -> Result<bool, KernelError> {
        let truck_solid = self.get_solid(solid)?;
        if truck_solid.boundaries().is_empty() {
            return Ok(true);
        }
        Ok(self.volume(solid)? <= 0.0)
    }

    fn is_manifold(&self, solid: &KernelSolidHandle) -> Result<bool, KernelError> {
        Ok(is_closed(self.get_solid(solid)?))
    }
}

fn is_closed(solid: &Solid) -> bool {
    !solid.boundaries().is_empty()
        && solid
            .boundaries()
            .iter()
            .all(|shell| shell.shell_condition() == ShellCondition::Closed)
}

/// A detached truck solid with the mesh used to answer queries.
pub struct TruckBody {
    solid: Solid,
    mesh: RenderMesh,
}

impl fmt::Debug for TruckBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TruckBody")
            .field("shells", &self.solid.boundaries().len())
            .field("triangles", &self.mesh.triangle_count())
            .finish()
    }
}

impl SolidBody for TruckBody {
    fn volume(&self) -> f64 {
        mesh_volume(&self.mesh)
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        mesh_bounding_box(&self.mesh)
    }

    fn contains_point(&self, p: [f64; 3]) -> bool {
        mesh_contains_point(&self.mesh, p)
    }

    fn is_manifold(&self) -> bool {
        is_closed(&self.solid)
    }

    fn tessellate(&self, tolerance: &Tessellation) -> Result<RenderMesh, KernelError> {
        let mut scratch = 0;
        tessellation::tessellate_solid(&self.solid, tolerance, &mut scratch)
    }

    fn export_brep(&self, file_name: &str) -> Result<String, KernelError> {
        let compressed = self.solid.compress();
        let display = out::CompleteStepDisplay::new(
            out::StepModel::from(&compressed),
            out::StepHeaderDescriptor {
                file_name: file_name.to_string(),
                ..Default::default()
            },
        );
        Ok(display.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plate_types::Polygon;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Profile {
        Profile::solid(Polygon::new(vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]]))
    }

    #[test]
    fn extruded_rectangle_has_six_faces() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.extrude_profile(&rect(0.0, 0.0, 1.0, 1.0), 0.0, 2.0).unwrap();

        let solid = kernel.get_solid(&handle).unwrap();
        let boundaries = solid.boundaries();
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].face_iter().count(), 6);
        assert!(kernel.is_manifold(&handle).unwrap());
    }

    #[test]
    fn extruded_profile_with_hole_has_inner_walls() {
        let mut kernel = TruckKernel::new();
        let outer = Polygon::new(vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        let hole = Polygon::new(vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0]]);
        let handle = kernel
            .extrude_profile(&Profile::new(outer, vec![hole]), 0.0, 3.0)
            .unwrap();
        let faces = kernel.get_solid(&handle).unwrap().boundaries()[0].face_iter().count();
        assert_eq!(faces, 10);
        let volume = kernel.volume(&handle).unwrap();
        assert!((volume - 288.0).abs() < 1e-6, "volume {volume}");
    }

    #[test]
    fn tessellation_covers_all_faces() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.extrude_profile(&rect(0.0, 0.0, 1.0, 1.0), 0.0, 1.0).unwrap();
        let mesh = kernel.tessellate(&handle, &Tessellation::default()).unwrap();

        assert!(!mesh.indices.is_empty(), "Mesh should have indices");
        assert_eq!(mesh.face_ranges.len(), 6, "Box should have 6 face ranges");
        let covered: u32 = mesh
            .face_ranges
            .iter()
            .map(|r| r.end_index - r.start_index)
            .sum();
        assert_eq!(covered as usize, mesh.indices.len());
        assert!((mesh_volume(&mesh) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn tessellation_carries_unit_normals() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.extrude_profile(&rect(0.0, 0.0, 2.0, 2.0), 0.0, 1.0).unwrap();
        let mesh = kernel.tessellate(&handle, &Tessellation::default()).unwrap();
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
        for i in 0..(mesh.vertices.len() / 3) as u32 {
            let n = mesh.normal(i);
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4, "normal {i} has length {len}");
        }
    }

    #[test]
    fn detached_body_exports_step() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.extrude_profile(&rect(0.0, 0.0, 2.0, 1.0), 0.0, 1.0).unwrap();
        let body = kernel.detach(&handle).unwrap();
        let step = body.export_brep("plate.step").unwrap();
        assert!(step.contains("ISO-10303-21"));
        assert!(step.contains("CLOSED_SHELL"));
        assert!(body.contains_point([1.0, 0.5, 0.5]));
    }

    #[test]
    #[ignore = "truck's boolean ops fail on the coplanar top face of a pocket"]
    fn pocket_subtraction() {
        let mut kernel = TruckKernel::new();
        let plate = kernel.extrude_profile(&rect(0.0, 0.0, 10.0, 10.0), 0.0, 3.0).unwrap();
        let pocket = kernel.extrude_profile(&rect(4.0, 4.0, 6.0, 6.0), 1.0, 13.0).unwrap();
        let result = kernel.boolean_subtract(&plate, &pocket).unwrap();
        assert!((kernel.volume(&result).unwrap() - 292.0).abs() < 1e-3);
    }
}
