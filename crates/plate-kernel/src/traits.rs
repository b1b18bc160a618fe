use std::fmt::Debug;
use std::sync::Arc;

use plate_types::Profile;

use crate::types::*;

/// Core geometry kernel trait: the narrow surface the composition engine
/// drives. Implemented by SlabKernel (exact 2.5D) and TruckKernel (BREP).
pub trait Kernel {
    /// Extrude a planar profile in the XY plane between two heights.
    fn extrude_profile(
        &mut self,
        profile: &Profile,
        z_bottom: f64,
        z_top: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean union of two solids.
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean subtraction: a minus b.
    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Tessellate a solid to a triangle mesh.
    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: &Tessellation,
    ) -> Result<RenderMesh, KernelError>;

    /// Drop a solid the caller no longer needs.
    fn release(&mut self, solid: &KernelSolidHandle);

    /// Take a solid out of the session as an immutable, shareable body.
    fn detach(&mut self, solid: &KernelSolidHandle) -> Result<Arc<dyn SolidBody>, KernelError>;
}

/// Read-only queries on kernel solids.
pub trait KernelIntrospect {
    fn volume(&self, solid: &KernelSolidHandle) -> Result<f64, KernelError>;

    /// None for an empty solid.
    fn bounding_box(&self, solid: &KernelSolidHandle) -> Result<Option<BoundingBox>, KernelError>;

    /// Point containment. Points on the boundary may go either way.
    fn contains_point(&self, solid: &KernelSolidHandle, p: [f64; 3]) -> Result<bool, KernelError>;

    fn is_empty(&self, solid: &KernelSolidHandle) -> Result<bool, KernelError>;

    /// Closed, consistently oriented boundary.
    fn is_manifold(&self, solid: &KernelSolidHandle) -> Result<bool, KernelError>;
}

/// Combined kernel + introspection trait for use as a trait object.
/// Rust doesn't allow `dyn Kernel + KernelIntrospect`, so this supertrait
/// bridges the gap. Automatically implemented for any type implementing both.
pub trait KernelBundle: Kernel + KernelIntrospect {
    /// Upcast to `&dyn KernelIntrospect`.
    fn as_introspect(&self) -> &dyn KernelIntrospect;
}

impl<T: Kernel + KernelIntrospect> KernelBundle for T {
    fn as_introspect(&self) -> &dyn KernelIntrospect {
        self
    }
}

/// A finished solid detached from its kernel session. Immutable and safe
/// to share between threads, so results can be cached.
pub trait SolidBody: Send + Sync + Debug {
    fn volume(&self) -> f64;

    /// None for an empty solid.
    fn bounding_box(&self) -> Option<BoundingBox>;

    fn contains_point(&self, p: [f64; 3]) -> bool;

    fn is_manifold(&self) -> bool;

    fn tessellate(&self, tolerance: &Tessellation) -> Result<RenderMesh, KernelError>;

    /// STEP (ISO 10303-21) text of the exact boundary representation.
    fn export_brep(&self, _file_name: &str) -> Result<String, KernelError> {
        Err(KernelError::NotSupported {
            operation: "export_brep".to_string(),
        })
    }
}
