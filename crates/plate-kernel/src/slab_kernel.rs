//! SlabKernel: exact kernel for solids made of vertical extrusions.

use std::collections::HashMap;
use std::sync::Arc;

use plate_types::Profile;
use tracing::trace;

use crate::slab::{SlabOp, SlabSolid};
use crate::slab_mesh::mesh_slab_solid;
use crate::traits::{Kernel, KernelIntrospect, SolidBody};
use crate::types::*;

/// Geometry kernel storing every solid as a stack of planar slabs.
///
/// Booleans never fail on coplanar faces, which is what nameplates are
/// made of: every raised feature sits on the top face and every pocket
/// shares the top face's height.
#[derive(Debug, Default)]
pub struct SlabKernel {
    next_handle: u64,
    solids: HashMap<u64, SlabSolid>,
}

impl SlabKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            solids: HashMap::new(),
        }
    }

    fn store(&mut self, solid: SlabSolid) -> KernelSolidHandle {
        let handle = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn get(&self, handle: &KernelSolidHandle) -> Result<&SlabSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or_else(|| KernelError::not_found(handle))
    }

    fn combine(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
        op: SlabOp,
    ) -> Result<KernelSolidHandle, KernelError> {
        let result = self.get(a)?.combine(self.get(b)?, op)?;
        trace!(?op, slabs = result.slabs().len(), "slab boolean");
        Ok(self.store(result))
    }

    /// Number of live solids in the session.
    pub fn live_solids(&self) -> usize {
        self.solids.len()
    }
}

impl Kernel for SlabKernel {
    fn extrude_profile(
        &mut self,
        profile: &Profile,
        z_bottom: f64,
        z_top: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid = SlabSolid::extrude(profile, z_bottom, z_top)?;
        Ok(self.store(solid))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.combine(a, b, SlabOp::Union)
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.combine(a, b, SlabOp::Subtract)
    }

    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        _tolerance: &Tessellation,
    ) -> Result<RenderMesh, KernelError> {
        mesh_slab_solid(self.get(solid)?)
    }

    fn release(&mut self, solid: &KernelSolidHandle) {
        self.solids.remove(&solid.id());
    }

    fn detach(&mut self, solid: &KernelSolidHandle) -> Result<Arc<dyn SolidBody>, KernelError> {
        let solid = self
            .solids
            .remove(&solid.id())
            .ok_or_else(|| KernelError::not_found(solid))?;
        Ok(Arc::new(SlabBody { solid }))
    }
}

impl KernelIntrospect for SlabKernel {
    fn volume(&self, solid: &KernelSolidHandle) -> Result<f64, KernelError> {
        Ok(self.get(solid)?.volume())
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Result<Option<BoundingBox>, KernelError> {
        Ok(self.get(solid)?.bounding_box())
    }

    fn contains_point(&self, solid: &KernelSolidHandle, p: [f64; 3]) -> Result<bool, KernelError> {
        Ok(self.get(solid)?.contains_point(p))
    }

    fn is_empty(&self, solid: &KernelSolidHandle) -> Result<bool, KernelError> {
        Ok(self.get(solid)?.is_empty())
    }

    fn is_manifold(&self, solid: &KernelSolidHandle) -> Result<bool, KernelError> {
        Ok(self.get(solid)?.is_manifold())
    }
}

/// A detached slab solid.
#[derive(Debug)]
pub struct SlabBody {
    solid: SlabSolid,
}

impl SlabBody {
    pub fn slabs(&self) -> &SlabSolid {
        &self.solid
    }
}

impl SolidBody for SlabBody {
    fn volume(&self) -> f64 {
        self.solid.volume()
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        self.solid.bounding_box()
    }

    fn contains_point(&self, p: [f64; 3]) -> bool {
        self.solid.contains_point(p)
    }

    fn is_manifold(&self) -> bool {
        self.solid.is_manifold()
    }

    fn tessellate(&self, _tolerance: &Tessellation) -> Result<RenderMesh, KernelError> {
        mesh_slab_solid(&self.solid)
    }
}
