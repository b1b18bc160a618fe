pub mod mesh_query;
pub mod region;
pub mod slab;
pub mod slab_kernel;
mod slab_mesh;
pub mod tessellation;
pub mod traits;
pub mod truck_kernel;
pub mod types;

pub use mesh_query::{mesh_bounding_box, mesh_contains_point, mesh_is_closed, mesh_is_manifold, mesh_volume};
pub use region::Region;
pub use slab::{Slab, SlabSolid};
pub use slab_kernel::{SlabBody, SlabKernel};
pub use traits::*;
pub use truck_kernel::{TruckBody, TruckKernel};
pub use types::*;
