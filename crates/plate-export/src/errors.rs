use plate_kernel::KernelError;

/// Errors while turning a finished solid into file bytes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("solid has no volume ({volume})")]
    ZeroVolume { volume: f64 },

    #[error("solid is not manifold")]
    NonManifold,

    #[error("tessellation produced no triangles")]
    EmptyMesh,

    #[error("index {index} out of range (vertex count = {vertex_count})")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("tessellation failed: {0}")]
    Tessellation(#[source] KernelError),

    #[error("STEP export failed: {0}")]
    Step(#[source] KernelError),

    #[error("malformed STL: {reason}")]
    MalformedStl { reason: String },

    #[error("3MF package error: {reason}")]
    ThreeMf { reason: String },

    #[error("failed to serialize export metadata: {reason}")]
    Metadata { reason: String },
}
