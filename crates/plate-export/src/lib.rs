//! Exporting finished nameplates: tessellated STL, OBJ and 3MF, or exact
//! STEP.

pub mod errors;
pub mod format;
pub mod indexed;
pub mod metadata;
pub mod obj;
pub mod stl;
pub mod threemf;

use composition_engine::NameplateResult;
use plate_kernel::SolidBody;
use tracing::{info, instrument};

pub use errors::ExportError;
pub use format::{ExportFormat, ExportOptions};
pub use metadata::ExportMetadata;
pub use indexed::IndexedMesh;
pub use obj::write_obj;
pub use stl::{read_binary_stl, write_ascii_stl, write_binary_stl};
pub use threemf::{read_3mf, write_3mf};

/// File contents plus what was recorded about them.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub metadata: ExportMetadata,
}

impl ExportArtifact {
    pub fn format(&self) -> ExportFormat {
        self.metadata.format
    }

    pub fn triangle_count(&self) -> usize {
        self.metadata.triangle_count
    }
}

/// Export `solid` in the requested format.
///
/// Refuses solids without volume and solids that are not manifold, since
/// neither prints.
#[instrument(skip_all, fields(format = ?options.format, name = %options.name))]
pub fn export_solid(solid: &dyn SolidBody, options: &ExportOptions) -> Result<ExportArtifact, ExportError> {
    let volume = solid.volume();
    if !(volume > 0.0) {
        return Err(ExportError::ZeroVolume { volume });
    }
    if !solid.is_manifold() {
        return Err(ExportError::NonManifold);
    }

    let tessellate = || {
        solid
            .tessellate(&options.tessellation)
            .map_err(ExportError::Tessellation)
    };
    let name = &options.name;
    let (bytes, triangle_count) = match options.format {
        ExportFormat::StlBinary => {
            let mesh = tessellate()?;
            (write_binary_stl(&mesh, name)?, mesh.triangle_count())
        }
        ExportFormat::StlAscii => {
            let mesh = tessellate()?;
            (write_ascii_stl(&mesh, name)?.into_bytes(), mesh.triangle_count())
        }
        ExportFormat::Obj => {
            let mesh = tessellate()?;
            (write_obj(&mesh, name)?.into_bytes(), mesh.triangle_count())
        }
        ExportFormat::ThreeMf => {
            let mesh = tessellate()?;
            (write_3mf(&mesh, name)?, mesh.triangle_count())
        }
        ExportFormat::Step => {
            let text = solid.export_brep(&options.file_name()).map_err(ExportError::Step)?;
            (text.into_bytes(), 0)
        }
    };

    info!(bytes = bytes.len(), triangle_count, volume, "exported solid");
    Ok(ExportArtifact {
        bytes,
        metadata: ExportMetadata::new(options.name.clone(), options.format, triangle_count, volume),
    })
}

/// Export a build result, recording its build id.
pub fn export_result(result: &NameplateResult, options: &ExportOptions) -> Result<ExportArtifact, ExportError> {
    let mut artifact = export_solid(result.solid.as_ref(), options)?;
    artifact.metadata.build_id = Some(result.build_id);
    Ok(artifact)
}
