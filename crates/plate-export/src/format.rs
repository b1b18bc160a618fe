use plate_kernel::Tessellation;
use serde::{Deserialize, Serialize};

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    StlBinary,
    StlAscii,
    /// ISO 10303-21, exact boundary representation.
    Step,
    /// Wavefront OBJ text with shared vertices.
    Obj,
    /// 3D Manufacturing Format package.
    #[serde(rename = "3mf")]
    ThreeMf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::StlBinary | ExportFormat::StlAscii => "stl",
            ExportFormat::Step => "step",
            ExportFormat::Obj => "obj",
            ExportFormat::ThreeMf => "3mf",
        }
    }

    /// Mesh formats are tessellated; BREP formats keep the exact surfaces.
    pub fn is_mesh(self) -> bool {
        !matches!(self, ExportFormat::Step)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Deflection tolerances for mesh formats.
    pub tessellation: Tessellation,
    /// Solid name in the file header.
    pub name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::StlBinary,
            tessellation: Tessellation::default(),
            name: "nameplate".to_string(),
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    /// `name` plus the format's extension.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.format.extension())
    }
}
