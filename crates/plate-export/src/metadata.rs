use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ExportError;
use crate::format::ExportFormat;

/// Facts recorded about one exported file, suitable for a JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Name written into the file header.
    pub name: String,
    pub format: ExportFormat,
    /// Zero for BREP formats.
    pub triangle_count: usize,
    /// Volume of the exported solid.
    pub volume: f64,
    /// The build the solid came from, when known.
    pub build_id: Option<Uuid>,
    pub exported_at: DateTime<Utc>,
}

impl ExportMetadata {
    pub fn new(name: impl Into<String>, format: ExportFormat, triangle_count: usize, volume: f64) -> Self {
        Self {
            name: name.into(),
            format,
            triangle_count,
            volume,
            build_id: None,
            exported_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(|e| ExportError::Metadata { reason: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_survives_the_json_sidecar() {
        let mut meta = ExportMetadata::new("nameplate", ExportFormat::StlBinary, 1204, 9374.0832);
        meta.build_id = Some(Uuid::new_v4());
        let back: ExportMetadata = serde_json::from_str(&meta.to_json().unwrap()).unwrap();
        assert_eq!(back.volume.to_bits(), meta.volume.to_bits());
        assert_eq!(back, meta);
    }
}
