//! Structured build reports.
//!
//! Text for reading in test output, JSON for saving next to exported
//! files when a scenario needs inspecting.

use std::fmt;

use composition_engine::{BuildStep, FeatureFailure, PlateDims};
use modeling_ops::FeatureRole;
use plate_kernel::BoundingBox;
use serde::Serialize;
use uuid::Uuid;

use crate::oracle::OracleVerdict;
use crate::scenario::BuiltPlate;

/// A complete build report with all sections.
#[derive(Debug, Clone, Serialize)]
pub struct NameplateReport {
    pub build_id: Uuid,
    pub plate: PlateDims,
    pub volume: f64,
    pub bounding_box: BoundingBox,
    pub steps: Vec<BuildStep>,
    pub failures: Vec<FeatureFailure>,
    pub warnings: Vec<String>,
    pub mesh: MeshSummary,
    pub oracle_results: Vec<OracleVerdict>,
}

/// Size of the tessellated result.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MeshSummary {
    pub triangle_count: usize,
    pub vertex_count: usize,
    pub face_range_count: usize,
}

impl NameplateReport {
    pub fn from_build(built: &BuiltPlate, oracle_results: Vec<OracleVerdict>) -> Self {
        let result = &built.result;
        Self {
            build_id: result.build_id,
            plate: result.plate,
            volume: result.volume,
            bounding_box: result.bounding_box,
            steps: result.diagnostics.steps.clone(),
            failures: result.diagnostics.failures.clone(),
            warnings: result.diagnostics.warnings.clone(),
            mesh: MeshSummary {
                triangle_count: built.mesh.triangle_count(),
                vertex_count: built.mesh.vertices.len() / 3,
                face_range_count: built.mesh.face_ranges.len(),
            },
            oracle_results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.oracle_results.iter().all(|v| v.passed)
    }

    /// Format the report as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Nameplate Build Report ===\n\n");

        out.push_str(&format!(
            "Plate: {:.1} x {:.1} x {:.1} mm, volume {:.2} mm^3\n",
            self.plate.width, self.plate.height, self.plate.thickness, self.volume,
        ));

        out.push_str(&format!(
            "\nPipeline ({} steps, {} skipped):\n",
            self.steps.len(),
            self.failures.len(),
        ));
        for (i, step) in self.steps.iter().enumerate() {
            let role = match step.role {
                FeatureRole::Structural => "structural",
                FeatureRole::Subtractive => "subtractive",
                FeatureRole::Additive => "additive",
            };
            out.push_str(&format!("  [{}] {:?} \"{}\" ({})\n", i, step.kind, step.label, role));
        }

        out.push_str(&format!(
            "\nMesh Summary: {} triangles, {} vertices, {} face ranges\n",
            self.mesh.triangle_count, self.mesh.vertex_count, self.mesh.face_range_count,
        ));

        let (min, max) = (self.bounding_box.min, self.bounding_box.max);
        out.push_str(&format!(
            "\nBounding Box: ({:.1}, {:.1}, {:.1}) -> ({:.1}, {:.1}, {:.1})\n",
            min[0], min[1], min[2], max[0], max[1], max[2],
        ));

        if !self.oracle_results.is_empty() {
            out.push_str(&format!("\nOracle Results ({} checks):\n", self.oracle_results.len()));
            for v in &self.oracle_results {
                let status = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
            }
        }

        if !self.warnings.is_empty() {
            out.push_str(&format!("\nWarnings ({}):\n", self.warnings.len()));
            for w in &self.warnings {
                out.push_str(&format!("  {}\n", w));
            }
        }

        if self.failures.is_empty() {
            out.push_str("\nFailures: none\n");
        } else {
            out.push_str(&format!("\nFailures ({}):\n", self.failures.len()));
            for f in &self.failures {
                out.push_str(&format!("  {}: {}\n", f.label, f.message));
            }
        }

        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for NameplateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
