//! Fluent builder for scripting nameplate builds.
//!
//! ```ignore
//! let built = PlateScenario::rectangle(80.0, 40.0, 3.0)
//!     .raised_text("HELLO", 10.0, 1.0)
//!     .mount(MountKind::ScrewHoles)
//!     .build()?;
//! assert!(built.verify().iter().all(|v| v.passed));
//! ```

use std::sync::Arc;

use composition_engine::{Engine, KernelChoice, NameplateResult};
use plate_export::{export_result, ExportArtifact, ExportFormat, ExportOptions};
use plate_kernel::{RenderMesh, SolidBody, Tessellation};
use plate_types::{
    ArtworkElement, ArtworkSource, BorderStyle, BuildOptions, FontLibrary, MountConfig, MountKind, NameplateConfig,
    Point2, PlateShape, Style, TextLineConfig,
};

use crate::fixtures::block_font;
use crate::helpers::HarnessError;
use crate::oracle::{self, OracleVerdict};
use crate::report::NameplateReport;

/// A nameplate configuration plus everything needed to build it.
#[derive(Debug, Clone)]
pub struct PlateScenario {
    config: NameplateConfig,
    options: BuildOptions,
    kernel: KernelChoice,
    glyphs: FontLibrary,
}

impl PlateScenario {
    /// A plain rectangular plate with default padding and no mount.
    pub fn rectangle(width: f64, height: f64, thickness: f64) -> Self {
        let mut config = NameplateConfig::default();
        config.plate.shape = PlateShape::Rectangle;
        config.plate.width = width;
        config.plate.height = height;
        config.plate.thickness = thickness;
        Self::from_config(config)
    }

    pub fn from_config(config: NameplateConfig) -> Self {
        Self {
            config,
            options: BuildOptions::default(),
            kernel: KernelChoice::default(),
            glyphs: block_font(),
        }
    }

    pub fn shape(mut self, shape: PlateShape) -> Self {
        self.config.plate.shape = shape;
        self
    }

    /// Add one text line in the fixture font.
    pub fn text(mut self, content: &str, style: Style, size: f64, depth: f64) -> Self {
        self.config.text.lines.push(TextLineConfig {
            content: content.to_string(),
            style,
            size,
            depth,
            ..Default::default()
        });
        self
    }

    pub fn raised_text(self, content: &str, size: f64, height: f64) -> Self {
        self.text(content, Style::Raised, size, height)
    }

    pub fn engraved_text(self, content: &str, size: f64, depth: f64) -> Self {
        self.text(content, Style::Engraved, size, depth)
    }

    pub fn cutout_text(self, content: &str, size: f64) -> Self {
        let depth = self.config.plate.thickness;
        self.text(content, Style::Cutout, size, depth)
    }

    pub fn border(mut self, style: BorderStyle, width: f64, height: f64, offset: f64) -> Self {
        self.config.border.style = style;
        self.config.border.width = width;
        self.config.border.height = height;
        self.config.border.offset = offset;
        self
    }

    pub fn mount(mut self, kind: MountKind) -> Self {
        self.config.mount.kind = kind;
        self
    }

    /// A mount with explicit cutter centres.
    pub fn mount_at(mut self, kind: MountKind, positions: &[Point2]) -> Self {
        self.config.mount.kind = kind;
        self.config.mount.positions = positions.to_vec();
        self
    }

    /// Adjust the mount parameters in place.
    pub fn with_mount(mut self, f: impl FnOnce(&mut MountConfig)) -> Self {
        f(&mut self.config.mount);
        self
    }

    pub fn artwork(mut self, element: ArtworkElement) -> Self {
        self.config.artwork.push(element);
        self
    }

    /// A square icon of side `size` centred at `position`.
    pub fn square_icon(self, name: &str, style: Style, position: Point2, size: f64, depth: f64) -> Self {
        self.artwork(ArtworkElement {
            name: name.to_string(),
            source: ArtworkSource::Icon {
                path: "M0 0 H1 V1 H0 Z".to_string(),
            },
            style,
            position,
            target_size: size,
            depth,
            ..Default::default()
        })
    }

    pub fn partial(mut self) -> Self {
        self.options.partial = true;
        self
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn kernel(mut self, kernel: KernelChoice) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn glyphs(mut self, glyphs: FontLibrary) -> Self {
        self.glyphs = glyphs;
        self
    }

    pub fn config(&self) -> &NameplateConfig {
        &self.config
    }

    pub fn build_options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build on a fresh engine and tessellate the result.
    pub fn build(&self) -> Result<BuiltPlate, HarnessError> {
        self.build_with(&Engine::with_kernel(self.kernel))
    }

    /// Build through `engine`, sharing its cache.
    pub fn build_with(&self, engine: &Engine) -> Result<BuiltPlate, HarnessError> {
        let result = engine.build(&self.config, &self.glyphs, &self.options)?;
        let mesh = result.solid.tessellate(&Tessellation::default())?;
        Ok(BuiltPlate { result, mesh })
    }
}

/// A finished build and its mesh.
#[derive(Debug, Clone)]
pub struct BuiltPlate {
    pub result: Arc<NameplateResult>,
    pub mesh: RenderMesh,
}

impl BuiltPlate {
    pub fn solid(&self) -> &dyn SolidBody {
        self.result.solid.as_ref()
    }

    pub fn volume(&self) -> f64 {
        self.result.volume
    }

    pub fn contains(&self, p: [f64; 3]) -> bool {
        self.result.solid.contains_point(p)
    }

    /// Labels of the applied pipeline steps, in order.
    pub fn step_labels(&self) -> Vec<String> {
        self.result
            .diagnostics
            .steps
            .iter()
            .map(|s| s.label.to_string())
            .collect()
    }

    /// Run every finished-solid oracle.
    pub fn verify(&self) -> Vec<OracleVerdict> {
        oracle::run_solid_checks(self.solid(), &self.mesh)
    }

    /// Fail with the first failing oracle.
    pub fn assert_valid(&self) -> Result<(), HarnessError> {
        match self.verify().into_iter().find(|v| !v.passed) {
            None => Ok(()),
            Some(v) => Err(HarnessError::OracleFailure {
                oracle: v.oracle_name,
                detail: v.detail,
            }),
        }
    }

    pub fn export(&self, format: ExportFormat) -> Result<ExportArtifact, HarnessError> {
        Ok(export_result(&self.result, &ExportOptions::new(format))?)
    }

    pub fn report(&self) -> NameplateReport {
        NameplateReport::from_build(self, self.verify())
    }
}
