use plate_kernel::{KernelError, KernelSolidHandle};
use plate_types::{BuildOptions, ConfigurationError, FeatureLabel, Profile};
use serde::{Deserialize, Serialize};

use path_interpreter::MalformedPathError;
use profile_builder::DegenerateProfileError;

/// Result of a kernel-level modeling operation.
#[derive(Debug, Clone)]
pub struct OpResult {
    /// Handle to the solid in the kernel. Runtime-only, not persisted.
    pub handle: KernelSolidHandle,
    /// Non-fatal warnings and timing information.
    pub diagnostics: Diagnostics,
}

/// Non-fatal diagnostics from an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Time taken for the kernel operation, in milliseconds.
    pub kernel_time_ms: f64,
}

impl Diagnostics {
    pub fn merge(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
        self.kernel_time_ms += other.kernel_time_ms;
    }
}

/// How a feature meets the accumulated solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureRole {
    /// Part of the plate body itself (stand, raised border). Unioned before
    /// any subtraction.
    Structural,
    /// Cut from the accumulated solid.
    Subtractive,
    /// Unioned onto the finished plate surface.
    Additive,
}

/// Vertical extent of a feature, relative to the plate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extent {
    /// From just below the top surface up by `height`.
    Raised { height: f64 },
    /// From `depth` below the top surface to the clearance margin above it.
    Engraved { depth: f64 },
    /// Through the whole body, clearing both faces by the margin.
    Through,
    /// From below the back face up to `depth` above it.
    FromBack { depth: f64 },
    /// Absolute heights.
    Span { bottom: f64, top: f64 },
}

/// The heights a feature extent is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateFrame {
    /// Back face of the plate.
    pub bottom: f64,
    /// Top face of the plate.
    pub top: f64,
    /// Lowest point of the body, below `bottom` when a stand hangs under it.
    pub floor: f64,
}

impl PlateFrame {
    pub fn new(thickness: f64) -> Self {
        Self {
            bottom: 0.0,
            top: thickness,
            floor: 0.0,
        }
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor.min(self.bottom);
        self
    }

    pub fn thickness(&self) -> f64 {
        self.top - self.bottom
    }
}

/// A styled set of profiles waiting to be extruded and combined.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSolid {
    pub label: FeatureLabel,
    pub role: FeatureRole,
    pub extent: Extent,
    pub profiles: Vec<Profile>,
    /// Mount cutters that must stay open through any raised feature.
    pub keep_out: bool,
}

impl FeatureSolid {
    pub fn new(label: FeatureLabel, role: FeatureRole, extent: Extent, profiles: Vec<Profile>) -> Self {
        Self {
            label,
            role,
            extent,
            profiles,
            keep_out: false,
        }
    }

    pub fn with_keep_out(mut self) -> Self {
        self.keep_out = true;
        self
    }

    /// Bottom and top height of the extruded tool.
    pub fn z_range(&self, frame: &PlateFrame, options: &BuildOptions) -> (f64, f64) {
        let margin = options.clearance_margin;
        match self.extent {
            Extent::Raised { height } => (frame.top - options.coplanar_epsilon, frame.top + height),
            Extent::Engraved { depth } => (frame.top - depth, frame.top + margin),
            Extent::Through => (frame.floor - margin, frame.top + margin),
            Extent::FromBack { depth } => (frame.bottom - margin, frame.bottom + depth),
            Extent::Span { bottom, top } => (bottom, top),
        }
    }

    /// Subtractive tools must reach past every surface they open by the
    /// clearance margin, or a raised feature on the same footprint can
    /// survive the cut.
    pub fn clears(&self, frame: &PlateFrame, options: &BuildOptions) -> bool {
        if self.role != FeatureRole::Subtractive {
            return true;
        }
        let margin = options.clearance_margin;
        let (z0, z1) = self.z_range(frame, options);
        match self.extent {
            Extent::Engraved { depth } => z1 >= frame.top + margin && z0 <= frame.top - depth,
            Extent::Through => z1 >= frame.top + margin && z0 <= frame.floor - margin,
            Extent::FromBack { depth } => z0 <= frame.bottom - margin && z1 >= frame.bottom + depth,
            Extent::Raised { .. } | Extent::Span { .. } => false,
        }
    }

    /// Net footprint area over all profiles.
    pub fn area(&self) -> f64 {
        self.profiles.iter().map(Profile::area).sum()
    }
}

/// Errors from modeling operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("malformed path: {0}")]
    Path(#[from] MalformedPathError),

    #[error("degenerate profile: {0}")]
    Profile(#[from] DegenerateProfileError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("{label}: no profiles to extrude")]
    NoProfiles { label: FeatureLabel },

    #[error("{label}: extent {z_bottom}..{z_top} does not clear the plate surface")]
    Clearance {
        label: FeatureLabel,
        z_bottom: f64,
        z_top: f64,
    },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("{label}: {source}")]
    InFeature {
        label: FeatureLabel,
        #[source]
        source: Box<OpError>,
    },
}

impl OpError {
    /// Attach the feature being generated. An error that already names a
    /// feature keeps it.
    pub fn in_feature(self, label: &FeatureLabel) -> Self {
        match self {
            OpError::InFeature { .. } => self,
            other => OpError::InFeature {
                label: label.clone(),
                source: Box::new(other),
            },
        }
    }

    /// The feature this error is about, if known.
    pub fn label(&self) -> Option<&FeatureLabel> {
        match self {
            OpError::NoProfiles { label } | OpError::Clearance { label, .. } | OpError::InFeature { label, .. } => {
                Some(label)
            }
            _ => None,
        }
    }
}
