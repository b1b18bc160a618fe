use std::sync::Arc;

use modeling_ops::{BooleanKind, FeatureRole, OpError};
use path_interpreter::MalformedPathError;
use plate_kernel::{BoundingBox, SolidBody};
use plate_types::{ConfigurationError, FeatureLabel};
use profile_builder::DegenerateProfileError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolved plate dimensions, after auto sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateDims {
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
}

/// The finished, immutable product of one build.
#[derive(Debug, Clone)]
pub struct NameplateResult {
    /// The final solid, detached from the kernel session that built it.
    pub solid: Arc<dyn SolidBody>,
    pub bounding_box: BoundingBox,
    pub volume: f64,
    pub plate: PlateDims,
    /// Unique per build, so two builds of one config are distinguishable.
    pub build_id: Uuid,
    pub diagnostics: BuildDiagnostics,
}

/// One boolean step of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStep {
    pub label: FeatureLabel,
    pub role: FeatureRole,
    pub kind: BooleanKind,
}

/// A feature left out of a partial build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFailure {
    pub label: FeatureLabel,
    pub message: String,
}

/// Non-fatal diagnostics for a whole build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildDiagnostics {
    /// Steps applied to the accumulated solid, in order.
    pub steps: Vec<BuildStep>,
    /// Features skipped in partial mode.
    pub failures: Vec<FeatureFailure>,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Total kernel time, in milliseconds.
    pub kernel_time_ms: f64,
}

impl BuildDiagnostics {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A boolean step that produced an unusable solid, or a feature whose
/// geometry could not be built.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompositionError {
    #[error("{label}: {kind:?} left an empty solid")]
    EmptyResult { label: FeatureLabel, kind: BooleanKind },

    #[error("{label}: {kind:?} produced a non-manifold solid")]
    NonManifold { label: FeatureLabel, kind: BooleanKind },

    #[error("{label}: {source}")]
    Operation {
        label: FeatureLabel,
        #[source]
        source: OpError,
    },
}

impl CompositionError {
    pub fn label(&self) -> &FeatureLabel {
        match self {
            CompositionError::EmptyResult { label, .. }
            | CompositionError::NonManifold { label, .. }
            | CompositionError::Operation { label, .. } => label,
        }
    }
}

impl FeatureFailure {
    /// Record an operation error against the feature it names, or against
    /// `fallback` when it names none.
    pub fn from_op(fallback: &FeatureLabel, err: OpError) -> Self {
        match err {
            OpError::InFeature { label, source } => FeatureFailure {
                label,
                message: source.to_string(),
            },
            other => FeatureFailure {
                label: other.label().cloned().unwrap_or_else(|| fallback.clone()),
                message: other.to_string(),
            },
        }
    }
}

/// Everything a build can fail with.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("{label}: malformed path: {source}")]
    MalformedPath {
        label: FeatureLabel,
        #[source]
        source: MalformedPathError,
    },

    #[error("{label}: degenerate profile: {source}")]
    DegenerateProfile {
        label: FeatureLabel,
        #[source]
        source: DegenerateProfileError,
    },

    #[error("composition failed: {0}")]
    Composition(#[from] CompositionError),

    #[error("build cancelled")]
    Cancelled,
}

impl BuildError {
    /// Sort an operation error into the build taxonomy, naming `label`
    /// unless the error already names a feature.
    pub fn from_op(label: &FeatureLabel, err: OpError) -> Self {
        let (label, err) = match err {
            OpError::InFeature { label, source } => (label, *source),
            other => (label.clone(), other),
        };
        match err {
            OpError::Path(source) => BuildError::MalformedPath { label, source },
            OpError::Profile(source) => BuildError::DegenerateProfile { label, source },
            OpError::Configuration(e) => BuildError::Configuration(e),
            source => BuildError::Composition(CompositionError::Operation { label, source }),
        }
    }

    /// The feature this error is about, if any.
    pub fn label(&self) -> Option<&FeatureLabel> {
        match self {
            BuildError::MalformedPath { label, .. } | BuildError::DegenerateProfile { label, .. } => Some(label),
            BuildError::Composition(e) => Some(e.label()),
            BuildError::Configuration(_) | BuildError::Cancelled => None,
        }
    }
}
