use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Numerical tunables of the build pipeline.
///
/// The clearance margin and flattening tolerance were tuned empirically for
/// desktop FDM printing; retune them per kernel precision rather than treating
/// them as fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Extra vertical extent given to every subtractive solid beyond the
    /// surface it cuts from.
    pub clearance_margin: f64,
    /// Maximum chord-to-curve deviation when flattening Béziers and arcs.
    pub flatten_tolerance: f64,
    /// Segments used for every 90° of a generated arc or circle.
    pub arc_segments_per_quarter: u32,
    /// Downward overlap of raised solids into the plate, so additive and
    /// base solids never share a coplanar face.
    pub coplanar_epsilon: f64,
    /// Record per-feature failures and continue instead of aborting.
    pub partial: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            clearance_margin: 10.0,
            flatten_tolerance: 0.05,
            arc_segments_per_quarter: 16,
            coplanar_epsilon: 0.01,
            partial: false,
        }
    }
}

impl BuildOptions {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.clearance_margin > 0.0) {
            return Err(ConfigurationError::not_positive(
                "options.clearance_margin",
                self.clearance_margin,
            ));
        }
        if !(self.flatten_tolerance > 0.0) {
            return Err(ConfigurationError::not_positive(
                "options.flatten_tolerance",
                self.flatten_tolerance,
            ));
        }
        if self.arc_segments_per_quarter == 0 {
            return Err(ConfigurationError::not_positive(
                "options.arc_segments_per_quarter",
                0.0,
            ));
        }
        if !(self.coplanar_epsilon >= 0.0) {
            return Err(ConfigurationError::OutOfRange {
                field: "options.coplanar_epsilon".into(),
                value: self.coplanar_epsilon,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        Ok(())
    }

    /// Segments for a full circle.
    pub fn circle_segments(&self) -> usize {
        self.arc_segments_per_quarter as usize * 4
    }
}
