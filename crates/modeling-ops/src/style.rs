use plate_types::{FeatureLabel, Profile, Style};

use crate::types::{Extent, FeatureRole, FeatureSolid};

/// Turn styled profiles into a feature: raised is additive, engraved and
/// cutout are subtractive.
pub fn styled_feature(label: FeatureLabel, style: Style, depth: f64, profiles: Vec<Profile>) -> FeatureSolid {
    let (role, extent) = match style {
        Style::Raised => (FeatureRole::Additive, Extent::Raised { height: depth }),
        Style::Engraved => (FeatureRole::Subtractive, Extent::Engraved { depth }),
        Style::Cutout => (FeatureRole::Subtractive, Extent::Through),
    };
    FeatureSolid::new(label, role, extent, profiles)
}
