pub mod config;
pub mod error;
pub mod geometry;
pub mod glyph;
pub mod options;
pub mod validate;

pub use config::*;
pub use error::*;
pub use geometry::*;
pub use glyph::*;
pub use options::*;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Human-readable identity of a feature in a build, e.g. `text[0] 'HELLO'`
/// or `mount screw_hole[1]`. Carried by every composition error and
/// diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureLabel(pub String);

impl FeatureLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
