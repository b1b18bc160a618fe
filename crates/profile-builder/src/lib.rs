//! Profile Builder: closed polygons to validated faces-with-holes.
//!
//! Disjoint outlines stay separate profiles. Nothing here unions 2D
//! regions; the composition engine combines the extruded solids.

pub mod classify;
pub mod cleanup;
pub mod error;
pub mod spacing;
pub mod validate;

pub use classify::{classify, HoleRule};
pub use cleanup::clean_ring;
pub use error::DegenerateProfileError;
pub use spacing::{layout_run, spacing_offset, CharacterOutline, CharacterRun, PlacedCharacter};
pub use validate::validate_profile;

use plate_types::{Polygon, Profile};
use tracing::trace;

/// Clean, classify and validate `rings`, returning profiles in canonical
/// orientation (outer counter-clockwise, holes clockwise).
pub fn build_profiles(rings: &[Polygon], rule: HoleRule) -> Result<Vec<Profile>, DegenerateProfileError> {
    let cleaned: Vec<Polygon> = rings.iter().map(clean_ring).collect();
    let profiles = classify(&cleaned, rule);
    let mut out = Vec::with_capacity(profiles.len());
    for profile in profiles {
        validate_profile(&profile)?;
        out.push(profile.oriented());
    }
    trace!(rings = rings.len(), profiles = out.len(), ?rule, "built profiles");
    Ok(out)
}
