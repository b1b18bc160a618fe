//! Decorative frames around the plate edge.

use plate_types::{BorderConfig, BorderStyle, BuildOptions, CornerStyle, FeatureLabel, Polygon, Profile};

use crate::plate::{chamfered_rectangle, rectangle, rounded_rectangle};
use crate::types::{Extent, FeatureRole, FeatureSolid};

fn cornered(width: f64, height: f64, style: CornerStyle, radius: f64, quarter: usize) -> Polygon {
    match style {
        CornerStyle::Square => rectangle(width, height),
        CornerStyle::Rounded => rounded_rectangle(width, height, radius, quarter),
        CornerStyle::Chamfered => chamfered_rectangle(width, height, radius),
    }
}

/// A rectangular band whose outside is `outer` (w, h) and whose inside is
/// `band` narrower on every side.
fn frame_ring(border: &BorderConfig, outer: (f64, f64), band: f64, quarter: usize) -> Option<Profile> {
    let (ow, oh) = outer;
    let (iw, ih) = (ow - 2.0 * band, oh - 2.0 * band);
    if iw <= 0.0 || ih <= 0.0 {
        return None;
    }
    let radius = border.corner_radius.min(0.9 * band);
    let outside = cornered(ow, oh, border.corner_style, radius, quarter);
    let inside = cornered(iw, ih, border.corner_style, radius, quarter);
    Some(Profile::new(outside, vec![inside]).oriented())
}

/// Frames for the configured border on a `width` × `height` plate.
///
/// Raised and double frames are structural: they become part of the plate
/// body before anything is cut. An inset frame is a groove.
pub fn border_features(border: &BorderConfig, width: f64, height: f64, options: &BuildOptions) -> Vec<FeatureSolid> {
    let quarter = options.arc_segments_per_quarter as usize;
    let outer = (width - 2.0 * border.offset, height - 2.0 * border.offset);
    let raised = Extent::Raised {
        height: border.height,
    };

    let mut out = Vec::new();
    match border.style {
        BorderStyle::None => {}
        BorderStyle::Raised => {
            out.extend(frame_ring(border, outer, border.width, quarter).map(|ring| {
                FeatureSolid::new(FeatureLabel::new("border"), FeatureRole::Structural, raised, vec![ring])
            }));
        }
        BorderStyle::Inset => {
            let groove = Extent::Engraved {
                depth: border.height,
            };
            out.extend(frame_ring(border, outer, border.width, quarter).map(|ring| {
                FeatureSolid::new(FeatureLabel::new("border"), FeatureRole::Subtractive, groove, vec![ring])
            }));
        }
        BorderStyle::Double => {
            out.extend(frame_ring(border, outer, border.width, quarter).map(|ring| {
                FeatureSolid::new(FeatureLabel::new("border outer"), FeatureRole::Structural, raised, vec![ring])
            }));
            let inset = 2.0 * (border.width + border.double_gap);
            let second = (outer.0 - inset, outer.1 - inset);
            out.extend(frame_ring(border, second, border.double_inner_width, quarter).map(|ring| {
                FeatureSolid::new(FeatureLabel::new("border inner"), FeatureRole::Structural, raised, vec![ring])
            }));
        }
    }
    out
}
