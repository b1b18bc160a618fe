//! Artwork placement: icon and SVG outlines scaled to a target size.

use path_interpreter::{interpret, shape_to_polygon, FlattenOptions};
use plate_types::{ArtworkElement, ArtworkSource, Bounds2, BuildOptions, FeatureLabel, Polygon, Transform2};
use profile_builder::{build_profiles, HoleRule};
use tracing::debug;

use crate::style::styled_feature;
use crate::types::{FeatureSolid, OpError};

pub fn artwork_label(index: usize, element: &ArtworkElement) -> FeatureLabel {
    if element.name.is_empty() {
        FeatureLabel::new(format!("artwork[{}]", index))
    } else {
        FeatureLabel::new(format!("artwork[{}] '{}'", index, element.name))
    }
}

fn source_rings(source: &ArtworkSource, tolerance: f64) -> Result<Vec<Polygon>, OpError> {
    let flatten = FlattenOptions::with_tolerance(tolerance);
    match source {
        ArtworkSource::Icon { path } => Ok(interpret(path, &flatten)?),
        ArtworkSource::Svg { paths, shapes, .. } => {
            let mut rings = Vec::new();
            for path in paths {
                rings.extend(interpret(path, &flatten)?);
            }
            rings.extend(shapes.iter().filter_map(shape_to_polygon));
            Ok(rings)
        }
    }
}

fn source_bounds(source: &ArtworkSource, rings: &[Polygon]) -> Option<Bounds2> {
    if let ArtworkSource::Svg {
        view_box: Some(vb), ..
    } = source
    {
        return Some(Bounds2 {
            min: [vb[0], vb[1]],
            max: [vb[0] + vb[2], vb[1] + vb[3]],
        });
    }
    Bounds2::from_points(rings.iter().flat_map(|r| r.points.iter()))
}

/// Build the styled feature for one artwork element.
///
/// The larger side of the source bounds (the viewBox when one is given) is
/// scaled to `target_size × scale`, the artwork is rotated about its centre
/// and moved to `position`. SVG input is Y-down and is mirrored.
pub fn artwork_feature(index: usize, element: &ArtworkElement, options: &BuildOptions) -> Result<FeatureSolid, OpError> {
    let label = artwork_label(index, element);
    let mut rings = source_rings(&element.source, options.flatten_tolerance)?;
    if rings.is_empty() {
        return Err(OpError::NoProfiles { label });
    }

    let Some(bounds) = source_bounds(&element.source, &rings) else {
        return Err(OpError::NoProfiles { label });
    };
    let extent = bounds.width().max(bounds.height());
    if !(extent > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: format!("{}: artwork has no extent", label),
        });
    }
    let scale = element.target_size / extent * element.scale;

    // Tolerance is in source units; refine when the artwork is enlarged.
    if scale > 1.0 {
        rings = source_rings(&element.source, options.flatten_tolerance / scale)?;
    }

    let flip = match element.source {
        ArtworkSource::Icon { .. } => 1.0,
        ArtworkSource::Svg { .. } => -1.0,
    };
    let centre = bounds.center();
    let transform = Transform2::translate(-centre[0], -centre[1])
        .then(&Transform2::scale(scale, scale * flip))
        .then(&Transform2::rotate_degrees(element.rotation))
        .then(&Transform2::translate(element.position[0], element.position[1]));

    let placed: Vec<Polygon> = rings.iter().map(|r| r.transformed(&transform)).collect();
    let profiles = build_profiles(&placed, HoleRule::NestingParity)?;
    if profiles.is_empty() {
        return Err(OpError::NoProfiles { label });
    }
    debug!(%label, profiles = profiles.len(), scale, "placed artwork");
    Ok(styled_feature(label, element.style, element.depth, profiles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureRole;
    use approx::assert_relative_eq;
    use plate_types::{BasicShape, Style};

    fn svg(paths: Vec<&str>, shapes: Vec<BasicShape>, view_box: Option<[f64; 4]>) -> ArtworkSource {
        ArtworkSource::Svg {
            paths: paths.into_iter().map(String::from).collect(),
            shapes,
            view_box,
        }
    }

    #[test]
    fn larger_side_scales_to_target() {
        let element = ArtworkElement {
            source: svg(vec!["M0 0 H10 V5 H0 Z"], Vec::new(), None),
            target_size: 20.0,
            position: [5.0, -3.0],
            ..Default::default()
        };
        let feature = artwork_feature(0, &element, &BuildOptions::default()).unwrap();
        let b = feature.profiles[0].bounds().unwrap();
        assert_relative_eq!(b.width(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(b.height(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(b.center()[0], 5.0, epsilon = 1e-9);
        assert_relative_eq!(b.center()[1], -3.0, epsilon = 1e-9);
        assert_eq!(feature.role, FeatureRole::Additive);
    }

    #[test]
    fn view_box_sets_the_scale_and_svg_is_flipped() {
        // A 10x10 square in the top-left quarter of a 40x40 viewBox.
        let element = ArtworkElement {
            source: svg(vec!["M0 0 H10 V10 H0 Z"], Vec::new(), Some([0.0, 0.0, 40.0, 40.0])),
            target_size: 20.0,
            style: Style::Engraved,
            ..Default::default()
        };
        let feature = artwork_feature(0, &element, &BuildOptions::default()).unwrap();
        let b = feature.profiles[0].bounds().unwrap();
        assert_relative_eq!(b.width(), 5.0, epsilon = 1e-9);
        // Y-down top-left lands at the upper left after the flip.
        assert_relative_eq!(b.min[0], -10.0, epsilon = 1e-9);
        assert_relative_eq!(b.max[1], 10.0, epsilon = 1e-9);
        assert_eq!(feature.role, FeatureRole::Subtractive);
    }

    #[test]
    fn ring_inside_ring_is_a_hole() {
        let element = ArtworkElement {
            name: "frame".into(),
            source: svg(
                Vec::new(),
                vec![
                    BasicShape::Rect {
                        x: 0.0,
                        y: 0.0,
                        width: 10.0,
                        height: 10.0,
                        rx: 0.0,
                        ry: 0.0,
                    },
                    BasicShape::Rect {
                        x: 2.5,
                        y: 2.5,
                        width: 5.0,
                        height: 5.0,
                        rx: 0.0,
                        ry: 0.0,
                    },
                ],
                None,
            ),
            target_size: 10.0,
            ..Default::default()
        };
        let feature = artwork_feature(2, &element, &BuildOptions::default()).unwrap();
        assert_eq!(feature.label.as_str(), "artwork[2] 'frame'");
        assert_eq!(feature.profiles.len(), 1);
        assert_relative_eq!(feature.area(), 75.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_artwork_has_no_profiles() {
        let element = ArtworkElement::default();
        assert!(matches!(
            artwork_feature(0, &element, &BuildOptions::default()),
            Err(OpError::NoProfiles { .. })
        ));
    }
}
