//! Base plate outlines and the shared primitive polygons they are made of.
//!
//! Every generator returns a simple, closed, counter-clockwise polygon
//! centred on the origin.

use std::f64::consts::{FRAC_PI_2, SQRT_2};

use plate_types::{arc_points, BuildOptions, PlateConfig, PlateShape, Point2, Polygon, Profile};

/// Rounded corners stop this far short of meeting, so neighbouring arcs
/// never share a vertex.
const CORNER_GAP: f64 = 0.1;

pub fn rectangle(width: f64, height: f64) -> Polygon {
    let (hw, hh) = (width / 2.0, height / 2.0);
    Polygon::new(vec![[-hw, -hh], [hw, -hh], [hw, hh], [-hw, hh]])
}

/// Rectangle with circular corners. The radius is capped so straight edges
/// remain on every side.
pub fn rounded_rectangle(width: f64, height: f64, radius: f64, segments_per_quarter: usize) -> Polygon {
    let r = radius.min(width.min(height) / 2.0 - CORNER_GAP);
    if r <= 0.0 {
        return rectangle(width, height);
    }
    let (cx, cy) = (width / 2.0 - r, height / 2.0 - r);
    let corners = [
        ([cx, -cy], -90.0),
        ([cx, cy], 0.0),
        ([-cx, cy], 90.0),
        ([-cx, -cy], 180.0),
    ];
    let mut points = Vec::with_capacity(4 * (segments_per_quarter + 1));
    for (centre, start) in corners {
        points.extend(arc_points(centre, r, start, start + 90.0, segments_per_quarter));
    }
    Polygon::new(points)
}

/// Rectangle with 45° corner cuts of leg `chamfer`.
pub fn chamfered_rectangle(width: f64, height: f64, chamfer: f64) -> Polygon {
    let c = chamfer.min(width.min(height) / 2.0 - CORNER_GAP);
    if c <= 0.0 {
        return rectangle(width, height);
    }
    let (hw, hh) = (width / 2.0, height / 2.0);
    Polygon::new(vec![
        [-hw + c, -hh],
        [hw - c, -hh],
        [hw, -hh + c],
        [hw, hh - c],
        [hw - c, hh],
        [-hw + c, hh],
        [-hw, hh - c],
        [-hw, -hh + c],
    ])
}

pub fn circle(centre: Point2, radius: f64, segments: usize) -> Polygon {
    ellipse(centre, radius, radius, segments)
}

pub fn ellipse(centre: Point2, rx: f64, ry: f64, segments: usize) -> Polygon {
    let n = segments.max(3);
    Polygon::new(
        (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                [centre[0] + rx * t.cos(), centre[1] + ry * t.sin()]
            })
            .collect(),
    )
}

/// A stadium: the hull of two circles of `radius` centred on `a` and `b`.
pub fn capsule(a: Point2, b: Point2, radius: f64, segments_per_quarter: usize) -> Polygon {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    if dx.hypot(dy) < 1e-9 {
        return circle(a, radius, segments_per_quarter * 4);
    }
    let heading = dy.atan2(dx).to_degrees();
    let per_half = segments_per_quarter * 2;
    let mut points = arc_points(b, radius, heading - 90.0, heading + 90.0, per_half);
    points.extend(arc_points(a, radius, heading + 90.0, heading + 270.0, per_half));
    Polygon::new(points)
}

/// The regular-looking hexagon stretched to `width` × `height`: pointed
/// ends on the X axis, flat top and bottom.
pub fn hexagon(width: f64, height: f64) -> Polygon {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let a = hw - hh * 30f64.to_radians().tan();
    Polygon::new(vec![
        [hw, 0.0],
        [a, hh],
        [-a, hh],
        [-hw, 0.0],
        [-a, -hh],
        [a, -hh],
    ])
}

/// An octagon with equal edges on the shorter side.
pub fn octagon(width: f64, height: f64) -> Polygon {
    chamfered_rectangle(width, height, width.min(height) / (2.0 + SQRT_2))
}

/// An arched band: an annular sector whose centre line has radius
/// `radius` and arc length `width`, apex at the origin.
pub fn sweep_band(width: f64, height: f64, radius: f64, segments_per_quarter: usize) -> Polygon {
    let span = width / radius;
    let segments = ((span / FRAC_PI_2) * segments_per_quarter as f64).ceil().max(2.0) as usize;
    let half = span.to_degrees() / 2.0;
    let centre = [0.0, -radius];
    let mut points = arc_points(centre, radius + height / 2.0, 90.0 - half, 90.0 + half, segments);
    points.extend(arc_points(centre, radius - height / 2.0, 90.0 + half, 90.0 - half, segments));
    Polygon::new(points)
}

/// Outline of the base plate. Dimensions must already be resolved; auto
/// sizing happens before this is called.
pub fn plate_outline(plate: &PlateConfig, options: &BuildOptions) -> Profile {
    let (w, h) = (plate.width, plate.height);
    let quarter = options.arc_segments_per_quarter as usize;
    let outer = match plate.shape {
        PlateShape::Rectangle => rectangle(w, h),
        PlateShape::Rounded => rounded_rectangle(w, h, plate.corner_radius, quarter),
        PlateShape::Oval => ellipse([0.0, 0.0], w / 2.0, h / 2.0, options.circle_segments()),
        PlateShape::Chamfered => chamfered_rectangle(w, h, plate.chamfer),
        PlateShape::Hexagon => hexagon(w, h),
        PlateShape::Octagon => octagon(w, h),
        PlateShape::Sweep => sweep_band(w, h, plate.sweep_radius, quarter),
    };
    Profile::solid(outer).oriented()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rounded_corners_cut_the_expected_area() {
        let p = rounded_rectangle(100.0, 30.0, 5.0, 64);
        let expected = 100.0 * 30.0 - (4.0 - std::f64::consts::PI) * 25.0;
        assert_relative_eq!(p.area(), expected, max_relative = 1e-3);
        assert!(p.is_ccw());
    }

    #[test]
    fn oversized_radius_keeps_flat_edges() {
        let p = rounded_rectangle(20.0, 10.0, 50.0, 8);
        let b = p.bounds().unwrap();
        assert_relative_eq!(b.width(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(b.height(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn capsule_area_is_rectangle_plus_circle() {
        let p = capsule([0.0, 0.0], [0.0, -12.0], 2.5, 32);
        let expected = 12.0 * 5.0 + std::f64::consts::PI * 2.5 * 2.5;
        assert_relative_eq!(p.area(), expected, max_relative = 2e-3);
        assert!(p.is_ccw());
    }

    #[test]
    fn sweep_band_area_matches_sector() {
        // An annular sector of mean radius R and arc length w has area w·h.
        let p = sweep_band(100.0, 30.0, 80.0, 32);
        assert_relative_eq!(p.area(), 3000.0, max_relative = 2e-3);
        assert!(p.is_ccw());
    }

    #[test]
    fn hexagon_fits_its_box() {
        let p = hexagon(100.0, 30.0);
        let b = p.bounds().unwrap();
        assert_relative_eq!(b.width(), 100.0);
        assert_relative_eq!(b.height(), 30.0);
        assert!(p.is_ccw());
    }
}
