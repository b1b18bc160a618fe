//! SVG basic shapes as polygons, in the document's own coordinates.

use plate_types::{arc_points, BasicShape, Point2, Polygon};

/// Segments used for a full circle or ellipse.
pub const SHAPE_CIRCLE_SEGMENTS: usize = 36;

fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Polygon {
    let points = (0..SHAPE_CIRCLE_SEGMENTS)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / SHAPE_CIRCLE_SEGMENTS as f64;
            [cx + rx * t.cos(), cy + ry * t.sin()]
        })
        .collect();
    Polygon::new(points)
}

fn rounded_rect(x: f64, y: f64, w: f64, h: f64, rx: f64, ry: f64) -> Polygon {
    let per_corner = SHAPE_CIRCLE_SEGMENTS / 4;
    let corners = [
        ([x + w - rx, y + h - ry], 0.0),
        ([x + rx, y + h - ry], 90.0),
        ([x + rx, y + ry], 180.0),
        ([x + w - rx, y + ry], 270.0),
    ];
    let mut points: Vec<Point2> = Vec::with_capacity(4 * (per_corner + 1));
    for (c, start) in corners {
        // Elliptical corner: scale a unit arc by (rx, ry).
        for p in arc_points([0.0, 0.0], 1.0, start, start + 90.0, per_corner) {
            points.push([c[0] + rx * p[0], c[1] + ry * p[1]]);
        }
    }
    Polygon::new(points)
}

/// Convert one shape. Zero-sized shapes render nothing and yield `None`,
/// matching SVG.
pub fn shape_to_polygon(shape: &BasicShape) -> Option<Polygon> {
    match shape {
        BasicShape::Rect {
            x,
            y,
            width,
            height,
            rx,
            ry,
        } => {
            if !(*width > 0.0 && *height > 0.0) {
                return None;
            }
            // A lone radius applies to both axes.
            let (mut rx, mut ry) = match (*rx > 0.0, *ry > 0.0) {
                (true, true) => (*rx, *ry),
                (true, false) => (*rx, *rx),
                (false, true) => (*ry, *ry),
                (false, false) => (0.0, 0.0),
            };
            rx = rx.min(width / 2.0);
            ry = ry.min(height / 2.0);
            if rx > 0.0 && ry > 0.0 {
                Some(rounded_rect(*x, *y, *width, *height, rx, ry))
            } else {
                Some(Polygon::new(vec![
                    [*x, *y],
                    [x + width, *y],
                    [x + width, y + height],
                    [*x, y + height],
                ]))
            }
        }
        BasicShape::Circle { cx, cy, r } => (*r > 0.0).then(|| ellipse(*cx, *cy, *r, *r)),
        BasicShape::Ellipse { cx, cy, rx, ry } => {
            (*rx > 0.0 && *ry > 0.0).then(|| ellipse(*cx, *cy, *rx, *ry))
        }
        // Filled polylines close implicitly, like polygons.
        BasicShape::Polygon { points } | BasicShape::Polyline { points } => {
            (points.len() >= 3).then(|| Polygon::new(points.clone()))
        }
    }
}
