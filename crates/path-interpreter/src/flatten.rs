//! Curve flattening: turns parsed segments into closed polygons.

use lyon_geom::{point, CubicBezierSegment, Point, QuadraticBezierSegment};
use plate_types::{Point2, Polygon};

use crate::parser::Segment;

/// Controls how finely curves are approximated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenOptions {
    /// Maximum distance between a curve and its chord approximation.
    pub tolerance: f64,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self { tolerance: 0.05 }
    }
}

impl FlattenOptions {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Tolerance handed to the flattener, floored so a zero or negative
    /// setting cannot demand unbounded chords.
    fn effective_tolerance(&self) -> f64 {
        if self.tolerance.is_finite() {
            self.tolerance.max(MIN_TOLERANCE)
        } else {
            FlattenOptions::default().tolerance
        }
    }
}

const MIN_TOLERANCE: f64 = 1e-6;

fn to_point(p: Point2) -> Point<f64> {
    point(p[0], p[1])
}

/// Make the last appended point the exact curve end.
fn pin_end(end: Point2, out: &mut Vec<Point2>, start_len: usize) {
    if out.len() == start_len || out[out.len() - 1] != end {
        if out.len() > start_len {
            out.pop();
        }
        out.push(end);
    }
}

/// Append the flattened cubic (excluding its start point) to `out`.
pub fn flatten_cubic(
    p0: Point2,
    p1: Point2,
    p2: Point2,
    p3: Point2,
    options: &FlattenOptions,
    out: &mut Vec<Point2>,
) {
    let curve = CubicBezierSegment {
        from: to_point(p0),
        ctrl1: to_point(p1),
        ctrl2: to_point(p2),
        to: to_point(p3),
    };
    let start_len = out.len();
    curve.for_each_flattened(options.effective_tolerance(), &mut |segment| {
        out.push([segment.to.x, segment.to.y]);
    });
    pin_end(p3, out, start_len);
}

/// Append the flattened quadratic (excluding its start point) to `out`.
pub fn flatten_quadratic(
    p0: Point2,
    c: Point2,
    p2: Point2,
    options: &FlattenOptions,
    out: &mut Vec<Point2>,
) {
    let curve = QuadraticBezierSegment {
        from: to_point(p0),
        ctrl: to_point(c),
        to: to_point(p2),
    };
    let start_len = out.len();
    curve.for_each_flattened(options.effective_tolerance(), &mut |segment| {
        out.push([segment.to.x, segment.to.y]);
    });
    pin_end(p2, out, start_len);
}

fn same_point(a: Point2, b: Point2) -> bool {
    (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
}

fn finish(ring: &mut Vec<Point2>, out: &mut Vec<Polygon>) {
    let mut points = std::mem::take(ring);
    // A bare move draws nothing.
    if points.len() < 2 {
        return;
    }
    if points.len() > 1 && same_point(points[0], points[points.len() - 1]) {
        points.pop();
    }
    out.push(Polygon::new(points));
}

/// Flatten segments into closed polygons, one per subpath, keeping the
/// input winding. Subpaths left open are closed implicitly.
pub fn flatten(segments: &[Segment], options: &FlattenOptions) -> Vec<Polygon> {
    let mut polygons = Vec::new();
    let mut ring: Vec<Point2> = Vec::new();
    let mut current = [0.0, 0.0];

    for seg in segments {
        match *seg {
            Segment::MoveTo(p) => {
                finish(&mut ring, &mut polygons);
                ring.push(p);
                current = p;
            }
            Segment::LineTo(p) => {
                ring.push(p);
                current = p;
            }
            Segment::CubicTo { c1, c2, to } => {
                flatten_cubic(current, c1, c2, to, options, &mut ring);
                current = to;
            }
            Segment::QuadTo { c, to } => {
                flatten_quadratic(current, c, to, options, &mut ring);
                current = to;
            }
            Segment::Close => {
                if let Some(&start) = ring.first() {
                    current = start;
                }
                finish(&mut ring, &mut polygons);
            }
        }
    }
    finish(&mut ring, &mut polygons);
    polygons
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_cubic_is_one_chord() {
        let mut out = Vec::new();
        flatten_cubic(
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
            [3.0, 0.0],
            &FlattenOptions::default(),
            &mut out,
        );
        assert_eq!(out.last(), Some(&[3.0, 0.0]));
        assert!(out.iter().all(|p| p[1] == 0.0));
    }

    #[test]
    fn collinear_cubic_keeps_its_overshoot() {
        // Controls fold back along the chord: the curve runs out past both
        // ends of the chord before settling at (1, 0).
        let mut out = vec![[0.0, 0.0]];
        flatten_cubic(
            [0.0, 0.0],
            [10.0, 0.0],
            [-10.0, 0.0],
            [1.0, 0.0],
            &FlattenOptions::default(),
            &mut out,
        );
        let max_x = out.iter().map(|p| p[0]).fold(f64::MIN, f64::max);
        let min_x = out.iter().map(|p| p[0]).fold(f64::MAX, f64::min);
        assert!(max_x > 2.5, "max x = {}", max_x);
        assert!(min_x < -1.5, "min x = {}", min_x);
        assert_eq!(out.last(), Some(&[1.0, 0.0]));
    }

    #[test]
    fn quadratic_ends_on_its_endpoint() {
        let mut out = Vec::new();
        flatten_quadratic(
            [0.0, 0.0],
            [5.0, 10.0],
            [10.0, 0.0],
            &FlattenOptions::with_tolerance(0.01),
            &mut out,
        );
        assert!(out.len() > 4);
        assert_eq!(out.last(), Some(&[10.0, 0.0]));
        // Apex of this parabola is y = 5 at x = 5.
        let apex = out.iter().map(|p| p[1]).fold(f64::MIN, f64::max);
        assert!((apex - 5.0).abs() < 0.02, "apex = {}", apex);
    }

    #[test]
    fn zero_tolerance_still_terminates() {
        let mut out = Vec::new();
        flatten_cubic(
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [1.0, 0.0],
            &FlattenOptions::with_tolerance(0.0),
            &mut out,
        );
        assert_eq!(out.last(), Some(&[1.0, 0.0]));
    }

    #[test]
    fn curved_cubic_stays_within_tolerance() {
        let options = FlattenOptions::with_tolerance(0.01);
        let k = 0.552_284_749_8;
        let mut out = vec![[1.0, 0.0]];
        flatten_cubic([1.0, 0.0], [1.0, k], [k, 1.0], [0.0, 1.0], &options, &mut out);
        assert!(out.len() > 4);
        for p in &out {
            let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
            // Quarter-circle Bézier deviates from the circle by ~2.7e-4.
            assert!((r - 1.0).abs() < 0.01 + 3e-4, "r = {}", r);
        }
    }

    #[test]
    fn closing_point_is_not_repeated() {
        let segs = vec![
            Segment::MoveTo([0.0, 0.0]),
            Segment::LineTo([1.0, 0.0]),
            Segment::LineTo([1.0, 1.0]),
            Segment::LineTo([0.0, 0.0]),
            Segment::Close,
        ];
        let polys = flatten(&segs, &FlattenOptions::default());
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 3);
    }

    #[test]
    fn bare_moves_are_dropped() {
        let segs = vec![
            Segment::MoveTo([5.0, 5.0]),
            Segment::MoveTo([0.0, 0.0]),
            Segment::LineTo([1.0, 0.0]),
            Segment::LineTo([1.0, 1.0]),
        ];
        let polys = flatten(&segs, &FlattenOptions::default());
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].points[0], [0.0, 0.0]);
    }
}
