use serde::{Deserialize, Serialize};

/// A point in the plate's XY plane, in millimetres.
pub type Point2 = [f64; 2];

/// Axis-aligned 2D bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2 {
    pub min: Point2,
    pub max: Point2,
}

impl Bounds2 {
    /// Bounds of a point set. None when the set is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut b = Bounds2 {
            min: first,
            max: first,
        };
        for p in iter {
            b.include(*p);
        }
        Some(b)
    }

    pub fn include(&mut self, p: Point2) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    pub fn union(&self, other: &Bounds2) -> Bounds2 {
        let mut b = *self;
        b.include(other.min);
        b.include(other.max);
        b
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn center(&self) -> Point2 {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ]
    }
}

/// A 2D affine transform stored as a row-major 2x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2 {
    m: [[f64; 3]; 2],
}

impl Transform2 {
    pub fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        }
    }

    pub fn translate(dx: f64, dy: f64) -> Self {
        Self {
            m: [[1.0, 0.0, dx], [0.0, 1.0, dy]],
        }
    }

    /// Counter-clockwise rotation about the origin.
    pub fn rotate_degrees(angle: f64) -> Self {
        let (s, c) = angle.to_radians().sin_cos();
        Self {
            m: [[c, -s, 0.0], [s, c, 0.0]],
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            m: [[sx, 0.0, 0.0], [0.0, sy, 0.0]],
        }
    }

    /// Compose: apply `self` first, then `next`.
    pub fn then(&self, next: &Transform2) -> Transform2 {
        let a = &next.m;
        let b = &self.m;
        Transform2 {
            m: [
                [
                    a[0][0] * b[0][0] + a[0][1] * b[1][0],
                    a[0][0] * b[0][1] + a[0][1] * b[1][1],
                    a[0][0] * b[0][2] + a[0][1] * b[1][2] + a[0][2],
                ],
                [
                    a[1][0] * b[0][0] + a[1][1] * b[1][0],
                    a[1][0] * b[0][1] + a[1][1] * b[1][1],
                    a[1][0] * b[0][2] + a[1][1] * b[1][2] + a[1][2],
                ],
            ],
        }
    }

    pub fn apply(&self, p: Point2) -> Point2 {
        [
            self.m[0][0] * p[0] + self.m[0][1] * p[1] + self.m[0][2],
            self.m[1][0] * p[0] + self.m[1][1] * p[1] + self.m[1][2],
        ]
    }

    pub fn determinant(&self) -> f64 {
        self.m[0][0] * self.m[1][1] - self.m[0][1] * self.m[1][0]
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::identity()
    }
}

/// A closed polygon. The closing edge from the last point back to the
/// first is implicit; the first point is never repeated at the end.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point2>,
}

impl Polygon {
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Shoelace area: positive for counter-clockwise winding (Y up).
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn reversed(&self) -> Polygon {
        let mut points = self.points.clone();
        points.reverse();
        Polygon { points }
    }

    /// Return a copy wound counter-clockwise when `ccw` is true, clockwise otherwise.
    pub fn with_winding(&self, ccw: bool) -> Polygon {
        if self.is_ccw() == ccw {
            self.clone()
        } else {
            self.reversed()
        }
    }

    pub fn bounds(&self) -> Option<Bounds2> {
        Bounds2::from_points(&self.points)
    }

    /// Even-odd point containment. Points exactly on an edge may go either way.
    pub fn contains(&self, p: Point2) -> bool {
        point_in_ring(&self.points, p)
    }

    pub fn transformed(&self, t: &Transform2) -> Polygon {
        Polygon {
            points: self.points.iter().map(|&p| t.apply(p)).collect(),
        }
    }

    /// Iterate edges as (start, end) pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

/// A planar region: one outer boundary plus zero or more holes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub outer: Polygon,
    pub holes: Vec<Polygon>,
}

impl Profile {
    pub fn new(outer: Polygon, holes: Vec<Polygon>) -> Self {
        Self { outer, holes }
    }

    pub fn solid(outer: Polygon) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Net enclosed area (outer minus holes).
    pub fn area(&self) -> f64 {
        self.outer.area() - self.holes.iter().map(Polygon::area).sum::<f64>()
    }

    pub fn bounds(&self) -> Option<Bounds2> {
        self.outer.bounds()
    }

    /// Region containment: inside the outer boundary and outside every hole.
    pub fn contains(&self, p: Point2) -> bool {
        self.outer.contains(p) && !self.holes.iter().any(|h| h.contains(p))
    }

    /// Canonical orientation: outer counter-clockwise, holes clockwise.
    pub fn oriented(&self) -> Profile {
        Profile {
            outer: self.outer.with_winding(true),
            holes: self.holes.iter().map(|h| h.with_winding(false)).collect(),
        }
    }

    /// Apply a transform and restore canonical orientation, which a
    /// reflection would otherwise flip.
    pub fn transformed(&self, t: &Transform2) -> Profile {
        Profile {
            outer: self.outer.transformed(t),
            holes: self.holes.iter().map(|h| h.transformed(t)).collect(),
        }
        .oriented()
    }

    /// All rings, outer first.
    pub fn rings(&self) -> impl Iterator<Item = &Polygon> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }
}

pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += a[0] * b[1] - b[0] * a[1];
    }
    twice / 2.0
}

/// Crossing-number test against a single closed ring.
pub fn point_in_ring(ring: &[Point2], p: Point2) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i][0], ring[i][1]);
        let (xj, yj) = (ring[j][0], ring[j][1]);
        if (yi > p[1]) != (yj > p[1]) {
            let x_cross = xj + (p[1] - yj) * (xi - xj) / (yi - yj);
            if p[0] < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Points on a circular arc from `start` to `end` degrees (inclusive of both ends).
pub fn arc_points(center: Point2, radius: f64, start: f64, end: f64, segments: usize) -> Vec<Point2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = (start + (end - start) * i as f64 / segments as f64).to_radians();
            [center[0] + radius * t.cos(), center[1] + radius * t.sin()]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Polygon {
        Polygon::new(vec![[0.0, 0.0], [size, 0.0], [size, size], [0.0, size]])
    }

    #[test]
    fn signed_area_follows_winding() {
        let sq = square(2.0);
        assert!((sq.signed_area() - 4.0).abs() < 1e-12);
        assert!((sq.reversed().signed_area() + 4.0).abs() < 1e-12);
        assert!(sq.is_ccw());
    }

    #[test]
    fn profile_area_subtracts_holes() {
        let hole = Polygon::new(vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 2.0]]);
        let profile = Profile::new(square(4.0), vec![hole]);
        assert!((profile.area() - 15.0).abs() < 1e-12);
        assert!(profile.contains([0.5, 0.5]));
        assert!(!profile.contains([1.5, 1.5]));
        assert!(!profile.contains([5.0, 5.0]));
    }

    #[test]
    fn reflection_keeps_canonical_orientation() {
        let hole = Polygon::new(vec![[1.0, 1.0], [1.0, 2.0], [2.0, 2.0], [2.0, 1.0]]);
        let profile = Profile::new(square(4.0), vec![hole]).oriented();
        let flipped = profile.transformed(&Transform2::scale(1.0, -1.0));
        assert!(flipped.outer.is_ccw());
        assert!(!flipped.holes[0].is_ccw());
        assert!((flipped.area() - profile.area()).abs() < 1e-12);
    }

    #[test]
    fn transform_composition_applies_in_order() {
        let t = Transform2::translate(1.0, 0.0).then(&Transform2::rotate_degrees(90.0));
        let p = t.apply([1.0, 0.0]);
        assert!((p[0] - 0.0).abs() < 1e-12);
        assert!((p[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn arc_points_hit_both_ends() {
        let pts = arc_points([0.0, 0.0], 2.0, 0.0, 90.0, 16);
        assert_eq!(pts.len(), 17);
        assert!((pts[0][0] - 2.0).abs() < 1e-12);
        assert!((pts[16][1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn bounds_union_and_center() {
        let a = square(2.0).bounds().unwrap();
        let b = Bounds2 {
            min: [-2.0, -1.0],
            max: [0.0, 0.0],
        };
        let u = a.union(&b);
        assert_eq!(u.min, [-2.0, -1.0]);
        assert_eq!(u.max, [2.0, 2.0]);
        assert_eq!(u.center(), [0.0, 0.5]);
    }
}
