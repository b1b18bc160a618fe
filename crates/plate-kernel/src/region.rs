//! Planar regions on a 0.01 mm grid, combined with Clipper2 and
//! triangulated with earcut.
//!
//! Every coordinate stored in a [`Region`] has been snapped with [`snap`],
//! so two regions that share a vertex share it bit for bit. The slab mesher
//! relies on that to stitch walls and caps without cracks.

use std::cmp::Ordering;
use std::collections::HashSet;

use clipper2::*;
use plate_types::{point_in_ring, signed_area, Bounds2, Point2, Profile};

use crate::types::KernelError;

/// Grid steps per millimetre. Matches Clipper2's `Centi` scaling.
pub(crate) const GRID: f64 = 100.0;

pub(crate) fn snap(v: f64) -> f64 {
    (v * GRID).round() / GRID
}

fn snap_point(p: Point2) -> Point2 {
    [snap(p[0]), snap(p[1])]
}

/// A set of non-crossing rings. Rings alternate solid and hole by nesting
/// depth; winding as stored is not significant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Region {
    rings: Vec<Vec<Point2>>,
}

impl Region {
    pub fn empty() -> Region {
        Region::default()
    }

    pub fn from_profile(profile: &Profile) -> Region {
        Region::from_rings(profile.rings().map(|r| r.points.clone()))
    }

    /// Snap, drop repeated vertices and discard rings that collapse.
    pub fn from_rings(rings: impl IntoIterator<Item = Vec<Point2>>) -> Region {
        let mut out = Vec::new();
        for ring in rings {
            let mut pts: Vec<Point2> = Vec::with_capacity(ring.len());
            for p in ring.into_iter().map(snap_point) {
                if pts.last() != Some(&p) {
                    pts.push(p);
                }
            }
            while pts.len() > 1 && pts.first() == pts.last() {
                pts.pop();
            }
            if pts.len() >= 3 && signed_area(&pts).abs() > 0.0 {
                out.push(pts);
            }
        }
        Region { rings: out }
    }

    pub fn rings(&self) -> &[Vec<Point2>] {
        &self.rings
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds2> {
        Bounds2::from_points(self.rings.iter().flatten())
    }

    /// Even-odd containment over all rings.
    pub fn contains(&self, p: Point2) -> bool {
        self.rings.iter().filter(|r| point_in_ring(r, p)).count() % 2 == 1
    }

    /// Net area: rings at even depth add, rings at odd depth subtract.
    pub fn area(&self) -> f64 {
        let depths = self.depths();
        self.rings
            .iter()
            .zip(depths)
            .map(|(r, d)| {
                let a = signed_area(r).abs();
                if d % 2 == 0 {
                    a
                } else {
                    -a
                }
            })
            .sum()
    }

    /// True when both regions cover the same point set. Ring order, start
    /// vertex and winding do not matter.
    pub fn same_shape(&self, other: &Region) -> bool {
        if self.rings.len() == other.rings.len() && self.canonical() == other.canonical() {
            return true;
        }
        if (self.area() - other.area()).abs() > 1e-9 {
            return false;
        }
        // Same area but a different vertex set: collinear points or a
        // different split of the same boundary.
        match (self.difference(other), other.difference(self)) {
            (Ok(a), Ok(b)) => a.is_empty() && b.is_empty(),
            _ => false,
        }
    }

    /// True when boundary rings touch: a vertex shared by two rings, a ring
    /// revisiting one of its own vertices, or a vertex sitting on another
    /// edge. Sweeping such a region gives edges shared by four faces.
    pub fn is_pinched(&self) -> bool {
        let mut seen: HashSet<(i64, i64)> = HashSet::new();
        for p in self.rings.iter().flatten() {
            if !seen.insert(grid_key(*p)) {
                return true;
            }
        }

        let bounds: Vec<Option<Bounds2>> = self.rings.iter().map(|r| Bounds2::from_points(r)).collect();
        for (i, ring) in self.rings.iter().enumerate() {
            for (k, &p) in ring.iter().enumerate() {
                for (j, other) in self.rings.iter().enumerate() {
                    if i != j && !bounds[j].is_some_and(|b| within(&b, p)) {
                        continue;
                    }
                    let n = other.len();
                    for e in 0..n {
                        // Edges ending at the vertex itself.
                        if i == j && (e == k || (e + 1) % n == k) {
                            continue;
                        }
                        if strictly_on_segment(p, other[e], other[(e + 1) % n]) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Rings wound counter-clockwise, each starting at its least vertex,
    /// sorted by that vertex.
    fn canonical(&self) -> Vec<Vec<Point2>> {
        let mut rings: Vec<Vec<Point2>> = self
            .rings
            .iter()
            .map(|r| {
                let mut ring = r.clone();
                if signed_area(&ring) < 0.0 {
                    ring.reverse();
                }
                let start = (0..ring.len())
                    .min_by(|&a, &b| cmp_points(ring[a], ring[b]))
                    .unwrap_or(0);
                ring.rotate_left(start);
                ring
            })
            .collect();
        rings.sort_by(|a, b| cmp_points(a[0], b[0]).then(a.len().cmp(&b.len())));
        rings
    }

    pub fn union(&self, other: &Region) -> Result<Region, KernelError> {
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(other.clone());
        }
        if disjoint(self.bounds(), other.bounds()) {
            let mut rings = self.rings.clone();
            rings.extend(other.rings.iter().cloned());
            return Ok(Region { rings });
        }
        let result = union::<Centi>(self.to_paths(), other.to_paths(), FillRule::default())
            .map_err(|e| KernelError::BooleanFailed {
                reason: format!("region union: {:?}", e),
            })?;
        let paths: Vec<Vec<(f64, f64)>> = result.into();
        Ok(Region::from_paths(paths))
    }

    pub fn difference(&self, other: &Region) -> Result<Region, KernelError> {
        if self.is_empty() || other.is_empty() || disjoint(self.bounds(), other.bounds()) {
            return Ok(self.clone());
        }
        let result = difference::<Centi>(self.to_paths(), other.to_paths(), FillRule::default())
            .map_err(|e| KernelError::BooleanFailed {
                reason: format!("region difference: {:?}", e),
            })?;
        let paths: Vec<Vec<(f64, f64)>> = result.into();
        Ok(Region::from_paths(paths))
    }

    /// Rings wound for an outward-facing boundary: solids counter-clockwise,
    /// holes clockwise.
    pub fn oriented_rings(&self) -> Vec<Vec<Point2>> {
        self.rings
            .iter()
            .zip(self.depths())
            .map(|(r, d)| {
                let want_ccw = d % 2 == 0;
                let mut ring = r.clone();
                if (signed_area(&ring) > 0.0) != want_ccw {
                    ring.reverse();
                }
                ring
            })
            .collect()
    }

    /// Split into outer boundaries with their direct holes.
    pub fn polygons(&self) -> Vec<(Vec<Point2>, Vec<Vec<Point2>>)> {
        let depths = self.depths();
        let oriented = self.oriented_rings();
        let mut groups: Vec<(usize, Vec<Vec<Point2>>)> = Vec::new();
        let mut group_of = vec![usize::MAX; self.rings.len()];

        for (i, d) in depths.iter().enumerate() {
            if d % 2 == 0 {
                group_of[i] = groups.len();
                groups.push((i, Vec::new()));
            }
        }
        for (i, &d) in depths.iter().enumerate() {
            if d % 2 == 0 {
                continue;
            }
            let inner = interior_point(&self.rings[i]);
            let parent = (0..self.rings.len())
                .filter(|&j| depths[j] + 1 == d && point_in_ring(&self.rings[j], inner))
                .min_by(|&a, &b| {
                    signed_area(&self.rings[a])
                        .abs()
                        .total_cmp(&signed_area(&self.rings[b]).abs())
                });
            if let Some(j) = parent {
                groups[group_of[j]].1.push(oriented[i].clone());
            }
        }

        groups
            .into_iter()
            .map(|(outer, holes)| (oriented[outer].clone(), holes))
            .collect()
    }

    /// Triangulate the region. Every triangle comes back counter-clockwise.
    pub fn triangulate(&self) -> Result<Vec<[Point2; 3]>, KernelError> {
        let mut triangles = Vec::new();
        for (outer, holes) in self.polygons() {
            let mut vertices: Vec<Point2> = outer;
            let mut hole_indices = Vec::with_capacity(holes.len());
            for hole in holes {
                hole_indices.push(vertices.len());
                vertices.extend(hole);
            }
            let coords: Vec<f64> = vertices.iter().flat_map(|p| [p[0], p[1]]).collect();
            let indices = earcutr::earcut(&coords, &hole_indices, 2).map_err(|e| {
                KernelError::TessellationFailed {
                    reason: format!("earcut: {}", e),
                }
            })?;
            for tri in indices.chunks_exact(3) {
                let (a, b, c) = (vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]);
                let twice = (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);
                if twice > 0.0 {
                    triangles.push([a, b, c]);
                } else if twice < 0.0 {
                    triangles.push([a, c, b]);
                }
            }
        }
        Ok(triangles)
    }

    /// Nesting depth of each ring: how many other rings enclose it.
    fn depths(&self) -> Vec<usize> {
        (0..self.rings.len())
            .map(|i| {
                let inner = interior_point(&self.rings[i]);
                self.rings
                    .iter()
                    .enumerate()
                    .filter(|&(j, r)| j != i && point_in_ring(r, inner))
                    .count()
            })
            .collect()
    }

    fn to_paths(&self) -> Vec<Vec<(f64, f64)>> {
        self.rings
            .iter()
            .map(|r| r.iter().map(|p| (p[0], p[1])).collect())
            .collect()
    }

    fn from_paths(paths: Vec<Vec<(f64, f64)>>) -> Region {
        Region::from_rings(
            paths
                .into_iter()
                .map(|path| path.into_iter().map(|(x, y)| [x, y]).collect()),
        )
    }
}

/// A point on the ring's first edge, used to test which rings enclose it.
fn interior_point(ring: &[Point2]) -> Point2 {
    let (a, b) = (ring[0], ring[1 % ring.len()]);
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
}

fn grid_key(p: Point2) -> (i64, i64) {
    ((p[0] * GRID).round() as i64, (p[1] * GRID).round() as i64)
}

fn cmp_points(a: Point2, b: Point2) -> Ordering {
    a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1]))
}

fn within(b: &Bounds2, p: Point2) -> bool {
    p[0] >= b.min[0] && p[0] <= b.max[0] && p[1] >= b.min[1] && p[1] <= b.max[1]
}

/// `p` lies on segment a→b, away from both ends.
fn strictly_on_segment(p: Point2, a: Point2, b: Point2) -> bool {
    let d = [b[0] - a[0], b[1] - a[1]];
    let v = [p[0] - a[0], p[1] - a[1]];
    let len2 = d[0] * d[0] + d[1] * d[1];
    if len2 == 0.0 || (v[0] * d[1] - v[1] * d[0]).abs() > 1e-9 * len2.sqrt() {
        return false;
    }
    let t = (v[0] * d[0] + v[1] * d[1]) / len2;
    let margin = 1e-9 / len2.sqrt();
    t > margin && t < 1.0 - margin
}

fn disjoint(a: Option<Bounds2>, b: Option<Bounds2>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a.max[0] < b.min[0] || b.max[0] < a.min[0] || a.max[1] < b.min[1] || b.max[1] < a.min[1]
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plate_types::Polygon;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
        Region::from_rings(vec![vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]]])
    }

    #[test]
    fn coordinates_land_on_the_grid() {
        let r = Region::from_rings(vec![vec![[0.004, 0.0], [1.0061, 0.0], [1.0, 1.0]]]);
        assert_eq!(r.rings()[0][0], [0.0, 0.0]);
        assert_eq!(r.rings()[0][1], [1.01, 0.0]);
    }

    #[test]
    fn profile_hole_is_subtracted() {
        let outer = Polygon::new(vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        let hole = Polygon::new(vec![[2.0, 2.0], [2.0, 4.0], [4.0, 4.0], [4.0, 2.0]]);
        let r = Region::from_profile(&Profile::new(outer, vec![hole]));
        assert!((r.area() - 96.0).abs() < 1e-9);
        assert!(r.contains([1.0, 1.0]));
        assert!(!r.contains([3.0, 3.0]));
    }

    #[test]
    fn overlapping_union_merges() {
        let u = rect(0.0, 0.0, 2.0, 2.0).union(&rect(1.0, 0.0, 3.0, 2.0)).unwrap();
        assert_eq!(u.rings().len(), 1);
        assert!((u.area() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn difference_punches_hole() {
        let d = rect(0.0, 0.0, 10.0, 10.0).difference(&rect(4.0, 4.0, 6.0, 6.0)).unwrap();
        assert!((d.area() - 96.0).abs() < 1e-9);
        assert_eq!(d.polygons().len(), 1);
        assert_eq!(d.polygons()[0].1.len(), 1);
    }

    #[test]
    fn difference_can_empty_a_region() {
        let d = rect(1.0, 1.0, 2.0, 2.0).difference(&rect(0.0, 0.0, 3.0, 3.0)).unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn triangles_cover_area_counter_clockwise() {
        let d = rect(0.0, 0.0, 10.0, 10.0).difference(&rect(4.0, 4.0, 6.0, 6.0)).unwrap();
        let tris = d.triangulate().unwrap();
        let total: f64 = tris.iter().map(|t| signed_area(t)).sum();
        assert!(tris.iter().all(|t| signed_area(t) > 0.0));
        assert!((total - 96.0).abs() < 1e-6);
    }

    #[test]
    fn same_shape_ignores_start_vertex_and_winding() {
        let a = rect(0.0, 0.0, 2.0, 1.0);
        let b = Region::from_rings(vec![vec![[2.0, 1.0], [2.0, 0.0], [0.0, 0.0], [0.0, 1.0]]]);
        assert_ne!(a, b);
        assert!(a.same_shape(&b));
        // An extra collinear vertex still describes the same square.
        let c = Region::from_rings(vec![vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [0.0, 1.0]]]);
        assert!(a.same_shape(&c));
        assert!(!a.same_shape(&rect(0.0, 0.0, 2.0, 1.5)));
    }

    #[test]
    fn corner_touching_squares_are_pinched() {
        let u = rect(0.0, 0.0, 1.0, 1.0).union(&rect(1.0, 1.0, 2.0, 2.0)).unwrap();
        assert!(u.is_pinched());
        let t = Region::from_rings(vec![
            vec![[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [0.0, 1.0]],
            vec![[1.0, 1.0], [1.5, 2.0], [0.5, 2.0]],
        ]);
        assert!(t.is_pinched());
        assert!(!rect(0.0, 0.0, 10.0, 10.0).difference(&rect(4.0, 4.0, 6.0, 6.0)).unwrap().is_pinched());
    }

    #[test]
    fn island_inside_hole_is_solid_again() {
        let frame = rect(0.0, 0.0, 10.0, 10.0).difference(&rect(2.0, 2.0, 8.0, 8.0)).unwrap();
        let target = frame.union(&rect(4.0, 4.0, 6.0, 6.0)).unwrap();
        assert!((target.area() - (100.0 - 36.0 + 4.0)).abs() < 1e-9);
        assert_eq!(target.polygons().len(), 2);
        assert!(target.contains([5.0, 5.0]));
        assert!(!target.contains([3.0, 3.0]));
    }
}
