//! Profile validity: closed simple rings, holes strictly inside the outer
//! boundary and apart from each other.

use plate_types::{point_in_ring, Point2, Polygon, Profile};

use crate::cleanup::distinct_vertices;
use crate::error::DegenerateProfileError;

/// Rings with less area than this are treated as degenerate.
pub const MIN_RING_AREA: f64 = 1e-9;

fn orient(a: Point2, b: Point2, c: Point2) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn on_segment(a: Point2, b: Point2, p: Point2) -> bool {
    p[0] >= a[0].min(b[0]) - 1e-12
        && p[0] <= a[0].max(b[0]) + 1e-12
        && p[1] >= a[1].min(b[1]) - 1e-12
        && p[1] <= a[1].max(b[1]) + 1e-12
}

/// Closed-segment intersection test, touching included.
pub fn segments_intersect(p1: Point2, p2: Point2, q1: Point2, q2: Point2) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// First pair of non-adjacent edges that intersect, if any.
pub fn find_self_intersection(ring: &Polygon) -> Option<(usize, usize)> {
    let n = ring.len();
    if n < 4 {
        return None;
    }
    let pts = &ring.points;
    for i in 0..n {
        let (a1, a2) = (pts[i], pts[(i + 1) % n]);
        for j in (i + 1)..n {
            // Adjacent edges share a vertex by construction.
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (b1, b2) = (pts[j], pts[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                return Some((i, j));
            }
        }
    }
    None
}

fn rings_cross(a: &Polygon, b: &Polygon) -> bool {
    a.edges()
        .any(|(a1, a2)| b.edges().any(|(b1, b2)| segments_intersect(a1, a2, b1, b2)))
}

fn validate_ring(ring: &Polygon, index: usize) -> Result<(), DegenerateProfileError> {
    let distinct = distinct_vertices(ring);
    if distinct < 3 {
        return Err(DegenerateProfileError::TooFewVertices {
            ring: index,
            distinct,
        });
    }
    if let Some((first, second)) = find_self_intersection(ring) {
        return Err(DegenerateProfileError::SelfIntersecting {
            ring: index,
            first,
            second,
        });
    }
    if ring.area() < MIN_RING_AREA {
        return Err(DegenerateProfileError::ZeroArea { ring: index });
    }
    Ok(())
}

/// Check a profile. Holes are numbered from 1 in errors about rings and
/// from 0 in errors about containment.
pub fn validate_profile(profile: &Profile) -> Result<(), DegenerateProfileError> {
    validate_ring(&profile.outer, 0)?;
    for (i, hole) in profile.holes.iter().enumerate() {
        validate_ring(hole, i + 1)?;
        let inside = hole
            .points
            .iter()
            .all(|&p| point_in_ring(&profile.outer.points, p));
        if !inside || rings_cross(hole, &profile.outer) {
            return Err(DegenerateProfileError::HoleNotContained { hole: i });
        }
    }
    for i in 0..profile.holes.len() {
        for j in (i + 1)..profile.holes.len() {
            let (a, b) = (&profile.holes[i], &profile.holes[j]);
            let nested = a.points.iter().any(|&p| point_in_ring(&b.points, p))
                || b.points.iter().any(|&p| point_in_ring(&a.points, p));
            if nested || rings_cross(a, b) {
                return Err(DegenerateProfileError::HolesOverlap {
                    first: i,
                    second: j,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, s: f64) -> Polygon {
        Polygon::new(vec![[x, y], [x + s, y], [x + s, y + s], [x, y + s]])
    }

    #[test]
    fn bow_tie_is_self_intersecting() {
        let bow = Polygon::new(vec![[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 2.0]]);
        assert_eq!(find_self_intersection(&bow), Some((0, 2)));
        assert!(matches!(
            validate_profile(&Profile::solid(bow)),
            Err(DegenerateProfileError::SelfIntersecting { ring: 0, .. })
        ));
    }

    #[test]
    fn simple_square_with_hole_is_valid() {
        let profile = Profile::new(square(0.0, 0.0, 10.0), vec![square(2.0, 2.0, 3.0)]);
        assert_eq!(validate_profile(&profile), Ok(()));
    }

    #[test]
    fn hole_poking_out_is_rejected() {
        let profile = Profile::new(square(0.0, 0.0, 10.0), vec![square(8.0, 8.0, 4.0)]);
        assert_eq!(
            validate_profile(&profile),
            Err(DegenerateProfileError::HoleNotContained { hole: 0 })
        );
    }

    #[test]
    fn overlapping_holes_are_rejected() {
        let profile = Profile::new(
            square(0.0, 0.0, 10.0),
            vec![square(1.0, 1.0, 4.0), square(3.0, 3.0, 4.0)],
        );
        assert!(matches!(
            validate_profile(&profile),
            Err(DegenerateProfileError::HolesOverlap { first: 0, second: 1 })
        ));
    }

    #[test]
    fn two_point_outer_is_too_few() {
        let line = Polygon::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]);
        assert_eq!(
            validate_profile(&Profile::solid(line)),
            Err(DegenerateProfileError::TooFewVertices {
                ring: 0,
                distinct: 2
            })
        );
    }
}
