use plate_types::{Point2, Polygon};

/// Points closer than this are the same vertex.
pub const DEDUP_EPSILON: f64 = 1e-6;

fn coincident(a: Point2, b: Point2) -> bool {
    (a[0] - b[0]).abs() <= DEDUP_EPSILON && (a[1] - b[1]).abs() <= DEDUP_EPSILON
}

/// Remove consecutive duplicate vertices, including a repeated closing
/// vertex, and vertices lying exactly on the line through their neighbours.
pub fn clean_ring(polygon: &Polygon) -> Polygon {
    let mut points: Vec<Point2> = Vec::with_capacity(polygon.len());
    for &p in &polygon.points {
        if points.last().map_or(true, |&q| !coincident(p, q)) {
            points.push(p);
        }
    }
    while points.len() > 1 && coincident(points[0], points[points.len() - 1]) {
        points.pop();
    }

    // Collinear pass; repeat until stable since removing one vertex can
    // expose another.
    let mut changed = true;
    while changed && points.len() > 3 {
        changed = false;
        let n = points.len();
        for i in 0..n {
            let a = points[(i + n - 1) % n];
            let b = points[i];
            let c = points[(i + 1) % n];
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            let dot = (b[0] - a[0]) * (c[0] - b[0]) + (b[1] - a[1]) * (c[1] - b[1]);
            // Only straight-through points; a spike (dot < 0) stays so the
            // validator can reject it.
            if cross.abs() <= DEDUP_EPSILON * DEDUP_EPSILON && dot > 0.0 {
                points.remove(i);
                changed = true;
                break;
            }
        }
    }
    Polygon::new(points)
}

/// Number of distinct vertices, ignoring order.
pub fn distinct_vertices(polygon: &Polygon) -> usize {
    let mut seen: Vec<Point2> = Vec::with_capacity(polygon.len());
    for &p in &polygon.points {
        if !seen.iter().any(|&q| coincident(p, q)) {
            seen.push(p);
        }
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_and_closing_point_removed() {
        let ring = Polygon::new(vec![
            [0.0, 0.0],
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 0.0],
        ]);
        assert_eq!(clean_ring(&ring).points, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
    }

    #[test]
    fn straight_through_vertex_removed() {
        let ring = Polygon::new(vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]);
        assert_eq!(clean_ring(&ring).len(), 4);
    }

    #[test]
    fn distinct_count_ignores_order() {
        let ring = Polygon::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0], [1.0, 0.0]]);
        assert_eq!(distinct_vertices(&ring), 2);
    }
}
